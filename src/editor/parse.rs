//! Input parser: one editor line into one machine call
//!
//! A line is either a push expression `<...>` or a bare opcode word:
//!
//! | Line            | Call                        |
//! |-----------------|-----------------------------|
//! | `<0x0102>`      | `push_hex("0102")`          |
//! | `<0b00000001>`  | `push_bin("00000001")`      |
//! | `<'text'>`      | `push_text("text")`         |
//! | `<-5>`          | `push_number(-5)`           |
//! | `<OP_ADD>`      | `push_hex("93")`            |
//! | `OP_ADD`        | `push_opcode("OP_ADD")`     |
//!
//! Opcode pushes and opcode calls are refused in push-only context.

use crate::vm::ScriptVm;
use std::fmt;

pub const PUSH_ONLY_ERROR: &str = "Unlocking bytecode may contain only push operations.";

/// Classified form of one line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineInput<'a> {
    Hex(&'a str),
    Binary(&'a str),
    Text(&'a str),
    Number(i64),
    /// Opcode word pushed as its byte value
    PushedOpcode(&'a str),
    Opcode(&'a str),
    Invalid,
}

impl<'a> LineInput<'a> {
    pub fn classify(line: &'a str) -> Self {
        if let Some(inner) = line.strip_prefix('<').and_then(|l| l.strip_suffix('>')) {
            return Self::classify_push(inner);
        }
        if line.starts_with("OP_") {
            return LineInput::Opcode(line);
        }
        LineInput::Invalid
    }

    fn classify_push(inner: &'a str) -> Self {
        if let Some(hex) = inner.strip_prefix("0x") {
            return LineInput::Hex(hex);
        }
        if let Some(bin) = inner.strip_prefix("0b") {
            return LineInput::Binary(bin);
        }
        if let Some(text) = unquote(inner, '"').or_else(|| unquote(inner, '\'')) {
            return LineInput::Text(text);
        }
        let trimmed = inner.trim();
        if trimmed.is_empty() {
            return LineInput::Number(0);
        }
        if let Some(n) = parse_number(trimmed) {
            return LineInput::Number(n);
        }
        if inner.starts_with("OP_") {
            return LineInput::PushedOpcode(inner);
        }
        LineInput::Invalid
    }

    /// Whether the line only pushes data
    pub fn is_push(&self) -> bool {
        !matches!(self, LineInput::Opcode(_) | LineInput::PushedOpcode(_))
    }
}

fn unquote(s: &str, quote: char) -> Option<&str> {
    if s.len() == 1 && s.starts_with(quote) {
        // a lone quote is pushed as itself
        return Some(s);
    }
    if s.len() >= 2 && s.starts_with(quote) && s.ends_with(quote) {
        Some(&s[1..s.len() - 1])
    } else {
        None
    }
}

/// Decimal integer, also in exponent or `.0` form (`1e3`, `2.0`)
///
/// Values with a fractional part, or outside `i64`, are not numbers here.
fn parse_number(s: &str) -> Option<i64> {
    if let Ok(n) = s.parse::<i64>() {
        return Some(n);
    }
    // f64 parsing also takes "inf" and "nan"; only digit forms are numbers
    if !s.starts_with(|c: char| c.is_ascii_digit() || matches!(c, '-' | '+' | '.')) {
        return None;
    }
    let value = s.parse::<f64>().ok()?;
    if !value.is_finite() || value.fract() != 0.0 || value.abs() >= i64::MAX as f64 {
        return None;
    }
    Some(value as i64)
}

/// Errors the parser raises itself, before the machine sees the line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputError {
    /// Opcode in the push-only pane
    PushOnly,

    /// `<OP_...>` naming no known opcode
    UnknownOpcode { name: String },

    /// Line matching no input form
    Unrecognized { line: String },
}

impl fmt::Display for InputError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputError::PushOnly => write!(f, "{}", PUSH_ONLY_ERROR),
            InputError::UnknownOpcode { name } => write!(f, "Unknown opcode '{}'", name),
            InputError::Unrecognized { line } => write!(f, "Invalid input value: '{}'", line),
        }
    }
}

impl std::error::Error for InputError {}

/// Classify `line` and dispatch it to the machine
///
/// Nothing reaches the machine when an error is returned.
pub fn parse_input<V: ScriptVm + ?Sized>(
    vm: &mut V,
    line: &str,
    push_only: bool,
) -> Result<(), InputError> {
    let input = LineInput::classify(line);
    if push_only && !input.is_push() {
        return Err(InputError::PushOnly);
    }

    match input {
        LineInput::Hex(hex) => vm.push_hex(hex),
        LineInput::Binary(bin) => vm.push_bin(bin),
        LineInput::Text(text) => vm.push_text(text),
        LineInput::Number(n) => vm.push_number(n),
        LineInput::PushedOpcode(name) => {
            let hex = vm
                .opcode_hex(name)
                .ok_or_else(|| InputError::UnknownOpcode {
                    name: name.to_string(),
                })?;
            vm.push_hex(hex.trim_start_matches("0x"));
        }
        LineInput::Opcode(name) => vm.push_opcode(name),
        LineInput::Invalid => {
            log::warn!("invalid input value: {:?}", line);
            return Err(InputError::Unrecognized {
                line: line.to_string(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vm::{ScriptMachine, VmConfig};

    fn machine() -> ScriptMachine {
        ScriptMachine::new(VmConfig::default())
    }

    #[test]
    fn test_classify() {
        assert_eq!(LineInput::classify("<0x01ff>"), LineInput::Hex("01ff"));
        assert_eq!(LineInput::classify("<0b0101>"), LineInput::Binary("0101"));
        assert_eq!(LineInput::classify("<'hi'>"), LineInput::Text("hi"));
        assert_eq!(LineInput::classify("<\"hi\">"), LineInput::Text("hi"));
        assert_eq!(LineInput::classify("<-12>"), LineInput::Number(-12));
        assert_eq!(LineInput::classify("<>"), LineInput::Number(0));
        assert_eq!(LineInput::classify("<OP_ADD>"), LineInput::PushedOpcode("OP_ADD"));
        assert_eq!(LineInput::classify("OP_ADD"), LineInput::Opcode("OP_ADD"));
        assert_eq!(LineInput::classify("<abc>"), LineInput::Invalid);
        assert_eq!(LineInput::classify("hello"), LineInput::Invalid);
        assert_eq!(LineInput::classify("<'>"), LineInput::Text("'"));
        assert_eq!(LineInput::classify("<\">"), LineInput::Text("\""));
    }

    #[test]
    fn test_number_forms() {
        assert_eq!(LineInput::classify("<1e3>"), LineInput::Number(1000));
        assert_eq!(LineInput::classify("<-2E2>"), LineInput::Number(-200));
        assert_eq!(LineInput::classify("<7.0>"), LineInput::Number(7));
        assert_eq!(LineInput::classify("< 12 >"), LineInput::Number(12));
        assert_eq!(LineInput::classify("<1.5>"), LineInput::Invalid);
        assert_eq!(LineInput::classify("<1e400>"), LineInput::Invalid);
        assert_eq!(LineInput::classify("<inf>"), LineInput::Invalid);
        assert_eq!(LineInput::classify("<NaN>"), LineInput::Invalid);
    }

    #[test]
    fn test_lone_quote_pushes_itself() {
        let mut vm = machine();
        parse_input(&mut vm, "<'>", true).unwrap();
        assert_eq!(vm.stack()[0].text(), Some("'"));
    }

    #[test]
    fn test_literal_pushes_read_back() {
        let mut vm = machine();
        parse_input(&mut vm, "<0x01ff>", true).unwrap();
        parse_input(&mut vm, "<0b00000011>", true).unwrap();
        parse_input(&mut vm, "<42>", true).unwrap();
        parse_input(&mut vm, "<'wiz'>", true).unwrap();

        let stack = vm.stack();
        assert_eq!(stack[0].hex(), "01ff");
        assert_eq!(stack[1].bin(), "00000011");
        assert_eq!(stack[2].number(), Some(42));
        assert_eq!(stack[3].text(), Some("wiz"));
    }

    #[test]
    fn test_push_only_refuses_opcodes() {
        let mut vm = machine();
        parse_input(&mut vm, "<1>", true).unwrap();

        assert_eq!(parse_input(&mut vm, "OP_DUP", true), Err(InputError::PushOnly));
        assert_eq!(parse_input(&mut vm, "<OP_DUP>", true), Err(InputError::PushOnly));
        assert_eq!(vm.stack().len(), 1);
        assert_eq!(InputError::PushOnly.to_string(), PUSH_ONLY_ERROR);
    }

    #[test]
    fn test_opcode_push_and_call() {
        let mut vm = machine();
        parse_input(&mut vm, "<OP_ADD>", false).unwrap();
        assert_eq!(vm.stack()[0].hex(), "93");

        parse_input(&mut vm, "OP_DUP", false).unwrap();
        assert_eq!(vm.stack().len(), 2);

        assert_eq!(
            parse_input(&mut vm, "<OP_NOPE>", false),
            Err(InputError::UnknownOpcode {
                name: "OP_NOPE".to_string()
            })
        );
    }

    #[test]
    fn test_unrecognized_input() {
        let mut vm = machine();
        let err = parse_input(&mut vm, "hello", false).unwrap_err();
        assert_eq!(err.to_string(), "Invalid input value: 'hello'");
        assert!(vm.stack().is_empty());
    }
}
