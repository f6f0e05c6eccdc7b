//! Hover information for editor text
//!
//! Hovering an opcode word shows its byte value and a one-line summary;
//! hovering anything else shows static source information spanning the whole
//! buffer.

use crate::vm::opcodes::OpcodeTable;

/// A 1-based, end-exclusive text range, in the editor's line/column terms
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Range {
    pub start_line: usize,
    pub start_column: usize,
    pub end_line: usize,
    pub end_column: usize,
}

/// Markdown blocks shown for a range
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hover {
    pub range: Range,
    pub contents: Vec<String>,
}

/// Summaries of the opcodes the machine executes
const OPCODE_DOCS: &[(&str, &str)] = &[
    ("OP_0", "Push an empty array (the number 0)."),
    ("OP_FALSE", "Push an empty array (the number 0)."),
    ("OP_1NEGATE", "Push the number -1."),
    ("OP_1", "Push the number 1."),
    ("OP_TRUE", "Push the number 1."),
    ("OP_NOP", "Do nothing."),
    ("OP_IF", "Execute the following statements if the top item is true."),
    ("OP_NOTIF", "Execute the following statements if the top item is false."),
    ("OP_ELSE", "Toggle execution of the enclosing OP_IF/OP_NOTIF branch."),
    ("OP_ENDIF", "End an OP_IF/OP_NOTIF block."),
    ("OP_VERIFY", "Fail unless the top item is true, then remove it."),
    ("OP_RETURN", "Mark the script as invalid."),
    ("OP_TOALTSTACK", "Move the top item to the alt stack."),
    ("OP_FROMALTSTACK", "Move the top alt stack item to the main stack."),
    ("OP_2DROP", "Remove the top two items."),
    ("OP_2DUP", "Duplicate the top two items."),
    ("OP_3DUP", "Duplicate the top three items."),
    ("OP_2OVER", "Copy the pair of items two spaces back to the front."),
    ("OP_2ROT", "Move the fifth and sixth items to the top."),
    ("OP_2SWAP", "Swap the top two pairs of items."),
    ("OP_IFDUP", "Duplicate the top item if it is not zero."),
    ("OP_DEPTH", "Push the number of stack items."),
    ("OP_DROP", "Remove the top item."),
    ("OP_DUP", "Duplicate the top item."),
    ("OP_NIP", "Remove the second-to-top item."),
    ("OP_OVER", "Copy the second-to-top item to the top."),
    ("OP_PICK", "Copy the item n back to the top."),
    ("OP_ROLL", "Move the item n back to the top."),
    ("OP_ROT", "Rotate the top three items to the left."),
    ("OP_SWAP", "Swap the top two items."),
    ("OP_TUCK", "Copy the top item before the second-to-top item."),
    ("OP_CAT", "Concatenate the top two items."),
    ("OP_SUBSTR", "Keep a substring given a start and a length."),
    ("OP_LEFT", "Keep the leftmost n bytes."),
    ("OP_RIGHT", "Keep the rightmost n bytes."),
    ("OP_SIZE", "Push the byte length of the top item without removing it."),
    ("OP_INVERT", "Flip every bit of the top item."),
    ("OP_AND", "Bitwise AND of the top two items."),
    ("OP_OR", "Bitwise OR of the top two items."),
    ("OP_XOR", "Bitwise XOR of the top two items."),
    ("OP_EQUAL", "Push 1 if the top two items are byte-equal, 0 otherwise."),
    ("OP_EQUALVERIFY", "OP_EQUAL followed by OP_VERIFY."),
    ("OP_1ADD", "Add 1 to the top number."),
    ("OP_1SUB", "Subtract 1 from the top number."),
    ("OP_NEGATE", "Flip the sign of the top number."),
    ("OP_ABS", "Make the top number positive."),
    ("OP_NOT", "Push 1 if the top number is 0, 0 otherwise."),
    ("OP_0NOTEQUAL", "Push 0 if the top number is 0, 1 otherwise."),
    ("OP_ADD", "Add the top two numbers."),
    ("OP_SUB", "Subtract the top number from the one below it."),
    ("OP_MUL", "Multiply the top two numbers (disabled)."),
    ("OP_DIV", "Divide the top two numbers (disabled)."),
    ("OP_MOD", "Remainder of the top two numbers (disabled)."),
    ("OP_BOOLAND", "Push 1 if both numbers are non-zero."),
    ("OP_BOOLOR", "Push 1 if either number is non-zero."),
    ("OP_NUMEQUAL", "Push 1 if the numbers are equal."),
    ("OP_NUMEQUALVERIFY", "OP_NUMEQUAL followed by OP_VERIFY."),
    ("OP_NUMNOTEQUAL", "Push 1 if the numbers are not equal."),
    ("OP_LESSTHAN", "Push 1 if a is less than b."),
    ("OP_GREATERTHAN", "Push 1 if a is greater than b."),
    ("OP_LESSTHANOREQUAL", "Push 1 if a is less than or equal to b."),
    ("OP_GREATERTHANOREQUAL", "Push 1 if a is greater than or equal to b."),
    ("OP_MIN", "Keep the smaller of the top two numbers."),
    ("OP_MAX", "Keep the larger of the top two numbers."),
    ("OP_WITHIN", "Push 1 if x is within [min, max)."),
    ("OP_RIPEMD160", "Hash the top item with RIPEMD-160."),
    ("OP_SHA1", "Hash the top item with SHA-1 (not supported)."),
    ("OP_SHA256", "Hash the top item with SHA-256."),
    ("OP_HASH160", "Hash the top item with SHA-256 then RIPEMD-160."),
    ("OP_HASH256", "Hash the top item with SHA-256 twice."),
    ("OP_CHECKSIG", "Verify a signature (not supported)."),
    ("OP_CHECKSIGVERIFY", "OP_CHECKSIG followed by OP_VERIFY (not supported)."),
    ("OP_CHECKMULTISIG", "Verify m-of-n signatures (not supported)."),
    ("OP_CHECKMULTISIGVERIFY", "OP_CHECKMULTISIG followed by OP_VERIFY (not supported)."),
    ("OP_CHECKSIGADD", "Verify a signature and add to a counter (not supported)."),
    ("OP_CHECKLOCKTIMEVERIFY", "Fail unless the transaction locktime reaches the top number."),
    ("OP_CHECKSEQUENCEVERIFY", "Fail unless the input sequence satisfies the relative lock."),
    ("OP_PUSHCURRENTINPUTINDEX", "Push the index of the input being spent."),
    ("OP_INSPECTINPUTVALUE", "Push the explicit value of input n as 8-byte LE64."),
    ("OP_INSPECTINPUTSEQUENCE", "Push the sequence of input n."),
    ("OP_INSPECTOUTPUTVALUE", "Push the explicit value of output n as 8-byte LE64."),
    ("OP_INSPECTVERSION", "Push the transaction version."),
    ("OP_INSPECTLOCKTIME", "Push the transaction locktime."),
    ("OP_INSPECTNUMINPUTS", "Push the number of inputs."),
    ("OP_INSPECTNUMOUTPUTS", "Push the number of outputs."),
    ("OP_ADD64", "Add two LE64 numbers, pushing the result and a success flag."),
    ("OP_SUB64", "Subtract two LE64 numbers, pushing the result and a success flag."),
    ("OP_MUL64", "Multiply two LE64 numbers, pushing the result and a success flag."),
    ("OP_DIV64", "Divide two LE64 numbers, pushing remainder, quotient and a success flag."),
    ("OP_NEG64", "Negate an LE64 number, pushing the result and a success flag."),
    ("OP_LESSTHAN64", "Push 1 if LE64 a is less than b."),
    ("OP_LESSTHANOREQUAL64", "Push 1 if LE64 a is less than or equal to b."),
    ("OP_GREATERTHAN64", "Push 1 if LE64 a is greater than b."),
    ("OP_GREATERTHANOREQUAL64", "Push 1 if LE64 a is greater than or equal to b."),
    ("OP_SCRIPTNUMTOLE64", "Convert a script number to LE64."),
    ("OP_LE64TOSCRIPTNUM", "Convert an LE64 number to a script number."),
    ("OP_LE32TOLE64", "Widen an unsigned LE32 number to LE64."),
];

/// One-line summary of an opcode word
pub fn opcode_summary(name: &str) -> Option<&'static str> {
    if let Some(n) = name
        .strip_prefix("OP_")
        .and_then(|rest| rest.parse::<u8>().ok())
        .filter(|n| (2..=16).contains(n))
    {
        return Some(PUSH_NUMBER_DOCS[usize::from(n) - 2]);
    }
    OPCODE_DOCS
        .iter()
        .find(|(word, _)| *word == name)
        .map(|(_, doc)| *doc)
}

const PUSH_NUMBER_DOCS: [&str; 15] = [
    "Push the number 2.",
    "Push the number 3.",
    "Push the number 4.",
    "Push the number 5.",
    "Push the number 6.",
    "Push the number 7.",
    "Push the number 8.",
    "Push the number 9.",
    "Push the number 10.",
    "Push the number 11.",
    "Push the number 12.",
    "Push the number 13.",
    "Push the number 14.",
    "Push the number 15.",
    "Push the number 16.",
];

fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '.' || c == '-'
}

/// Byte range of the word touching `column` (0-based byte offset)
pub fn word_range(line: &str, column: usize) -> Option<(usize, usize)> {
    let column = column.min(line.len());
    if !line.is_char_boundary(column) {
        return None;
    }
    let start = line[..column]
        .char_indices()
        .rev()
        .take_while(|&(_, c)| is_word_char(c))
        .last()
        .map_or(column, |(i, _)| i);
    let end = line[column..]
        .char_indices()
        .find(|&(_, c)| !is_word_char(c))
        .map_or(line.len(), |(i, _)| column + i);
    (start < end).then_some((start, end))
}

/// Hover for the position `line` (0-based) / `column` (0-based byte offset)
pub fn hover_at(lines: &[String], line: usize, column: usize, table: &OpcodeTable) -> Hover {
    if let Some(text) = lines.get(line) {
        if let Some((start, end)) = word_range(text, column) {
            let word = &text[start..end];
            if let Some(hex) = table.word_hex(word) {
                let mut contents = vec![format!("**{}** `{}`", word, hex)];
                if let Some(summary) = opcode_summary(word) {
                    contents.push(summary.to_string());
                }
                if table.byte(word).is_some_and(|b| table.is_disabled(b)) {
                    contents.push(format!("Disabled on {}.", table.config()));
                }
                return Hover {
                    range: Range {
                        start_line: line + 1,
                        start_column: start + 1,
                        end_line: line + 1,
                        end_column: end + 1,
                    },
                    contents,
                };
            }
        }
    }
    source_hover(lines)
}

/// Static hover covering the whole buffer
pub fn source_hover(lines: &[String]) -> Hover {
    let end_line = lines.len().max(1);
    let end_column = lines.last().map_or(0, |l| l.len()) + 1;
    Hover {
        range: Range {
            start_line: 1,
            start_column: 1,
            end_line,
            end_column,
        },
        contents: vec!["**SOURCE**".to_string(), "Stack script source".to_string()],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vm::VmConfig;

    fn lines(text: &[&str]) -> Vec<String> {
        text.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_word_range() {
        assert_eq!(word_range("<1> OP_ADD", 6), Some((4, 10)));
        assert_eq!(word_range("OP_ADD", 6), Some((0, 6)));
        assert_eq!(word_range("<1>", 0), None);
        assert_eq!(word_range("", 0), None);
    }

    #[test]
    fn test_hover_on_opcode() {
        let table = OpcodeTable::new(VmConfig::default());
        let hover = hover_at(&lines(&["<1>", "  OP_ADD"]), 1, 4, &table);

        assert_eq!(hover.range.start_line, 2);
        assert_eq!(hover.range.start_column, 3);
        assert_eq!(hover.range.end_column, 9);
        assert_eq!(hover.contents[0], "**OP_ADD** `0x93`");
        assert_eq!(hover.contents[1], "Add the top two numbers.");
    }

    #[test]
    fn test_hover_reports_disabled() {
        let table = OpcodeTable::new(VmConfig::default());
        let hover = hover_at(&lines(&["OP_CAT"]), 0, 2, &table);
        assert!(hover.contents.iter().any(|c| c.starts_with("Disabled")));
    }

    #[test]
    fn test_hover_falls_back_to_source() {
        let table = OpcodeTable::new(VmConfig::default());
        let hover = hover_at(&lines(&["<0x01>", "<abc>"]), 0, 2, &table);

        assert_eq!(hover.contents[0], "**SOURCE**");
        assert_eq!(
            hover.range,
            Range {
                start_line: 1,
                start_column: 1,
                end_line: 2,
                end_column: 6,
            }
        );
    }

    #[test]
    fn test_push_number_summaries() {
        assert_eq!(opcode_summary("OP_7"), Some("Push the number 7."));
        assert_eq!(opcode_summary("OP_16"), Some("Push the number 16."));
        assert_eq!(opcode_summary("OP_17"), None);
    }
}
