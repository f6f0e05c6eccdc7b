//! Stack element representation
//!
//! A [`StackData`] is the raw byte vector the machine operates on, plus a
//! record of how the value was produced so it can be shown back to the user
//! in the same form: numbers as decimal, text literals as text, and
//! everything else as `0x`-prefixed hex.

use super::errors::ScriptError;
use super::num::encode_scriptnum;

/// How a stack element should be presented
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataForm {
    /// Raw bytes (hex and binary literals, hashes, opcode results)
    Bytes,
    /// Script number
    Number(i64),
    /// UTF-8 text literal
    Text(String),
}

/// A single element on the evaluation stack
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackData {
    bytes: Vec<u8>,
    form: DataForm,
}

impl StackData {
    /// Raw bytes shown as hex
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        StackData {
            bytes,
            form: DataForm::Bytes,
        }
    }

    /// Parse a hex string (without `0x` prefix)
    pub fn from_hex(hex: &str) -> Result<Self, ScriptError> {
        let bytes = hex::decode(hex).map_err(|_| ScriptError::InvalidHex {
            input: hex.to_string(),
        })?;
        Ok(StackData::from_bytes(bytes))
    }

    /// Parse a binary string (without `0b` prefix), most significant bit first
    pub fn from_bin(bin: &str) -> Result<Self, ScriptError> {
        let invalid = || ScriptError::InvalidBinary {
            input: bin.to_string(),
        };

        if bin.len() % 8 != 0 || !bin.chars().all(|c| c == '0' || c == '1') {
            return Err(invalid());
        }

        let bytes = bin
            .as_bytes()
            .chunks(8)
            .map(|chunk| {
                // chunks are ASCII '0'/'1' here, so this cannot fail
                std::str::from_utf8(chunk)
                    .ok()
                    .and_then(|s| u8::from_str_radix(s, 2).ok())
                    .ok_or_else(invalid)
            })
            .collect::<Result<Vec<u8>, ScriptError>>()?;

        Ok(StackData::from_bytes(bytes))
    }

    /// Script number
    pub fn from_number(n: i64) -> Self {
        StackData {
            bytes: encode_scriptnum(n),
            form: DataForm::Number(n),
        }
    }

    /// UTF-8 text
    pub fn from_text(text: &str) -> Self {
        StackData {
            bytes: text.as_bytes().to_vec(),
            form: DataForm::Text(text.to_string()),
        }
    }

    /// `1` for true, `0` (the empty element) for false
    pub fn from_bool(value: bool) -> Self {
        StackData::from_number(if value { 1 } else { 0 })
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn form(&self) -> &DataForm {
        &self.form
    }

    /// Lowercase hex of the raw bytes
    pub fn hex(&self) -> String {
        hex::encode(&self.bytes)
    }

    /// Binary string of the raw bytes, most significant bit first
    pub fn bin(&self) -> String {
        self.bytes.iter().map(|b| format!("{:08b}", b)).collect()
    }

    /// The number this element was created from, if any
    pub fn number(&self) -> Option<i64> {
        match self.form {
            DataForm::Number(n) => Some(n),
            _ => None,
        }
    }

    /// The text this element was created from, if any
    pub fn text(&self) -> Option<&str> {
        match &self.form {
            DataForm::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Value shown in output panes: number, then text, then `0x` hex
    pub fn display_value(&self) -> String {
        match &self.form {
            DataForm::Number(n) => n.to_string(),
            DataForm::Text(s) => s.clone(),
            DataForm::Bytes => format!("0x{}", self.hex()),
        }
    }
}
