//! Transaction template
//!
//! A [`TxTemplate`] simulates the spending transaction for opcodes that
//! inspect it (lock time checks, Liquid introspection). Templates are edited
//! as JSON, either in the template modal or loaded with `--tx <file>`.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Sequence value that disables lock time checks for an input
pub const SEQUENCE_FINAL: u32 = 0xffff_ffff;

/// Lock times below this are block heights, above are timestamps
pub const LOCKTIME_THRESHOLD: u32 = 500_000_000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TxInput {
    /// 32-byte previous transaction id as hex
    pub previous_txid: String,
    pub vout: u32,
    pub sequence: u32,
    /// Hex script of the output being spent
    pub script_pubkey: String,
    /// Amount in satoshis
    pub amount: u64,
}

impl Default for TxInput {
    fn default() -> Self {
        TxInput {
            previous_txid: "00".repeat(32),
            vout: 0,
            sequence: SEQUENCE_FINAL,
            script_pubkey: String::new(),
            amount: 0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TxOutput {
    pub script_pubkey: String,
    pub amount: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TxTemplate {
    pub version: u32,
    pub locktime: u32,
    pub current_input_index: u32,
    pub inputs: Vec<TxInput>,
    pub outputs: Vec<TxOutput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_height: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_timestamp: Option<u32>,
}

impl Default for TxTemplate {
    fn default() -> Self {
        TxTemplate {
            version: 2,
            locktime: 0,
            current_input_index: 0,
            inputs: vec![TxInput::default()],
            outputs: vec![TxOutput::default()],
            block_height: None,
            block_timestamp: None,
        }
    }
}

/// Errors from parsing or validating a template
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateError {
    Json(String),
    InvalidHex {
        field: String,
        value: String,
    },
    InvalidTxid {
        index: usize,
    },
    InputIndexOutOfRange {
        index: u32,
        inputs: usize,
    },
}

impl fmt::Display for TemplateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TemplateError::Json(message) => write!(f, "Invalid template JSON: {}", message),
            TemplateError::InvalidHex { field, value } => {
                write!(f, "Field '{}' is not valid hex: '{}'", field, value)
            }
            TemplateError::InvalidTxid { index } => {
                write!(f, "Input {} previous_txid must be 32 bytes of hex", index)
            }
            TemplateError::InputIndexOutOfRange { index, inputs } => {
                write!(
                    f,
                    "current_input_index {} out of range for {} input{}",
                    index,
                    inputs,
                    if *inputs == 1 { "" } else { "s" }
                )
            }
        }
    }
}

impl std::error::Error for TemplateError {}

impl TxTemplate {
    /// Parse and validate a JSON template
    pub fn from_json(json: &str) -> Result<Self, TemplateError> {
        let template: TxTemplate =
            serde_json::from_str(json).map_err(|e| TemplateError::Json(e.to_string()))?;
        template.validate()?;
        Ok(template)
    }

    pub fn to_json_pretty(&self) -> String {
        // Serializing plain structs of strings and integers cannot fail
        serde_json::to_string_pretty(self).unwrap_or_default()
    }

    pub fn validate(&self) -> Result<(), TemplateError> {
        for (i, input) in self.inputs.iter().enumerate() {
            match hex::decode(&input.previous_txid) {
                Ok(bytes) if bytes.len() == 32 => {}
                _ => return Err(TemplateError::InvalidTxid { index: i }),
            }
            check_hex(&format!("inputs[{}].script_pubkey", i), &input.script_pubkey)?;
        }

        for (i, output) in self.outputs.iter().enumerate() {
            check_hex(&format!("outputs[{}].script_pubkey", i), &output.script_pubkey)?;
        }

        if self.current_input_index as usize >= self.inputs.len() {
            return Err(TemplateError::InputIndexOutOfRange {
                index: self.current_input_index,
                inputs: self.inputs.len(),
            });
        }

        Ok(())
    }

    /// The input whose script is being evaluated
    pub fn current_input(&self) -> Option<&TxInput> {
        self.inputs.get(self.current_input_index as usize)
    }
}

fn check_hex(field: &str, value: &str) -> Result<(), TemplateError> {
    hex::decode(value).map(|_| ()).map_err(|_| TemplateError::InvalidHex {
        field: field.to_string(),
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_uses_defaults() {
        let template = TxTemplate::from_json(r#"{ "locktime": 100, "inputs": [{ "sequence": 5 }] }"#)
            .unwrap();

        assert_eq!(template.version, 2);
        assert_eq!(template.locktime, 100);
        assert_eq!(template.inputs.len(), 1);
        assert_eq!(template.inputs[0].sequence, 5);
        assert_eq!(template.inputs[0].previous_txid.len(), 64);
        assert_eq!(template.outputs.len(), 1);
    }

    #[test]
    fn test_validation_errors() {
        let err = TxTemplate::from_json(r#"{ "inputs": [] }"#).unwrap_err();
        assert_eq!(
            err,
            TemplateError::InputIndexOutOfRange {
                index: 0,
                inputs: 0
            }
        );

        let err = TxTemplate::from_json(r#"{ "outputs": [{ "script_pubkey": "xyz" }] }"#)
            .unwrap_err();
        assert!(matches!(err, TemplateError::InvalidHex { .. }));

        assert!(matches!(
            TxTemplate::from_json("{ not json").unwrap_err(),
            TemplateError::Json(_)
        ));
    }

    #[test]
    fn test_pretty_json_parses_back() {
        let template = TxTemplate::default();
        let parsed = TxTemplate::from_json(&template.to_json_pretty()).unwrap();
        assert_eq!(parsed, template);
    }
}
