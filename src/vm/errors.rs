//! Script execution error types
//!
//! This module defines [`ScriptError`], which represents every failure the
//! [`ScriptMachine`](super::engine::ScriptMachine) can report while pushing
//! literals or executing opcodes.
//!
//! Errors are latched by the machine: the first one wins and every later
//! push or opcode is ignored until the stack is cleared.

use std::fmt;

/// Errors raised while evaluating script input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptError {
    /// Not enough elements on the main (or alt) stack
    StackUnderflow { opcode: String },

    /// Hex literal with odd length or non-hex characters
    InvalidHex { input: String },

    /// Binary literal that is not a whole number of bytes of `0`/`1`
    InvalidBinary { input: String },

    /// Opcode name not known for the active network
    UnknownOpcode { name: String },

    /// Opcode that exists but is disabled on the active network
    DisabledOpcode { name: String },

    /// Opcode that is recognized but not implemented by this machine
    UnsupportedOpcode { name: String },

    /// A `*VERIFY` opcode found a false value
    VerifyFailed { opcode: String },

    /// `OP_RETURN` was executed
    OpReturn,

    /// `OP_ELSE`/`OP_ENDIF` without a matching `OP_IF`/`OP_NOTIF`
    UnbalancedConditional { opcode: String },

    /// Operand too large to be read as a script number
    NumericOverflow { opcode: String, size: usize, limit: usize },

    /// Element larger than the maximum push size
    PushSizeExceeded { size: usize, limit: usize },

    /// Operand outside the range the opcode accepts
    InvalidOperand { opcode: String, message: String },

    /// Opcode needs a transaction template and none was provided
    MissingTxTemplate { opcode: String },

    /// Lock time or sequence requirement not met by the transaction template
    Unsatisfied { opcode: String, reason: String },
}

impl fmt::Display for ScriptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScriptError::StackUnderflow { opcode } => {
                write!(f, "{} Error: stack does not have enough elements", opcode)
            }
            ScriptError::InvalidHex { input } => {
                write!(f, "Invalid hex value: '{}'", input)
            }
            ScriptError::InvalidBinary { input } => {
                write!(
                    f,
                    "Invalid binary value: '{}' (expected groups of 8 bits)",
                    input
                )
            }
            ScriptError::UnknownOpcode { name } => {
                write!(f, "Unknown opcode '{}'", name)
            }
            ScriptError::DisabledOpcode { name } => {
                write!(f, "{} is disabled on this network", name)
            }
            ScriptError::UnsupportedOpcode { name } => {
                write!(f, "{} is not supported by the script machine", name)
            }
            ScriptError::VerifyFailed { opcode } => {
                write!(f, "{} Error: verification failed", opcode)
            }
            ScriptError::OpReturn => {
                write!(f, "OP_RETURN Error: script is unspendable")
            }
            ScriptError::UnbalancedConditional { opcode } => {
                write!(f, "{} Error: no matching OP_IF or OP_NOTIF", opcode)
            }
            ScriptError::NumericOverflow {
                opcode,
                size,
                limit,
            } => {
                write!(
                    f,
                    "{} Error: number is {} bytes, limit is {}",
                    opcode, size, limit
                )
            }
            ScriptError::PushSizeExceeded { size, limit } => {
                write!(
                    f,
                    "Push Error: element is {} bytes, limit is {}",
                    size, limit
                )
            }
            ScriptError::InvalidOperand { opcode, message } => {
                write!(f, "{} Error: {}", opcode, message)
            }
            ScriptError::MissingTxTemplate { opcode } => {
                write!(f, "{} Error: a transaction template is required", opcode)
            }
            ScriptError::Unsatisfied { opcode, reason } => {
                write!(f, "{} Error: {}", opcode, reason)
            }
        }
    }
}

impl std::error::Error for ScriptError {}
