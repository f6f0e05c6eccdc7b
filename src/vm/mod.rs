//! Script virtual machine
//!
//! This module provides the machine the editor evaluates lines against:
//! - [`engine`]: [`ScriptMachine`], the stack machine and opcode semantics
//! - [`data`]: [`StackData`] stack elements with their display form
//! - [`num`]: script number and 64-bit integer encodings
//! - [`opcodes`]: opcode word/byte tables per network
//! - [`compile`]: push encoding and disassembly
//! - [`tx`]: the simulated spending transaction
//! - [`errors`]: [`ScriptError`]
//!
//! # Interface
//!
//! The editor only talks to the machine through [`ScriptVm`]. Every push or
//! opcode mutates the machine's stack; failures are latched inside the
//! machine and read back with [`ScriptVm::error_message`], so a caller can
//! feed lines one by one and take a snapshot of [`ScriptVm::stack`] after each.

pub mod compile;
pub mod data;
pub mod engine;
pub mod errors;
pub mod network;
pub mod num;
pub mod opcodes;
pub mod tx;

pub use data::StackData;
pub use engine::ScriptMachine;
pub use errors::ScriptError;
pub use network::{Network, ScriptVersion, VmConfig};
pub use tx::TxTemplate;

/// Operations the editor needs from a script machine
pub trait ScriptVm {
    /// Reset stacks, conditionals, the latched error, the template and bytecode
    fn clear_stack(&mut self);

    /// Push a hex literal (without `0x`)
    fn push_hex(&mut self, hex: &str);

    /// Push a binary literal (without `0b`)
    fn push_bin(&mut self, bin: &str);

    fn push_number(&mut self, n: i64);

    fn push_text(&mut self, text: &str);

    /// Execute an opcode word such as `OP_ADD`
    fn push_opcode(&mut self, name: &str);

    /// `0x`-prefixed byte of an opcode word, if the word is known
    fn opcode_hex(&self, name: &str) -> Option<String>;

    /// Make a transaction template available to introspection opcodes
    fn set_tx_template(&mut self, tx: &TxTemplate);

    /// Current main stack, bottom first
    fn stack(&self) -> &[StackData];

    /// The latched error, if any
    fn error(&self) -> Option<&ScriptError>;

    fn error_message(&self) -> Option<String> {
        self.error().map(|e| e.to_string())
    }

    /// Hex of the bytecode recorded since the last [`clear_stack`](ScriptVm::clear_stack)
    fn compile(&self) -> String;
}
