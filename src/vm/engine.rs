//! Stack machine executing pushes and opcodes
//!
//! [`ScriptMachine`] keeps the main stack, the alt stack and the stack of
//! `OP_IF` conditions. Lines are fed one at a time through the [`ScriptVm`]
//! trait; inside a branch that is not taken, pushes and opcodes are recorded
//! in the bytecode but do not touch the stacks.
//!
//! # Error Latching
//!
//! The first failure is stored and every later call is ignored until
//! [`ScriptVm::clear_stack`]. This mirrors script evaluation, where the first
//! failing opcode aborts the script.

use super::compile::encode_push;
use super::data::StackData;
use super::errors::ScriptError;
use super::network::VmConfig;
use super::num::{
    cast_to_bool, decode_le32, decode_le64, decode_scriptnum, encode_le64, LE64_NUM_SIZE,
    LOCKTIME_NUM_SIZE, MAX_NUM_SIZE,
};
use super::opcodes::*;
use super::tx::{TxTemplate, LOCKTIME_THRESHOLD, SEQUENCE_FINAL};
use super::ScriptVm;
use ripemd::Ripemd160;
use sha2::{Digest, Sha256};

/// Maximum size of a single stack element
pub const MAX_SCRIPT_ELEMENT_SIZE: usize = 520;

const SEQUENCE_LOCKTIME_DISABLE_FLAG: i64 = 1 << 31;
const SEQUENCE_LOCKTIME_TYPE_FLAG: u32 = 1 << 22;
const SEQUENCE_LOCKTIME_MASK: u32 = 0x0000_ffff;

/// Explicit (unblinded) value prefix for Liquid amounts
const EXPLICIT_VALUE_PREFIX: u8 = 0x01;

#[derive(Debug, Clone)]
pub struct ScriptMachine {
    opcodes: OpcodeTable,
    main: Vec<StackData>,
    alt: Vec<StackData>,
    conditions: Vec<bool>,
    error: Option<ScriptError>,
    tx: Option<TxTemplate>,
    bytecode: Vec<u8>,
}

impl ScriptMachine {
    pub fn new(config: VmConfig) -> Self {
        ScriptMachine {
            opcodes: OpcodeTable::new(config),
            main: Vec::new(),
            alt: Vec::new(),
            conditions: Vec::new(),
            error: None,
            tx: None,
            bytecode: Vec::new(),
        }
    }

    pub fn config(&self) -> VmConfig {
        self.opcodes.config()
    }

    pub fn opcodes(&self) -> &OpcodeTable {
        &self.opcodes
    }

    pub fn bytecode(&self) -> &[u8] {
        &self.bytecode
    }

    pub fn tx_template(&self) -> Option<&TxTemplate> {
        self.tx.as_ref()
    }

    /// Whether every enclosing `OP_IF` branch is taken
    pub fn is_executing(&self) -> bool {
        self.conditions.iter().all(|c| *c)
    }

    /// Number of `OP_IF`/`OP_NOTIF` blocks still open
    pub fn open_conditionals(&self) -> usize {
        self.conditions.len()
    }

    fn latch(&mut self, result: Result<(), ScriptError>) {
        if let Err(e) = result {
            if self.error.is_none() {
                self.error = Some(e);
            }
        }
    }

    fn push_literal(&mut self, data: StackData) -> Result<(), ScriptError> {
        if data.len() > MAX_SCRIPT_ELEMENT_SIZE {
            return Err(ScriptError::PushSizeExceeded {
                size: data.len(),
                limit: MAX_SCRIPT_ELEMENT_SIZE,
            });
        }

        self.bytecode.extend(encode_push(data.bytes()));
        if self.is_executing() {
            self.main.push(data);
        }
        Ok(())
    }

    fn op_name(&self, op: u8) -> String {
        self.opcodes
            .name(op)
            .map(|s| s.to_string())
            .unwrap_or_else(|| format!("0x{:02x}", op))
    }

    fn underflow(&self, op: u8) -> ScriptError {
        ScriptError::StackUnderflow {
            opcode: self.op_name(op),
        }
    }

    fn invalid(&self, op: u8, message: impl Into<String>) -> ScriptError {
        ScriptError::InvalidOperand {
            opcode: self.op_name(op),
            message: message.into(),
        }
    }

    fn require(&self, count: usize, op: u8) -> Result<usize, ScriptError> {
        let len = self.main.len();
        if len < count {
            return Err(self.underflow(op));
        }
        Ok(len)
    }

    fn pop(&mut self, op: u8) -> Result<StackData, ScriptError> {
        match self.main.pop() {
            Some(data) => Ok(data),
            None => Err(self.underflow(op)),
        }
    }

    fn top(&self, op: u8) -> Result<&StackData, ScriptError> {
        self.main.last().ok_or_else(|| self.underflow(op))
    }

    fn pop_num(&mut self, op: u8) -> Result<i64, ScriptError> {
        self.pop_num_sized(op, MAX_NUM_SIZE)
    }

    fn pop_num_sized(&mut self, op: u8, max_size: usize) -> Result<i64, ScriptError> {
        let data = self.pop(op)?;
        decode_scriptnum(data.bytes(), max_size).ok_or_else(|| ScriptError::NumericOverflow {
            opcode: self.op_name(op),
            size: data.len(),
            limit: max_size,
        })
    }

    fn pop_le64(&mut self, op: u8) -> Result<i64, ScriptError> {
        let data = self.pop(op)?;
        decode_le64(data.bytes()).ok_or_else(|| {
            self.invalid(
                op,
                format!("expected an 8-byte value, got {} bytes", data.len()),
            )
        })
    }

    /// Pop a non-negative index
    fn pop_index(&mut self, op: u8) -> Result<usize, ScriptError> {
        let n = self.pop_num(op)?;
        if n < 0 {
            return Err(self.invalid(op, format!("negative index {}", n)));
        }
        Ok(n as usize)
    }

    fn push_num(&mut self, n: i64) {
        self.main.push(StackData::from_number(n));
    }

    fn push_bool(&mut self, value: bool) {
        self.main.push(StackData::from_bool(value));
    }

    fn push_bytes(&mut self, bytes: Vec<u8>) {
        self.main.push(StackData::from_bytes(bytes));
    }

    fn require_tx(&self, op: u8) -> Result<&TxTemplate, ScriptError> {
        self.tx.as_ref().ok_or_else(|| ScriptError::MissingTxTemplate {
            opcode: self.op_name(op),
        })
    }

    /// Execute one opcode byte
    fn execute(&mut self, op: u8) -> Result<(), ScriptError> {
        if self.opcodes.is_disabled(op) {
            return Err(ScriptError::DisabledOpcode {
                name: self.op_name(op),
            });
        }

        let executing = self.is_executing();
        let is_conditional = matches!(op, OP_IF | OP_NOTIF | OP_ELSE | OP_ENDIF);
        if !executing && !is_conditional {
            return Ok(());
        }

        match op {
            // Constants
            OP_0 => self.push_num(0),
            OP_1NEGATE => self.push_num(-1),
            OP_1..=OP_16 => self.push_num((op - OP_1 + 1) as i64),
            OP_PUSHDATA1 | OP_PUSHDATA2 | OP_PUSHDATA4 => {
                return Err(self.invalid(op, "push data with a <0x...> literal instead"));
            }

            // Flow control
            OP_NOP | OP_NOP1 | OP_CODESEPARATOR => {}
            0xb3..=OP_NOP10 => {}
            OP_IF | OP_NOTIF => {
                let mut value = false;
                if executing {
                    let top = self.pop(op)?;
                    value = cast_to_bool(top.bytes());
                    if op == OP_NOTIF {
                        value = !value;
                    }
                }
                self.conditions.push(value);
            }
            OP_ELSE => {
                if self.conditions.is_empty() {
                    return Err(ScriptError::UnbalancedConditional {
                        opcode: self.op_name(op),
                    });
                }
                let last = self.conditions.len() - 1;
                self.conditions[last] = !self.conditions[last];
            }
            OP_ENDIF => {
                if self.conditions.pop().is_none() {
                    return Err(ScriptError::UnbalancedConditional {
                        opcode: self.op_name(op),
                    });
                }
            }
            OP_VERIFY => {
                let top = self.pop(op)?;
                if !cast_to_bool(top.bytes()) {
                    return Err(ScriptError::VerifyFailed {
                        opcode: self.op_name(op),
                    });
                }
            }
            OP_RETURN => return Err(ScriptError::OpReturn),

            // Stack
            OP_TOALTSTACK => {
                let top = self.pop(op)?;
                self.alt.push(top);
            }
            OP_FROMALTSTACK => match self.alt.pop() {
                Some(top) => self.main.push(top),
                None => return Err(self.underflow(op)),
            },
            OP_2DROP => {
                let len = self.require(2, op)?;
                self.main.truncate(len - 2);
            }
            OP_2DUP | OP_3DUP => {
                let count = if op == OP_2DUP { 2 } else { 3 };
                let len = self.require(count, op)?;
                let copies = self.main[len - count..].to_vec();
                self.main.extend(copies);
            }
            OP_2OVER => {
                let len = self.require(4, op)?;
                let copies = self.main[len - 4..len - 2].to_vec();
                self.main.extend(copies);
            }
            OP_2ROT => {
                let len = self.require(6, op)?;
                let moved: Vec<StackData> = self.main.drain(len - 6..len - 4).collect();
                self.main.extend(moved);
            }
            OP_2SWAP => {
                let len = self.require(4, op)?;
                self.main.swap(len - 4, len - 2);
                self.main.swap(len - 3, len - 1);
            }
            OP_IFDUP => {
                let top = self.top(op)?.clone();
                if cast_to_bool(top.bytes()) {
                    self.main.push(top);
                }
            }
            OP_DEPTH => {
                let depth = self.main.len() as i64;
                self.push_num(depth);
            }
            OP_DROP => {
                self.pop(op)?;
            }
            OP_DUP => {
                let top = self.top(op)?.clone();
                self.main.push(top);
            }
            OP_NIP => {
                let len = self.require(2, op)?;
                self.main.remove(len - 2);
            }
            OP_OVER => {
                let len = self.require(2, op)?;
                let second = self.main[len - 2].clone();
                self.main.push(second);
            }
            OP_PICK | OP_ROLL => {
                let n = self.pop_num(op)?;
                let len = self.main.len();
                if n < 0 || n as usize >= len {
                    return Err(self.invalid(
                        op,
                        format!("index {} out of range for stack of {}", n, len),
                    ));
                }
                let idx = len - 1 - n as usize;
                let item = if op == OP_ROLL {
                    self.main.remove(idx)
                } else {
                    self.main[idx].clone()
                };
                self.main.push(item);
            }
            OP_ROT => {
                let len = self.require(3, op)?;
                let third = self.main.remove(len - 3);
                self.main.push(third);
            }
            OP_SWAP => {
                let len = self.require(2, op)?;
                self.main.swap(len - 2, len - 1);
            }
            OP_TUCK => {
                let len = self.require(2, op)?;
                let top = self.main[len - 1].clone();
                self.main.insert(len - 2, top);
            }

            // Splice
            OP_CAT => {
                let b = self.pop(op)?;
                let a = self.pop(op)?;
                let mut joined = a.bytes().to_vec();
                joined.extend_from_slice(b.bytes());
                if joined.len() > MAX_SCRIPT_ELEMENT_SIZE {
                    return Err(ScriptError::PushSizeExceeded {
                        size: joined.len(),
                        limit: MAX_SCRIPT_ELEMENT_SIZE,
                    });
                }
                self.push_bytes(joined);
            }
            OP_SUBSTR => {
                let size = self.pop_index(op)?;
                let begin = self.pop_index(op)?;
                let data = self.pop(op)?;
                let end = begin.saturating_add(size);
                if end > data.len() {
                    return Err(self.invalid(
                        op,
                        format!(
                            "range {}..{} out of bounds for {} bytes",
                            begin,
                            end,
                            data.len()
                        ),
                    ));
                }
                self.push_bytes(data.bytes()[begin..end].to_vec());
            }
            OP_LEFT | OP_RIGHT => {
                let size = self.pop_index(op)?;
                let data = self.pop(op)?;
                let size = size.min(data.len());
                let slice = if op == OP_LEFT {
                    &data.bytes()[..size]
                } else {
                    &data.bytes()[data.len() - size..]
                };
                self.push_bytes(slice.to_vec());
            }
            OP_SIZE => {
                let size = self.top(op)?.len() as i64;
                self.push_num(size);
            }

            // Bitwise logic
            OP_INVERT => {
                let data = self.pop(op)?;
                self.push_bytes(data.bytes().iter().map(|b| !b).collect());
            }
            OP_AND | OP_OR | OP_XOR => {
                let b = self.pop(op)?;
                let a = self.pop(op)?;
                if a.len() != b.len() {
                    return Err(self.invalid(
                        op,
                        format!("operands differ in size ({} and {})", a.len(), b.len()),
                    ));
                }
                let result = a
                    .bytes()
                    .iter()
                    .zip(b.bytes())
                    .map(|(x, y)| match op {
                        OP_AND => x & y,
                        OP_OR => x | y,
                        _ => x ^ y,
                    })
                    .collect();
                self.push_bytes(result);
            }
            OP_EQUAL | OP_EQUALVERIFY => {
                let b = self.pop(op)?;
                let a = self.pop(op)?;
                let equal = a.bytes() == b.bytes();
                if op == OP_EQUALVERIFY {
                    if !equal {
                        return Err(ScriptError::VerifyFailed {
                            opcode: self.op_name(op),
                        });
                    }
                } else {
                    self.push_bool(equal);
                }
            }

            // Arithmetic
            OP_1ADD | OP_1SUB | OP_NEGATE | OP_ABS | OP_NOT | OP_0NOTEQUAL => {
                let a = self.pop_num(op)?;
                let result = match op {
                    OP_1ADD => a + 1,
                    OP_1SUB => a - 1,
                    OP_NEGATE => -a,
                    OP_ABS => a.abs(),
                    OP_NOT => (a == 0) as i64,
                    _ => (a != 0) as i64,
                };
                self.push_num(result);
            }
            OP_ADD | OP_SUB | OP_BOOLAND | OP_BOOLOR | OP_NUMEQUAL | OP_NUMEQUALVERIFY
            | OP_NUMNOTEQUAL | OP_LESSTHAN | OP_GREATERTHAN | OP_LESSTHANOREQUAL
            | OP_GREATERTHANOREQUAL | OP_MIN | OP_MAX => {
                let b = self.pop_num(op)?;
                let a = self.pop_num(op)?;
                match op {
                    OP_ADD => self.push_num(a + b),
                    OP_SUB => self.push_num(a - b),
                    OP_MIN => self.push_num(a.min(b)),
                    OP_MAX => self.push_num(a.max(b)),
                    OP_BOOLAND => self.push_bool(a != 0 && b != 0),
                    OP_BOOLOR => self.push_bool(a != 0 || b != 0),
                    OP_NUMEQUAL => self.push_bool(a == b),
                    OP_NUMNOTEQUAL => self.push_bool(a != b),
                    OP_LESSTHAN => self.push_bool(a < b),
                    OP_GREATERTHAN => self.push_bool(a > b),
                    OP_LESSTHANOREQUAL => self.push_bool(a <= b),
                    OP_GREATERTHANOREQUAL => self.push_bool(a >= b),
                    _ => {
                        if a != b {
                            return Err(ScriptError::VerifyFailed {
                                opcode: self.op_name(op),
                            });
                        }
                    }
                }
            }
            OP_WITHIN => {
                let max = self.pop_num(op)?;
                let min = self.pop_num(op)?;
                let x = self.pop_num(op)?;
                self.push_bool(min <= x && x < max);
            }

            // Crypto
            OP_RIPEMD160 | OP_SHA256 | OP_HASH160 | OP_HASH256 => {
                let data = self.pop(op)?;
                let digest = match op {
                    OP_RIPEMD160 => Ripemd160::digest(data.bytes()).to_vec(),
                    OP_SHA256 => Sha256::digest(data.bytes()).to_vec(),
                    OP_HASH160 => Ripemd160::digest(Sha256::digest(data.bytes())).to_vec(),
                    _ => Sha256::digest(Sha256::digest(data.bytes())).to_vec(),
                };
                self.push_bytes(digest);
            }

            // Locktime
            OP_CHECKLOCKTIMEVERIFY => self.check_locktime(op)?,
            OP_CHECKSEQUENCEVERIFY => self.check_sequence(op)?,

            // Liquid introspection
            OP_PUSHCURRENTINPUTINDEX => {
                let index = self.require_tx(op)?.current_input_index;
                self.push_num(index as i64);
            }
            OP_INSPECTINPUTVALUE | OP_INSPECTOUTPUTVALUE => {
                let index = self.pop_index(op)?;
                let tx = self.require_tx(op)?;
                let amount = if op == OP_INSPECTINPUTVALUE {
                    tx.inputs.get(index).map(|i| i.amount)
                } else {
                    tx.outputs.get(index).map(|o| o.amount)
                };
                let amount =
                    amount.ok_or_else(|| self.invalid(op, format!("no entry at index {}", index)))?;
                self.push_bytes(amount.to_le_bytes().to_vec());
                self.push_bytes(vec![EXPLICIT_VALUE_PREFIX]);
            }
            OP_INSPECTINPUTSEQUENCE => {
                let index = self.pop_index(op)?;
                let sequence = self
                    .require_tx(op)?
                    .inputs
                    .get(index)
                    .map(|i| i.sequence)
                    .ok_or_else(|| self.invalid(op, format!("no input at index {}", index)))?;
                self.push_bytes(sequence.to_le_bytes().to_vec());
            }
            OP_INSPECTVERSION => {
                let version = self.require_tx(op)?.version;
                self.push_bytes(version.to_le_bytes().to_vec());
            }
            OP_INSPECTLOCKTIME => {
                let locktime = self.require_tx(op)?.locktime;
                self.push_bytes(locktime.to_le_bytes().to_vec());
            }
            OP_INSPECTNUMINPUTS => {
                let count = self.require_tx(op)?.inputs.len() as i64;
                self.push_num(count);
            }
            OP_INSPECTNUMOUTPUTS => {
                let count = self.require_tx(op)?.outputs.len() as i64;
                self.push_num(count);
            }

            // Liquid 64-bit arithmetic
            OP_ADD64 | OP_SUB64 | OP_MUL64 => {
                let b = self.pop_le64(op)?;
                let a = self.pop_le64(op)?;
                let result = match op {
                    OP_ADD64 => a.checked_add(b),
                    OP_SUB64 => a.checked_sub(b),
                    _ => a.checked_mul(b),
                };
                self.push_checked(result);
            }
            OP_DIV64 => {
                let b = self.pop_le64(op)?;
                let a = self.pop_le64(op)?;
                if b == 0 || (a == i64::MIN && b == -1) {
                    self.push_bool(false);
                } else {
                    self.push_bytes(encode_le64(a.rem_euclid(b)));
                    self.push_bytes(encode_le64(a.div_euclid(b)));
                    self.push_bool(true);
                }
            }
            OP_NEG64 => {
                let a = self.pop_le64(op)?;
                self.push_checked(a.checked_neg());
            }
            OP_LESSTHAN64 | OP_LESSTHANOREQUAL64 | OP_GREATERTHAN64 | OP_GREATERTHANOREQUAL64 => {
                let b = self.pop_le64(op)?;
                let a = self.pop_le64(op)?;
                let result = match op {
                    OP_LESSTHAN64 => a < b,
                    OP_LESSTHANOREQUAL64 => a <= b,
                    OP_GREATERTHAN64 => a > b,
                    _ => a >= b,
                };
                self.push_bool(result);
            }
            OP_SCRIPTNUMTOLE64 => {
                let n = self.pop_num_sized(op, LE64_NUM_SIZE)?;
                self.push_bytes(encode_le64(n));
            }
            OP_LE64TOSCRIPTNUM => {
                let n = self.pop_le64(op)?;
                self.push_num(n);
            }
            OP_LE32TOLE64 => {
                let data = self.pop(op)?;
                let n = decode_le32(data.bytes()).ok_or_else(|| {
                    self.invalid(op, format!("expected a 4-byte value, got {} bytes", data.len()))
                })?;
                self.push_bytes(encode_le64(n as i64));
            }

            OP_RESERVED | OP_VER | OP_RESERVED1 | OP_RESERVED2 => {
                return Err(self.invalid(op, "reserved opcode"));
            }

            // Signature checks, OP_SHA1, the SHA256 streaming and remaining
            // introspection opcodes
            _ => {
                return Err(ScriptError::UnsupportedOpcode {
                    name: self.op_name(op),
                })
            }
        }

        Ok(())
    }

    /// 64-bit results: `<result> 1` on success, `0` on overflow
    fn push_checked(&mut self, result: Option<i64>) {
        match result {
            Some(value) => {
                self.push_bytes(encode_le64(value));
                self.push_bool(true);
            }
            None => self.push_bool(false),
        }
    }

    fn check_locktime(&self, op: u8) -> Result<(), ScriptError> {
        let name = self.op_name(op);
        let tx = self.require_tx(op)?;
        let top = self.top(op)?;
        let lock = decode_scriptnum(top.bytes(), LOCKTIME_NUM_SIZE).ok_or_else(|| {
            ScriptError::NumericOverflow {
                opcode: name.clone(),
                size: top.len(),
                limit: LOCKTIME_NUM_SIZE,
            }
        })?;

        if lock < 0 {
            return Err(self.invalid(op, format!("negative lock time {}", lock)));
        }

        let threshold = LOCKTIME_THRESHOLD as i64;
        let tx_lock = tx.locktime as i64;
        if (lock < threshold) != (tx_lock < threshold) {
            return Err(ScriptError::Unsatisfied {
                opcode: name,
                reason: "lock time and transaction lock time are of different types".to_string(),
            });
        }
        if lock > tx_lock {
            return Err(ScriptError::Unsatisfied {
                opcode: name,
                reason: format!(
                    "lock time {} not reached (transaction lock time {})",
                    lock, tx_lock
                ),
            });
        }

        match tx.current_input() {
            Some(input) if input.sequence != SEQUENCE_FINAL => Ok(()),
            _ => Err(ScriptError::Unsatisfied {
                opcode: name,
                reason: "input sequence is final".to_string(),
            }),
        }
    }

    fn check_sequence(&self, op: u8) -> Result<(), ScriptError> {
        let name = self.op_name(op);
        let tx = self.require_tx(op)?;
        let top = self.top(op)?;
        let sequence = decode_scriptnum(top.bytes(), LOCKTIME_NUM_SIZE).ok_or_else(|| {
            ScriptError::NumericOverflow {
                opcode: name.clone(),
                size: top.len(),
                limit: LOCKTIME_NUM_SIZE,
            }
        })?;

        if sequence < 0 {
            return Err(self.invalid(op, format!("negative sequence {}", sequence)));
        }
        if sequence & SEQUENCE_LOCKTIME_DISABLE_FLAG != 0 {
            return Ok(());
        }

        if tx.version < 2 {
            return Err(ScriptError::Unsatisfied {
                opcode: name,
                reason: format!("transaction version {} is below 2", tx.version),
            });
        }

        let tx_sequence = match tx.current_input() {
            Some(input) => input.sequence,
            None => return Err(self.invalid(op, "current input index out of range")),
        };
        if tx_sequence as i64 & SEQUENCE_LOCKTIME_DISABLE_FLAG != 0 {
            return Err(ScriptError::Unsatisfied {
                opcode: name,
                reason: "input sequence has the disable flag set".to_string(),
            });
        }

        let mask = SEQUENCE_LOCKTIME_TYPE_FLAG | SEQUENCE_LOCKTIME_MASK;
        let tx_masked = tx_sequence & mask;
        let lock_masked = (sequence as u32) & mask;

        if (lock_masked < SEQUENCE_LOCKTIME_TYPE_FLAG) != (tx_masked < SEQUENCE_LOCKTIME_TYPE_FLAG)
        {
            return Err(ScriptError::Unsatisfied {
                opcode: name,
                reason: "relative lock and input sequence are of different types".to_string(),
            });
        }
        if lock_masked > tx_masked {
            return Err(ScriptError::Unsatisfied {
                opcode: name,
                reason: format!(
                    "relative lock {} not reached (input sequence {})",
                    lock_masked, tx_masked
                ),
            });
        }

        Ok(())
    }
}

impl ScriptVm for ScriptMachine {
    fn clear_stack(&mut self) {
        self.main.clear();
        self.alt.clear();
        self.conditions.clear();
        self.error = None;
        self.tx = None;
        self.bytecode.clear();
    }

    fn push_hex(&mut self, hex: &str) {
        if self.error.is_some() {
            return;
        }
        let result = StackData::from_hex(hex).and_then(|data| self.push_literal(data));
        self.latch(result);
    }

    fn push_bin(&mut self, bin: &str) {
        if self.error.is_some() {
            return;
        }
        let result = StackData::from_bin(bin).and_then(|data| self.push_literal(data));
        self.latch(result);
    }

    fn push_number(&mut self, n: i64) {
        if self.error.is_some() {
            return;
        }
        let result = self.push_literal(StackData::from_number(n));
        self.latch(result);
    }

    fn push_text(&mut self, text: &str) {
        if self.error.is_some() {
            return;
        }
        let result = self.push_literal(StackData::from_text(text));
        self.latch(result);
    }

    fn push_opcode(&mut self, name: &str) {
        if self.error.is_some() {
            return;
        }
        let result = match self.opcodes.byte(name) {
            Some(op) => {
                self.bytecode.push(op);
                self.execute(op)
            }
            None => Err(ScriptError::UnknownOpcode {
                name: name.to_string(),
            }),
        };
        self.latch(result);
    }

    fn opcode_hex(&self, name: &str) -> Option<String> {
        self.opcodes.word_hex(name)
    }

    fn set_tx_template(&mut self, tx: &TxTemplate) {
        self.tx = Some(tx.clone());
    }

    fn stack(&self) -> &[StackData] {
        &self.main
    }

    fn error(&self) -> Option<&ScriptError> {
        self.error.as_ref()
    }

    fn compile(&self) -> String {
        hex::encode(&self.bytecode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vm::network::{Network, ScriptVersion};

    fn machine() -> ScriptMachine {
        ScriptMachine::new(VmConfig::default())
    }

    fn displayed(vm: &ScriptMachine) -> Vec<String> {
        vm.stack().iter().map(|d| d.display_value()).collect()
    }

    #[test]
    fn test_add() {
        let mut vm = machine();
        vm.push_hex("01");
        vm.push_number(5);
        vm.push_opcode("OP_ADD");

        assert!(vm.error().is_none());
        assert_eq!(displayed(&vm), vec!["6"]);
        assert_eq!(vm.compile(), "515593");
    }

    #[test]
    fn test_underflow_latches() {
        let mut vm = machine();
        vm.push_opcode("OP_ADD");
        assert_eq!(
            vm.error(),
            Some(&ScriptError::StackUnderflow {
                opcode: "OP_ADD".to_string()
            })
        );

        // later pushes are ignored
        vm.push_number(1);
        assert!(vm.stack().is_empty());

        vm.clear_stack();
        assert!(vm.error().is_none());
        vm.push_number(1);
        assert_eq!(vm.stack().len(), 1);
    }

    #[test]
    fn test_conditional_branches() {
        let mut vm = machine();
        vm.push_number(0);
        vm.push_opcode("OP_IF");
        vm.push_number(10);
        vm.push_opcode("OP_ELSE");
        vm.push_number(20);
        vm.push_opcode("OP_ENDIF");

        assert!(vm.error().is_none());
        assert_eq!(displayed(&vm), vec!["20"]);
        assert_eq!(vm.open_conditionals(), 0);
    }

    #[test]
    fn test_unbalanced_endif() {
        let mut vm = machine();
        vm.push_opcode("OP_ENDIF");
        assert!(matches!(
            vm.error(),
            Some(ScriptError::UnbalancedConditional { .. })
        ));
    }

    #[test]
    fn test_stack_shuffles() {
        let mut vm = machine();
        for n in 1..=3 {
            vm.push_number(n);
        }
        vm.push_opcode("OP_ROT");
        assert_eq!(displayed(&vm), vec!["2", "3", "1"]);

        vm.push_opcode("OP_SWAP");
        assert_eq!(displayed(&vm), vec!["2", "1", "3"]);

        vm.push_opcode("OP_TUCK");
        assert_eq!(displayed(&vm), vec!["2", "3", "1", "3"]);

        vm.push_number(2);
        vm.push_opcode("OP_ROLL");
        assert_eq!(displayed(&vm), vec!["2", "1", "3", "3"]);

        vm.push_opcode("OP_2SWAP");
        assert_eq!(displayed(&vm), vec!["3", "3", "2", "1"]);

        vm.push_opcode("OP_DEPTH");
        assert_eq!(displayed(&vm).last().map(String::as_str), Some("4"));
    }

    #[test]
    fn test_equal_and_verify() {
        let mut vm = machine();
        vm.push_text("a");
        vm.push_hex("61");
        vm.push_opcode("OP_EQUAL");
        assert_eq!(displayed(&vm), vec!["1"]);

        vm.push_number(3);
        vm.push_number(4);
        vm.push_opcode("OP_EQUALVERIFY");
        assert_eq!(
            vm.error_message().as_deref(),
            Some("OP_EQUALVERIFY Error: verification failed")
        );
    }

    #[test]
    fn test_hash_opcodes() {
        let mut vm = machine();
        vm.push_text("");
        vm.push_opcode("OP_SHA256");
        assert_eq!(
            vm.stack()[0].hex(),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );

        vm.push_opcode("OP_DROP");
        vm.push_text("");
        vm.push_opcode("OP_HASH160");
        assert_eq!(vm.stack()[0].hex(), "b472a266d0bd89c13706a4132ccfb16f7c3b9fcb");
    }

    #[test]
    fn test_disabled_opcode() {
        let mut vm = machine();
        vm.push_text("a");
        vm.push_text("b");
        vm.push_opcode("OP_CAT");
        assert_eq!(
            vm.error(),
            Some(&ScriptError::DisabledOpcode {
                name: "OP_CAT".to_string()
            })
        );

        let mut liquid = ScriptMachine::new(VmConfig::new(Network::Liquid, ScriptVersion::Segwit));
        liquid.push_text("a");
        liquid.push_text("b");
        liquid.push_opcode("OP_CAT");
        assert!(liquid.error().is_none());
        assert_eq!(liquid.stack()[0].bytes(), b"ab");
    }

    #[test]
    fn test_locktime_requires_template() {
        let mut vm = machine();
        vm.push_number(100);
        vm.push_opcode("OP_CHECKLOCKTIMEVERIFY");
        assert!(matches!(
            vm.error(),
            Some(ScriptError::MissingTxTemplate { .. })
        ));

        let mut vm = machine();
        let mut tx = TxTemplate::default();
        tx.locktime = 150;
        tx.inputs[0].sequence = 0xffff_fffe;
        vm.set_tx_template(&tx);
        vm.push_number(100);
        vm.push_opcode("OP_CHECKLOCKTIMEVERIFY");
        assert!(vm.error().is_none());
        assert_eq!(displayed(&vm), vec!["100"]);

        vm.push_number(200);
        vm.push_opcode("OP_CHECKLOCKTIMEVERIFY");
        assert!(matches!(vm.error(), Some(ScriptError::Unsatisfied { .. })));
    }

    #[test]
    fn test_checksequenceverify() {
        let mut vm = machine();
        let mut tx = TxTemplate::default();
        tx.inputs[0].sequence = 10;
        vm.set_tx_template(&tx);
        vm.push_number(5);
        vm.push_opcode("OP_CHECKSEQUENCEVERIFY");
        assert!(vm.error().is_none());

        vm.push_number(11);
        vm.push_opcode("OP_CHECKSEQUENCEVERIFY");
        assert!(matches!(vm.error(), Some(ScriptError::Unsatisfied { .. })));
    }

    #[test]
    fn test_liquid_64bit_arithmetic() {
        let mut vm = ScriptMachine::new(VmConfig::new(Network::Liquid, ScriptVersion::Tapscript));
        vm.push_hex("0500000000000000");
        vm.push_hex("0700000000000000");
        vm.push_opcode("OP_ADD64");

        assert!(vm.error().is_none());
        assert_eq!(vm.stack().len(), 2);
        assert_eq!(vm.stack()[0].hex(), "0c00000000000000");
        assert_eq!(vm.stack()[1].display_value(), "1");

        vm.push_opcode("OP_DROP");
        vm.push_opcode("OP_LE64TOSCRIPTNUM");
        assert_eq!(displayed(&vm), vec!["12"]);
    }

    #[test]
    fn test_liquid_introspection() {
        let mut vm = ScriptMachine::new(VmConfig::new(Network::Liquid, ScriptVersion::Tapscript));
        let mut tx = TxTemplate::default();
        tx.inputs[0].amount = 1000;
        vm.set_tx_template(&tx);

        vm.push_opcode("OP_PUSHCURRENTINPUTINDEX");
        vm.push_opcode("OP_INSPECTINPUTVALUE");
        assert!(vm.error().is_none());
        assert_eq!(vm.stack()[0].hex(), "e803000000000000");
        assert_eq!(vm.stack()[1].hex(), "01");

        vm.push_opcode("OP_INSPECTNUMOUTPUTS");
        assert_eq!(vm.stack()[2].display_value(), "1");
    }

    #[test]
    fn test_signature_opcodes_unsupported() {
        let mut vm = machine();
        vm.push_hex("aa");
        vm.push_hex("bb");
        vm.push_opcode("OP_CHECKSIG");
        assert_eq!(
            vm.error(),
            Some(&ScriptError::UnsupportedOpcode {
                name: "OP_CHECKSIG".to_string()
            })
        );
    }
}
