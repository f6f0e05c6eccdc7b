//! Opcode name and byte tables
//!
//! [`OpcodeTable`] maps opcode words (`OP_ADD`) to their byte values and back
//! for a given [`VmConfig`]. Opcodes that are disabled on a network are still
//! known by name, so `<OP_MUL>` can push the byte, but executing them fails.
//! Liquid tapscript opcodes are only known on that rule set.

use super::network::VmConfig;
use rustc_hash::FxHashMap;

pub const OP_0: u8 = 0x00;
pub const OP_PUSHDATA1: u8 = 0x4c;
pub const OP_PUSHDATA2: u8 = 0x4d;
pub const OP_PUSHDATA4: u8 = 0x4e;
pub const OP_1NEGATE: u8 = 0x4f;
pub const OP_RESERVED: u8 = 0x50;
pub const OP_1: u8 = 0x51;
pub const OP_16: u8 = 0x60;
pub const OP_NOP: u8 = 0x61;
pub const OP_VER: u8 = 0x62;
pub const OP_IF: u8 = 0x63;
pub const OP_NOTIF: u8 = 0x64;
pub const OP_VERIF: u8 = 0x65;
pub const OP_VERNOTIF: u8 = 0x66;
pub const OP_ELSE: u8 = 0x67;
pub const OP_ENDIF: u8 = 0x68;
pub const OP_VERIFY: u8 = 0x69;
pub const OP_RETURN: u8 = 0x6a;

pub const OP_TOALTSTACK: u8 = 0x6b;
pub const OP_FROMALTSTACK: u8 = 0x6c;
pub const OP_2DROP: u8 = 0x6d;
pub const OP_2DUP: u8 = 0x6e;
pub const OP_3DUP: u8 = 0x6f;
pub const OP_2OVER: u8 = 0x70;
pub const OP_2ROT: u8 = 0x71;
pub const OP_2SWAP: u8 = 0x72;
pub const OP_IFDUP: u8 = 0x73;
pub const OP_DEPTH: u8 = 0x74;
pub const OP_DROP: u8 = 0x75;
pub const OP_DUP: u8 = 0x76;
pub const OP_NIP: u8 = 0x77;
pub const OP_OVER: u8 = 0x78;
pub const OP_PICK: u8 = 0x79;
pub const OP_ROLL: u8 = 0x7a;
pub const OP_ROT: u8 = 0x7b;
pub const OP_SWAP: u8 = 0x7c;
pub const OP_TUCK: u8 = 0x7d;

pub const OP_CAT: u8 = 0x7e;
pub const OP_SUBSTR: u8 = 0x7f;
pub const OP_LEFT: u8 = 0x80;
pub const OP_RIGHT: u8 = 0x81;
pub const OP_SIZE: u8 = 0x82;

pub const OP_INVERT: u8 = 0x83;
pub const OP_AND: u8 = 0x84;
pub const OP_OR: u8 = 0x85;
pub const OP_XOR: u8 = 0x86;
pub const OP_EQUAL: u8 = 0x87;
pub const OP_EQUALVERIFY: u8 = 0x88;
pub const OP_RESERVED1: u8 = 0x89;
pub const OP_RESERVED2: u8 = 0x8a;

pub const OP_1ADD: u8 = 0x8b;
pub const OP_1SUB: u8 = 0x8c;
pub const OP_2MUL: u8 = 0x8d;
pub const OP_2DIV: u8 = 0x8e;
pub const OP_NEGATE: u8 = 0x8f;
pub const OP_ABS: u8 = 0x90;
pub const OP_NOT: u8 = 0x91;
pub const OP_0NOTEQUAL: u8 = 0x92;
pub const OP_ADD: u8 = 0x93;
pub const OP_SUB: u8 = 0x94;
pub const OP_MUL: u8 = 0x95;
pub const OP_DIV: u8 = 0x96;
pub const OP_MOD: u8 = 0x97;
pub const OP_LSHIFT: u8 = 0x98;
pub const OP_RSHIFT: u8 = 0x99;
pub const OP_BOOLAND: u8 = 0x9a;
pub const OP_BOOLOR: u8 = 0x9b;
pub const OP_NUMEQUAL: u8 = 0x9c;
pub const OP_NUMEQUALVERIFY: u8 = 0x9d;
pub const OP_NUMNOTEQUAL: u8 = 0x9e;
pub const OP_LESSTHAN: u8 = 0x9f;
pub const OP_GREATERTHAN: u8 = 0xa0;
pub const OP_LESSTHANOREQUAL: u8 = 0xa1;
pub const OP_GREATERTHANOREQUAL: u8 = 0xa2;
pub const OP_MIN: u8 = 0xa3;
pub const OP_MAX: u8 = 0xa4;
pub const OP_WITHIN: u8 = 0xa5;

pub const OP_RIPEMD160: u8 = 0xa6;
pub const OP_SHA1: u8 = 0xa7;
pub const OP_SHA256: u8 = 0xa8;
pub const OP_HASH160: u8 = 0xa9;
pub const OP_HASH256: u8 = 0xaa;
pub const OP_CODESEPARATOR: u8 = 0xab;
pub const OP_CHECKSIG: u8 = 0xac;
pub const OP_CHECKSIGVERIFY: u8 = 0xad;
pub const OP_CHECKMULTISIG: u8 = 0xae;
pub const OP_CHECKMULTISIGVERIFY: u8 = 0xaf;

pub const OP_NOP1: u8 = 0xb0;
pub const OP_CHECKLOCKTIMEVERIFY: u8 = 0xb1;
pub const OP_CHECKSEQUENCEVERIFY: u8 = 0xb2;
pub const OP_NOP10: u8 = 0xb9;
pub const OP_CHECKSIGADD: u8 = 0xba;

// Liquid tapscript
pub const OP_SHA256INITIALIZE: u8 = 0xc4;
pub const OP_PUSHCURRENTINPUTINDEX: u8 = 0xcd;
pub const OP_INSPECTINPUTVALUE: u8 = 0xc9;
pub const OP_INSPECTINPUTSEQUENCE: u8 = 0xcb;
pub const OP_INSPECTOUTPUTVALUE: u8 = 0xcf;
pub const OP_INSPECTVERSION: u8 = 0xd2;
pub const OP_INSPECTLOCKTIME: u8 = 0xd3;
pub const OP_INSPECTNUMINPUTS: u8 = 0xd4;
pub const OP_INSPECTNUMOUTPUTS: u8 = 0xd5;
pub const OP_ADD64: u8 = 0xd7;
pub const OP_SUB64: u8 = 0xd8;
pub const OP_MUL64: u8 = 0xd9;
pub const OP_DIV64: u8 = 0xda;
pub const OP_NEG64: u8 = 0xdb;
pub const OP_LESSTHAN64: u8 = 0xdc;
pub const OP_LESSTHANOREQUAL64: u8 = 0xdd;
pub const OP_GREATERTHAN64: u8 = 0xde;
pub const OP_GREATERTHANOREQUAL64: u8 = 0xdf;
pub const OP_SCRIPTNUMTOLE64: u8 = 0xe0;
pub const OP_LE64TOSCRIPTNUM: u8 = 0xe1;
pub const OP_LE32TOLE64: u8 = 0xe2;
pub const OP_TWEAKVERIFY: u8 = 0xe4;

/// Which rule sets know an opcode by name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Availability {
    All,
    Tapscript,
    LiquidTapscript,
}

/// Canonical names first: the byte -> name map keeps the first entry per byte
const OPCODE_WORDS: &[(&str, u8, Availability)] = &[
    ("OP_0", OP_0, Availability::All),
    ("OP_FALSE", OP_0, Availability::All),
    ("OP_PUSHDATA1", OP_PUSHDATA1, Availability::All),
    ("OP_PUSHDATA2", OP_PUSHDATA2, Availability::All),
    ("OP_PUSHDATA4", OP_PUSHDATA4, Availability::All),
    ("OP_1NEGATE", OP_1NEGATE, Availability::All),
    ("OP_RESERVED", OP_RESERVED, Availability::All),
    ("OP_1", 0x51, Availability::All),
    ("OP_TRUE", 0x51, Availability::All),
    ("OP_2", 0x52, Availability::All),
    ("OP_3", 0x53, Availability::All),
    ("OP_4", 0x54, Availability::All),
    ("OP_5", 0x55, Availability::All),
    ("OP_6", 0x56, Availability::All),
    ("OP_7", 0x57, Availability::All),
    ("OP_8", 0x58, Availability::All),
    ("OP_9", 0x59, Availability::All),
    ("OP_10", 0x5a, Availability::All),
    ("OP_11", 0x5b, Availability::All),
    ("OP_12", 0x5c, Availability::All),
    ("OP_13", 0x5d, Availability::All),
    ("OP_14", 0x5e, Availability::All),
    ("OP_15", 0x5f, Availability::All),
    ("OP_16", OP_16, Availability::All),
    ("OP_NOP", OP_NOP, Availability::All),
    ("OP_VER", OP_VER, Availability::All),
    ("OP_IF", OP_IF, Availability::All),
    ("OP_NOTIF", OP_NOTIF, Availability::All),
    ("OP_VERIF", OP_VERIF, Availability::All),
    ("OP_VERNOTIF", OP_VERNOTIF, Availability::All),
    ("OP_ELSE", OP_ELSE, Availability::All),
    ("OP_ENDIF", OP_ENDIF, Availability::All),
    ("OP_VERIFY", OP_VERIFY, Availability::All),
    ("OP_RETURN", OP_RETURN, Availability::All),
    ("OP_TOALTSTACK", OP_TOALTSTACK, Availability::All),
    ("OP_FROMALTSTACK", OP_FROMALTSTACK, Availability::All),
    ("OP_2DROP", OP_2DROP, Availability::All),
    ("OP_2DUP", OP_2DUP, Availability::All),
    ("OP_3DUP", OP_3DUP, Availability::All),
    ("OP_2OVER", OP_2OVER, Availability::All),
    ("OP_2ROT", OP_2ROT, Availability::All),
    ("OP_2SWAP", OP_2SWAP, Availability::All),
    ("OP_IFDUP", OP_IFDUP, Availability::All),
    ("OP_DEPTH", OP_DEPTH, Availability::All),
    ("OP_DROP", OP_DROP, Availability::All),
    ("OP_DUP", OP_DUP, Availability::All),
    ("OP_NIP", OP_NIP, Availability::All),
    ("OP_OVER", OP_OVER, Availability::All),
    ("OP_PICK", OP_PICK, Availability::All),
    ("OP_ROLL", OP_ROLL, Availability::All),
    ("OP_ROT", OP_ROT, Availability::All),
    ("OP_SWAP", OP_SWAP, Availability::All),
    ("OP_TUCK", OP_TUCK, Availability::All),
    ("OP_CAT", OP_CAT, Availability::All),
    ("OP_SUBSTR", OP_SUBSTR, Availability::All),
    ("OP_LEFT", OP_LEFT, Availability::All),
    ("OP_RIGHT", OP_RIGHT, Availability::All),
    ("OP_SIZE", OP_SIZE, Availability::All),
    ("OP_INVERT", OP_INVERT, Availability::All),
    ("OP_AND", OP_AND, Availability::All),
    ("OP_OR", OP_OR, Availability::All),
    ("OP_XOR", OP_XOR, Availability::All),
    ("OP_EQUAL", OP_EQUAL, Availability::All),
    ("OP_EQUALVERIFY", OP_EQUALVERIFY, Availability::All),
    ("OP_RESERVED1", OP_RESERVED1, Availability::All),
    ("OP_RESERVED2", OP_RESERVED2, Availability::All),
    ("OP_1ADD", OP_1ADD, Availability::All),
    ("OP_1SUB", OP_1SUB, Availability::All),
    ("OP_2MUL", OP_2MUL, Availability::All),
    ("OP_2DIV", OP_2DIV, Availability::All),
    ("OP_NEGATE", OP_NEGATE, Availability::All),
    ("OP_ABS", OP_ABS, Availability::All),
    ("OP_NOT", OP_NOT, Availability::All),
    ("OP_0NOTEQUAL", OP_0NOTEQUAL, Availability::All),
    ("OP_ADD", OP_ADD, Availability::All),
    ("OP_SUB", OP_SUB, Availability::All),
    ("OP_MUL", OP_MUL, Availability::All),
    ("OP_DIV", OP_DIV, Availability::All),
    ("OP_MOD", OP_MOD, Availability::All),
    ("OP_LSHIFT", OP_LSHIFT, Availability::All),
    ("OP_RSHIFT", OP_RSHIFT, Availability::All),
    ("OP_BOOLAND", OP_BOOLAND, Availability::All),
    ("OP_BOOLOR", OP_BOOLOR, Availability::All),
    ("OP_NUMEQUAL", OP_NUMEQUAL, Availability::All),
    ("OP_NUMEQUALVERIFY", OP_NUMEQUALVERIFY, Availability::All),
    ("OP_NUMNOTEQUAL", OP_NUMNOTEQUAL, Availability::All),
    ("OP_LESSTHAN", OP_LESSTHAN, Availability::All),
    ("OP_GREATERTHAN", OP_GREATERTHAN, Availability::All),
    ("OP_LESSTHANOREQUAL", OP_LESSTHANOREQUAL, Availability::All),
    ("OP_GREATERTHANOREQUAL", OP_GREATERTHANOREQUAL, Availability::All),
    ("OP_MIN", OP_MIN, Availability::All),
    ("OP_MAX", OP_MAX, Availability::All),
    ("OP_WITHIN", OP_WITHIN, Availability::All),
    ("OP_RIPEMD160", OP_RIPEMD160, Availability::All),
    ("OP_SHA1", OP_SHA1, Availability::All),
    ("OP_SHA256", OP_SHA256, Availability::All),
    ("OP_HASH160", OP_HASH160, Availability::All),
    ("OP_HASH256", OP_HASH256, Availability::All),
    ("OP_CODESEPARATOR", OP_CODESEPARATOR, Availability::All),
    ("OP_CHECKSIG", OP_CHECKSIG, Availability::All),
    ("OP_CHECKSIGVERIFY", OP_CHECKSIGVERIFY, Availability::All),
    ("OP_CHECKMULTISIG", OP_CHECKMULTISIG, Availability::All),
    ("OP_CHECKMULTISIGVERIFY", OP_CHECKMULTISIGVERIFY, Availability::All),
    ("OP_NOP1", OP_NOP1, Availability::All),
    ("OP_CHECKLOCKTIMEVERIFY", OP_CHECKLOCKTIMEVERIFY, Availability::All),
    ("OP_NOP2", OP_CHECKLOCKTIMEVERIFY, Availability::All),
    ("OP_CHECKSEQUENCEVERIFY", OP_CHECKSEQUENCEVERIFY, Availability::All),
    ("OP_NOP3", OP_CHECKSEQUENCEVERIFY, Availability::All),
    ("OP_NOP4", 0xb3, Availability::All),
    ("OP_NOP5", 0xb4, Availability::All),
    ("OP_NOP6", 0xb5, Availability::All),
    ("OP_NOP7", 0xb6, Availability::All),
    ("OP_NOP8", 0xb7, Availability::All),
    ("OP_NOP9", 0xb8, Availability::All),
    ("OP_NOP10", OP_NOP10, Availability::All),
    ("OP_CHECKSIGADD", OP_CHECKSIGADD, Availability::Tapscript),
    ("OP_SHA256INITIALIZE", OP_SHA256INITIALIZE, Availability::LiquidTapscript),
    ("OP_SHA256UPDATE", 0xc5, Availability::LiquidTapscript),
    ("OP_SHA256FINALIZE", 0xc6, Availability::LiquidTapscript),
    ("OP_INSPECTINPUTOUTPOINT", 0xc7, Availability::LiquidTapscript),
    ("OP_INSPECTINPUTASSET", 0xc8, Availability::LiquidTapscript),
    ("OP_INSPECTINPUTVALUE", OP_INSPECTINPUTVALUE, Availability::LiquidTapscript),
    ("OP_INSPECTINPUTSCRIPTPUBKEY", 0xca, Availability::LiquidTapscript),
    ("OP_INSPECTINPUTSEQUENCE", OP_INSPECTINPUTSEQUENCE, Availability::LiquidTapscript),
    ("OP_INSPECTINPUTISSUANCE", 0xcc, Availability::LiquidTapscript),
    ("OP_PUSHCURRENTINPUTINDEX", OP_PUSHCURRENTINPUTINDEX, Availability::LiquidTapscript),
    ("OP_INSPECTOUTPUTASSET", 0xce, Availability::LiquidTapscript),
    ("OP_INSPECTOUTPUTVALUE", OP_INSPECTOUTPUTVALUE, Availability::LiquidTapscript),
    ("OP_INSPECTOUTPUTNONCE", 0xd0, Availability::LiquidTapscript),
    ("OP_INSPECTOUTPUTSCRIPTPUBKEY", 0xd1, Availability::LiquidTapscript),
    ("OP_INSPECTVERSION", OP_INSPECTVERSION, Availability::LiquidTapscript),
    ("OP_INSPECTLOCKTIME", OP_INSPECTLOCKTIME, Availability::LiquidTapscript),
    ("OP_INSPECTNUMINPUTS", OP_INSPECTNUMINPUTS, Availability::LiquidTapscript),
    ("OP_INSPECTNUMOUTPUTS", OP_INSPECTNUMOUTPUTS, Availability::LiquidTapscript),
    ("OP_TXWEIGHT", 0xd6, Availability::LiquidTapscript),
    ("OP_ADD64", OP_ADD64, Availability::LiquidTapscript),
    ("OP_SUB64", OP_SUB64, Availability::LiquidTapscript),
    ("OP_MUL64", OP_MUL64, Availability::LiquidTapscript),
    ("OP_DIV64", OP_DIV64, Availability::LiquidTapscript),
    ("OP_NEG64", OP_NEG64, Availability::LiquidTapscript),
    ("OP_LESSTHAN64", OP_LESSTHAN64, Availability::LiquidTapscript),
    ("OP_LESSTHANOREQUAL64", OP_LESSTHANOREQUAL64, Availability::LiquidTapscript),
    ("OP_GREATERTHAN64", OP_GREATERTHAN64, Availability::LiquidTapscript),
    ("OP_GREATERTHANOREQUAL64", OP_GREATERTHANOREQUAL64, Availability::LiquidTapscript),
    ("OP_SCRIPTNUMTOLE64", OP_SCRIPTNUMTOLE64, Availability::LiquidTapscript),
    ("OP_LE64TOSCRIPTNUM", OP_LE64TOSCRIPTNUM, Availability::LiquidTapscript),
    ("OP_LE32TOLE64", OP_LE32TOLE64, Availability::LiquidTapscript),
    ("OP_ECMULSCALARVERIFY", 0xe3, Availability::LiquidTapscript),
    ("OP_TWEAKVERIFY", OP_TWEAKVERIFY, Availability::LiquidTapscript),
];

/// Name <-> byte lookup for one rule set
#[derive(Debug, Clone)]
pub struct OpcodeTable {
    config: VmConfig,
    by_name: FxHashMap<&'static str, u8>,
    by_byte: FxHashMap<u8, &'static str>,
    names: Vec<&'static str>,
}

impl OpcodeTable {
    pub fn new(config: VmConfig) -> Self {
        let mut by_name = FxHashMap::default();
        let mut by_byte = FxHashMap::default();
        let mut names = Vec::new();

        for &(name, byte, availability) in OPCODE_WORDS {
            let available = match availability {
                Availability::All => true,
                Availability::Tapscript => config.is_tapscript(),
                Availability::LiquidTapscript => config.introspection_enabled(),
            };
            if !available {
                continue;
            }

            by_name.insert(name, byte);
            by_byte.entry(byte).or_insert(name);
            names.push(name);
        }

        OpcodeTable {
            config,
            by_name,
            by_byte,
            names,
        }
    }

    pub fn config(&self) -> VmConfig {
        self.config
    }

    /// Byte value of an opcode word
    pub fn byte(&self, name: &str) -> Option<u8> {
        self.by_name.get(name).copied()
    }

    /// Canonical word of an opcode byte
    pub fn name(&self, byte: u8) -> Option<&'static str> {
        self.by_byte.get(&byte).copied()
    }

    /// `0x`-prefixed hex of an opcode word, e.g. `OP_ADD` -> `0x93`
    pub fn word_hex(&self, name: &str) -> Option<String> {
        self.byte(name).map(|b| format!("0x{:02x}", b))
    }

    /// All known words, canonical names first within each byte
    pub fn names(&self) -> &[&'static str] {
        &self.names
    }

    /// Whether executing this opcode fails on the active network
    pub fn is_disabled(&self, byte: u8) -> bool {
        match byte {
            OP_MUL | OP_DIV | OP_MOD | OP_2MUL | OP_2DIV | OP_LSHIFT | OP_RSHIFT => true,
            OP_CAT | OP_SUBSTR | OP_LEFT | OP_RIGHT | OP_INVERT | OP_AND | OP_OR | OP_XOR => {
                !self.config.splice_enabled()
            }
            OP_VERIF | OP_VERNOTIF => true,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vm::network::{Network, ScriptVersion};

    #[test]
    fn test_word_lookup() {
        let table = OpcodeTable::new(VmConfig::default());

        assert_eq!(table.byte("OP_ADD"), Some(0x93));
        assert_eq!(table.word_hex("OP_ADD").as_deref(), Some("0x93"));
        assert_eq!(table.byte("OP_TRUE"), Some(0x51));
        assert_eq!(table.name(0x51), Some("OP_1"));
        assert_eq!(table.name(0x00), Some("OP_0"));
        assert_eq!(table.name(0xb1), Some("OP_CHECKLOCKTIMEVERIFY"));
        assert_eq!(table.byte("OP_BOGUS"), None);
    }

    #[test]
    fn test_availability_by_network() {
        let bitcoin = OpcodeTable::new(VmConfig::default());
        assert_eq!(bitcoin.byte("OP_ADD64"), None);
        assert_eq!(bitcoin.byte("OP_CHECKSIGADD"), None);
        assert!(bitcoin.is_disabled(OP_CAT));
        assert!(bitcoin.is_disabled(OP_MUL));

        let liquid_taproot =
            OpcodeTable::new(VmConfig::new(Network::Liquid, ScriptVersion::Tapscript));
        assert_eq!(liquid_taproot.byte("OP_ADD64"), Some(0xd7));
        assert_eq!(liquid_taproot.byte("OP_CHECKSIGADD"), Some(0xba));
        assert!(!liquid_taproot.is_disabled(OP_CAT));
        assert!(liquid_taproot.is_disabled(OP_MUL));
    }
}
