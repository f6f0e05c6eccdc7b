//! Bytecode encoding
//!
//! Literal pushes are encoded with the smallest push form (`OP_0`,
//! `OP_1NEGATE`, `OP_1`..`OP_16`, direct push, `OP_PUSHDATA1/2/4`), opcodes
//! as their byte. [`disassemble`] turns bytecode back into words for the
//! compile view.

use super::opcodes::{
    OpcodeTable, OP_0, OP_1, OP_1NEGATE, OP_PUSHDATA1, OP_PUSHDATA2, OP_PUSHDATA4,
};

/// Largest length a direct push opcode can express
const MAX_DIRECT_PUSH: usize = 0x4b;

/// Encode `data` as the minimal push operation
pub fn encode_push(data: &[u8]) -> Vec<u8> {
    match data {
        [] => vec![OP_0],
        [n @ 1..=16] => vec![OP_1 + n - 1],
        [0x81] => vec![OP_1NEGATE],
        _ => {
            let len = data.len();
            let mut out = Vec::with_capacity(len + 5);
            if len <= MAX_DIRECT_PUSH {
                out.push(len as u8);
            } else if len <= 0xff {
                out.push(OP_PUSHDATA1);
                out.push(len as u8);
            } else if len <= 0xffff {
                out.push(OP_PUSHDATA2);
                out.extend_from_slice(&(len as u16).to_le_bytes());
            } else {
                out.push(OP_PUSHDATA4);
                out.extend_from_slice(&(len as u32).to_le_bytes());
            }
            out.extend_from_slice(data);
            out
        }
    }
}

/// Render bytecode as opcode words and `<0x..>` pushes
///
/// Truncated pushes are rendered as `[error]` and end the listing.
pub fn disassemble(bytecode: &[u8], table: &OpcodeTable) -> Vec<String> {
    let mut words = Vec::new();
    let mut i = 0;

    while i < bytecode.len() {
        let op = bytecode[i];
        i += 1;

        let push_len = match op {
            0x01..=0x4b => Some((op as usize, 0)),
            OP_PUSHDATA1 => read_len(&bytecode[i..], 1).map(|n| (n, 1)),
            OP_PUSHDATA2 => read_len(&bytecode[i..], 2).map(|n| (n, 2)),
            OP_PUSHDATA4 => read_len(&bytecode[i..], 4).map(|n| (n, 4)),
            _ => {
                match table.name(op) {
                    Some(name) => words.push(name.to_string()),
                    None => words.push(format!("0x{:02x}", op)),
                }
                continue;
            }
        };

        match push_len {
            Some((len, prefix)) if i + prefix + len <= bytecode.len() => {
                let start = i + prefix;
                words.push(format!("<0x{}>", hex::encode(&bytecode[start..start + len])));
                i = start + len;
            }
            _ => {
                words.push("[error]".to_string());
                break;
            }
        }
    }

    words
}

fn read_len(bytes: &[u8], size: usize) -> Option<usize> {
    if bytes.len() < size {
        return None;
    }
    let mut len = 0usize;
    for (i, b) in bytes[..size].iter().enumerate() {
        len |= (*b as usize) << (8 * i);
    }
    Some(len)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vm::network::VmConfig;

    #[test]
    fn test_minimal_push_encoding() {
        assert_eq!(encode_push(&[]), vec![0x00]);
        assert_eq!(encode_push(&[0x05]), vec![0x55]);
        assert_eq!(encode_push(&[0x10]), vec![0x60]);
        assert_eq!(encode_push(&[0x81]), vec![0x4f]);
        assert_eq!(encode_push(&[0x11]), vec![0x01, 0x11]);
        assert_eq!(encode_push(&[0xaa, 0xbb]), vec![0x02, 0xaa, 0xbb]);

        let data = vec![0x42; 80];
        let encoded = encode_push(&data);
        assert_eq!(&encoded[..2], &[0x4c, 80]);
        assert_eq!(encoded.len(), 82);

        let data = vec![0x42; 300];
        let encoded = encode_push(&data);
        assert_eq!(&encoded[..3], &[0x4d, 0x2c, 0x01]);
    }

    #[test]
    fn test_disassemble() {
        let table = OpcodeTable::new(VmConfig::default());
        let words = disassemble(&[0x02, 0xaa, 0xbb, 0x55, 0x93, 0x87], &table);
        assert_eq!(words, vec!["<0xaabb>", "OP_5", "OP_ADD", "OP_EQUAL"]);

        let words = disassemble(&[0x03, 0xaa], &table);
        assert_eq!(words, vec!["[error]"]);
    }
}
