//! Script number and fixed-width integer encodings
//!
//! Script numbers are stored on the stack as little-endian, sign-and-magnitude
//! byte vectors: the highest bit of the last byte carries the sign and zero is
//! the empty vector. Arithmetic opcodes only accept operands up to
//! [`MAX_NUM_SIZE`] bytes, but larger results may still be pushed.
//!
//! The Liquid 64-bit opcodes use plain 8-byte little-endian two's complement
//! values instead (see [`encode_le64`] / [`decode_le64`]).

/// Maximum operand size in bytes for arithmetic opcodes
pub const MAX_NUM_SIZE: usize = 4;

/// Operand size accepted by the lock time opcodes
pub const LOCKTIME_NUM_SIZE: usize = 5;

/// Operand size accepted by the Liquid script number conversions
pub const LE64_NUM_SIZE: usize = 8;

/// Encode `n` as a minimal script number
pub fn encode_scriptnum(n: i64) -> Vec<u8> {
    if n == 0 {
        return Vec::new();
    }

    let negative = n < 0;
    let mut magnitude = n.unsigned_abs();

    let mut result: Vec<u8> = Vec::with_capacity(9);
    while magnitude > 0 {
        result.push((magnitude & 0xff) as u8);
        magnitude >>= 8;
    }

    // The sign lives in the top bit of the last byte; add a byte if it is taken
    let last = result.len() - 1;
    if result[last] & 0x80 != 0 {
        result.push(if negative { 0x80 } else { 0x00 });
    } else if negative {
        result[last] |= 0x80;
    }

    result
}

/// Decode a script number of at most `max_size` bytes
///
/// Returns `None` if the element is larger than `max_size` (or 8) bytes.
/// Non-minimal encodings are accepted.
pub fn decode_scriptnum(bytes: &[u8], max_size: usize) -> Option<i64> {
    if bytes.is_empty() {
        return Some(0);
    }
    if bytes.len() > max_size || bytes.len() > 8 {
        return None;
    }

    let mut value: u64 = 0;
    for (i, b) in bytes.iter().enumerate() {
        value |= (*b as u64) << (8 * i);
    }

    let sign_bit_mask = 0x80_u64 << (8 * (bytes.len() - 1));

    // sign & magnitude -> two's complement
    if value & sign_bit_mask != 0 {
        Some(-((value & !sign_bit_mask) as i64))
    } else {
        Some(value as i64)
    }
}

/// Interpret a stack element as a boolean
///
/// Any non-zero byte makes the value true, except a lone sign bit in the
/// last byte ("negative zero").
pub fn cast_to_bool(bytes: &[u8]) -> bool {
    for (i, b) in bytes.iter().enumerate() {
        if *b != 0 {
            return !(i == bytes.len() - 1 && *b == 0x80);
        }
    }
    false
}

pub fn encode_le64(n: i64) -> Vec<u8> {
    n.to_le_bytes().to_vec()
}

/// Decode an exactly 8-byte little-endian signed integer
pub fn decode_le64(bytes: &[u8]) -> Option<i64> {
    let array: [u8; 8] = bytes.try_into().ok()?;
    Some(i64::from_le_bytes(array))
}

/// Decode an exactly 4-byte little-endian unsigned integer
pub fn decode_le32(bytes: &[u8]) -> Option<u32> {
    let array: [u8; 4] = bytes.try_into().ok()?;
    Some(u32::from_le_bytes(array))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_scriptnum() {
        assert!(encode_scriptnum(0).is_empty());
        assert_eq!(encode_scriptnum(1), vec![0x01]);
        assert_eq!(encode_scriptnum(-1), vec![0x81]);
        assert_eq!(encode_scriptnum(127), vec![0x7f]);
        assert_eq!(encode_scriptnum(128), vec![0x80, 0x00]);
        assert_eq!(encode_scriptnum(-128), vec![0x80, 0x80]);
        assert_eq!(encode_scriptnum(255), vec![0xff, 0x00]);
        assert_eq!(encode_scriptnum(256), vec![0x00, 0x01]);
    }

    #[test]
    fn test_decode_scriptnum() {
        assert_eq!(decode_scriptnum(&[], MAX_NUM_SIZE), Some(0));
        assert_eq!(decode_scriptnum(&[0x81], MAX_NUM_SIZE), Some(-1));
        assert_eq!(decode_scriptnum(&[0x03, 0x81], MAX_NUM_SIZE), Some(-259));
        assert_eq!(
            decode_scriptnum(&[0x03, 0x81, 0x04, 0x01, 0xde], MAX_NUM_SIZE),
            None
        );
        // non-minimal encodings are still readable
        assert_eq!(decode_scriptnum(&[0x05, 0x00], MAX_NUM_SIZE), Some(5));
    }

    #[test]
    fn test_scriptnum_round_trip_edges() {
        for n in [-1000_i64, -129, -128, -1, 0, 1, 127, 128, 1000] {
            assert_eq!(decode_scriptnum(&encode_scriptnum(n), MAX_NUM_SIZE), Some(n));
        }

        assert_eq!(
            decode_scriptnum(&encode_scriptnum(0x7fff_ffff), MAX_NUM_SIZE),
            Some(0x7fff_ffff)
        );
        assert_eq!(
            decode_scriptnum(&encode_scriptnum(-0x7fff_ffff), MAX_NUM_SIZE),
            Some(-0x7fff_ffff)
        );

        // push allowed, pop not
        assert_eq!(
            decode_scriptnum(&encode_scriptnum(0x8000_0000), MAX_NUM_SIZE),
            None
        );
        assert_eq!(
            decode_scriptnum(&encode_scriptnum(0x8000_0000), LOCKTIME_NUM_SIZE),
            Some(0x8000_0000)
        );
    }

    #[test]
    fn test_cast_to_bool() {
        assert!(!cast_to_bool(&[]));
        assert!(!cast_to_bool(&[0x00, 0x00]));
        assert!(!cast_to_bool(&[0x00, 0x80]));
        assert!(cast_to_bool(&[0x80, 0x00]));
        assert!(cast_to_bool(&[0x01]));
    }

    #[test]
    fn test_le_helpers() {
        assert_eq!(decode_le64(&encode_le64(-5)), Some(-5));
        assert_eq!(decode_le64(&[0x01]), None);
        assert_eq!(decode_le32(&[0x01, 0x00, 0x00, 0x00]), Some(1));
    }
}
