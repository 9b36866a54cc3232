//! Script number encoding
//!
//! Numbers on the stack are little-endian sign-magnitude byte strings in
//! their shortest form. The sign lives in the high bit of the last byte;
//! zero is the empty string.

use crate::error::{VmError, VmResult};

/// Default maximum operand length accepted by arithmetic opcodes
pub const DEFAULT_MAX_NUM_LEN: usize = 4;

/// Encode an integer in minimal script-number form
pub fn encode_num(value: i64) -> Vec<u8> {
    if value == 0 {
        return Vec::new();
    }

    let negative = value < 0;
    let mut magnitude = value.unsigned_abs();
    let mut result = Vec::with_capacity(9);
    while magnitude > 0 {
        result.push((magnitude & 0xff) as u8);
        magnitude >>= 8;
    }

    // The last byte is non-zero here, so indexing is in bounds.
    let last = result.len() - 1;
    if result[last] & 0x80 != 0 {
        result.push(if negative { 0x80 } else { 0x00 });
    } else if negative {
        result[last] |= 0x80;
    }
    result
}

/// Decode a script number, rejecting operands longer than `max_len`.
///
/// Non-minimal encodings are accepted. Operands are never longer than
/// eight bytes regardless of `max_len`.
pub fn decode_num(bytes: &[u8], max_len: usize) -> VmResult<i64> {
    let limit = max_len.min(8);
    if bytes.len() > limit {
        return Err(VmError::NumberOverflow {
            len: bytes.len(),
            max: limit,
        });
    }
    let Some((&last, _)) = bytes.split_last() else {
        return Ok(0);
    };

    let mut magnitude: u64 = 0;
    for (i, &byte) in bytes.iter().enumerate() {
        let byte = if i == bytes.len() - 1 { byte & 0x7f } else { byte };
        magnitude |= (byte as u64) << (8 * i);
    }

    // The sign bit is masked off, so the magnitude always fits in 63 bits.
    let value = magnitude as i64;
    Ok(if last & 0x80 != 0 { -value } else { value })
}

/// Script truthiness: any non-zero byte, except a lone trailing sign bit
/// (negative zero).
pub fn cast_to_bool(bytes: &[u8]) -> bool {
    for (i, &byte) in bytes.iter().enumerate() {
        if byte != 0 {
            return !(i == bytes.len() - 1 && byte == 0x80);
        }
    }
    false
}

/// Encode a boolean result (`[01]` or empty)
pub fn encode_bool(value: bool) -> Vec<u8> {
    if value {
        vec![1]
    } else {
        Vec::new()
    }
}
