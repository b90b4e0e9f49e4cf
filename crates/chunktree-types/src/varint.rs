//! Unsigned LEB128 varints, as used by multiformats identifiers.

use crate::error::TypeError;

/// Append `value` to `buf` as an unsigned varint.
pub fn encode(buf: &mut Vec<u8>, mut value: u64) {
    loop {
        let mut byte = (value & 0x7F) as u8;
        value >>= 7;
        if value > 0 {
            byte |= 0x80;
        }
        buf.push(byte);
        if value == 0 {
            break;
        }
    }
}

/// Decode an unsigned varint. Returns (value, bytes_consumed).
pub fn decode(data: &[u8]) -> Result<(u64, usize), TypeError> {
    let mut value: u64 = 0;
    let mut shift = 0;
    for (i, &byte) in data.iter().enumerate() {
        if shift >= 64 {
            return Err(TypeError::VarintOverflow);
        }
        value |= ((byte & 0x7F) as u64) << shift;
        shift += 7;
        if byte & 0x80 == 0 {
            return Ok((value, i + 1));
        }
    }
    Err(TypeError::TruncatedVarint)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_values_take_one_byte() {
        let mut buf = Vec::new();
        encode(&mut buf, 0x55);
        assert_eq!(buf, vec![0x55]);
        assert_eq!(decode(&buf).unwrap(), (0x55, 1));
    }

    #[test]
    fn multi_byte_value() {
        let mut buf = Vec::new();
        encode(&mut buf, 300);
        assert_eq!(buf, vec![0xAC, 0x02]);
        assert_eq!(decode(&buf).unwrap(), (300, 2));
    }

    #[test]
    fn max_u64() {
        let mut buf = Vec::new();
        encode(&mut buf, u64::MAX);
        let (val, consumed) = decode(&buf).unwrap();
        assert_eq!(val, u64::MAX);
        assert_eq!(consumed, buf.len());
    }

    #[test]
    fn truncated() {
        assert_eq!(decode(&[0x80]).unwrap_err(), TypeError::TruncatedVarint);
        assert_eq!(decode(&[]).unwrap_err(), TypeError::TruncatedVarint);
    }

    #[test]
    fn overflow() {
        let data = [0xFFu8; 11];
        assert_eq!(decode(&data).unwrap_err(), TypeError::VarintOverflow);
    }
}
