//! Base-128 variable length integers. A value is split into groups of seven bits which are emitted
//! most significant group first. Every byte but the last one has its continuation bit (`0x80`)
//! set, so the final byte of a varint always carries the lowest seven bits of the value.
//!
//! The encoder never produces leading zero groups. The decoder nevertheless accepts them, so
//! `[0x80, 0x80, 0x08]` and `[0x08]` both decode to 8.

use crate::error::{DecodeError, EncodeError};
use std::io::Write;

/// The maximum number of bytes a `u64` can occupy on wire
pub const MAX_LEN: usize = 10;

const CONTINUATION: u8 = 0x80;
const GROUP: u64 = 0x7f;

/// Returns the number of written bytes
pub fn encode<W: Write>(value: u64, w: &mut W) -> Result<usize, EncodeError> {
    let mut buf = [0u8; MAX_LEN];
    let len = encode_into(value, &mut buf);
    w.write_all(&buf[..len])?;
    Ok(len)
}

/// Appends the encoding of `value` to `buf`, which cannot fail
pub fn encode_to_vec(value: u64, buf: &mut Vec<u8>) -> usize {
    let mut tmp = [0u8; MAX_LEN];
    let len = encode_into(value, &mut tmp);
    buf.extend_from_slice(&tmp[..len]);
    len
}

/// Returns the decoded value and the number of consumed bytes
pub fn decode<B: ?Sized + AsRef<[u8]>>(buf: &B) -> Result<(u64, usize), DecodeError> {
    let mut value: u64 = 0;
    for (i, b) in buf.as_ref().iter().enumerate() {
        if value >> (u64::BITS - 7) != 0 {
            return Err(DecodeError::Overflow);
        }
        value = value << 7 | (*b as u64 & GROUP);
        if b & CONTINUATION == 0 {
            return Ok((value, i + 1));
        }
    }
    Err(DecodeError::TruncatedInput)
}

/// Returns the number of bytes `value` occupies on wire
#[inline]
pub fn size(value: u64) -> usize {
    let bits = (u64::BITS - value.leading_zeros()) as usize;
    if bits == 0 { 1 } else { (bits + 6) / 7 }
}

#[inline]
fn encode_into(value: u64, buf: &mut [u8; MAX_LEN]) -> usize {
    let len = size(value);
    for (i, byte) in buf[..len].iter_mut().enumerate() {
        let shift = 7 * (len - 1 - i);
        *byte = (value >> shift & GROUP) as u8;
        if i + 1 < len {
            *byte |= CONTINUATION;
        }
    }
    len
}

#[cfg(test)]
mod tests {
    use super::{decode, encode, encode_to_vec, size, MAX_LEN};
    use crate::error::DecodeError;

    #[test]
    fn small_values() {
        assert_eq!(bytes(0), [0x00]);
        assert_eq!(bytes(1), [0x01]);
        assert_eq!(bytes(127), [0x7f]);
        assert_eq!(bytes(128), [0x81, 0x00]);
        assert_eq!(bytes(129), [0x81, 0x01]);
    }

    #[test]
    fn group_order() {
        // 0x3fff is two full groups, 0x4000 needs a third
        assert_eq!(bytes(0x3fff), [0xff, 0x7f]);
        assert_eq!(bytes(0x4000), [0x81, 0x80, 0x00]);
        assert_eq!(bytes(u32::MAX as u64), [0x8f, 0xff, 0xff, 0xff, 0x7f]);
        assert_eq!(bytes(u64::MAX), [0x81, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0x7f]);
    }

    #[test]
    fn size_matches_encoding() {
        for v in [0u64, 1, 127, 128, 300, 70_000, u32::MAX as u64, 1 << 63, u64::MAX] {
            assert_eq!(bytes(v).len(), size(v));
        }
    }

    #[test]
    fn roundtrip() {
        let mut buf = Vec::new();
        // choose large prime number to make this test terminate in acceptable time
        for i in (0..u64::MAX).step_by(3_203_431_780_337).chain([u64::MAX]) {
            buf.clear();
            let written = encode(i, &mut buf).unwrap();
            assert_eq!(written, buf.len());
            assert!(written <= MAX_LEN);
            assert_eq!((i, written), decode(&buf).unwrap());
        }
    }

    #[test]
    fn stops_at_last_group() {
        let buf = [0x81, 0x01, 0xff, 0xff];
        assert_eq!((129, 2), decode(&buf).unwrap());
    }

    #[test]
    fn inefficient_encoding() {
        let buf = [0x80, 0x80, 0x80, 0x08];
        assert_eq!((8, 4), decode(&buf).unwrap());
        let buf = [0x80, 0x80, 0x80, 0x80, 0x80, 0x80, 0x80, 0x80, 0x80, 0x80, 0x80, 0x81, 0x01];
        assert_eq!((129, 13), decode(&buf).unwrap());
    }

    #[test]
    fn truncated() {
        assert_eq!(DecodeError::TruncatedInput, decode(&[]).unwrap_err());
        assert_eq!(DecodeError::TruncatedInput, decode(&[0x81]).unwrap_err());
        assert_eq!(DecodeError::TruncatedInput, decode(&[0x8f, 0xff, 0xff, 0xff]).unwrap_err());
    }

    #[test]
    fn overflow() {
        let buf = [0x82, 0x80, 0x80, 0x80, 0x80, 0x80, 0x80, 0x80, 0x80, 0x00];
        assert_eq!(DecodeError::Overflow, decode(&buf).unwrap_err());
        let buf = [0xff; 11];
        assert_eq!(DecodeError::Overflow, decode(&buf).unwrap_err());
    }

    fn bytes(value: u64) -> Vec<u8> {
        let mut buf = Vec::new();
        encode_to_vec(value, &mut buf);
        buf
    }

}
