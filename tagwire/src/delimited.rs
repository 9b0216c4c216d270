//! Length delimited payloads: a varint byte count followed by exactly that many bytes.

use crate::error::{DecodeError, EncodeError};
use crate::varint;
use std::convert::TryFrom;
use std::io::Write;

/// Returns the number of written bytes, including the length prefix
pub fn encode<W: Write>(payload: &[u8], w: &mut W) -> Result<usize, EncodeError> {
    let c = varint::encode(payload.len() as u64, w)?;
    w.write_all(payload)?;
    Ok(c + payload.len())
}

/// Returns the payload, borrowed from `buf`, and the number of consumed bytes including the
/// length prefix
pub fn decode<B: ?Sized + AsRef<[u8]>>(buf: &B) -> Result<(&[u8], usize), DecodeError> {
    let buf = buf.as_ref();
    let (len, c) = varint::decode(buf)?;
    let len = usize::try_from(len).map_err(|_| DecodeError::Length(len))?;
    let rest = &buf[c..];
    if rest.len() < len {
        Err(DecodeError::TruncatedInput)
    } else {
        Ok((&rest[..len], c + len))
    }
}
