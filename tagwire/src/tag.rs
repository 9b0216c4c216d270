//! Every field on wire starts with a tag: a varint whose low three bits select the wire kind of the
//! payload and whose remaining bits hold the field number. Only two selectors are defined, which
//! makes this a deliberately narrowed subset of the usual three bit scheme: selector 0 announces a
//! varint payload, selector 1 a length delimited one. Selectors 2 to 7 are rejected on decode.

use crate::error::{DecodeError, EncodeError};
use crate::value::FieldType;
use crate::{varint, FieldNumber};
use std::convert::TryFrom;
use std::fmt;
use std::io::Write;

/// Bits reserved for the wire kind selector
pub const SHIFT: u32 = 3;

const MASK: u64 = (1 << SHIFT) - 1;

/// The payload framing announced by a tag
#[repr(u8)]
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum WireKind {
    /// A single varint follows
    Varint = 0,
    /// A varint length follows, then that many bytes
    LengthDelimited = 1,
}

/// Indexed by selector
const WIRE_KINDS: [WireKind; 2] = [WireKind::Varint, WireKind::LengthDelimited];

impl WireKind {

    /// Maps the selector bits of a tag back to a wire kind
    pub fn classify(bits: u8) -> Result<Self, DecodeError> {
        WIRE_KINDS.get(bits as usize).copied().ok_or(DecodeError::MalformedTag(bits))
    }

    /// The wire kind a value of the given type is framed with
    pub const fn of(ty: FieldType) -> Self {
        match ty {
            FieldType::String | FieldType::Bytes => WireKind::LengthDelimited,
            FieldType::Bool
                | FieldType::Uint32
                | FieldType::Uint64
                | FieldType::Sint32
                | FieldType::Sint64
                | FieldType::Int32
                | FieldType::Int64 => WireKind::Varint,
        }
    }

    #[inline]
    pub const fn selector(&self) -> u8 {
        *self as u8
    }

    pub fn name(&self) -> &'static str {
        match *self {
            WireKind::Varint          => "varint",
            WireKind::LengthDelimited => "length delimited",
        }
    }

}

impl fmt::Display for WireKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A decoded tag
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct Tag {
    pub field: FieldNumber,
    pub kind: WireKind,
}

impl Tag {

    pub fn new(field: FieldNumber, kind: WireKind) -> Self {
        Self { field, kind }
    }

    /// The raw tag value before varint encoding
    #[inline]
    pub fn value(&self) -> u64 {
        make(self.field, self.kind)
    }

    /// Returns the number of written bytes
    pub fn encode<W: Write>(&self, w: &mut W) -> Result<usize, EncodeError> {
        varint::encode(self.value(), w)
    }

    /// Returns the decoded tag and the number of consumed bytes
    pub fn decode<B: ?Sized + AsRef<[u8]>>(buf: &B) -> Result<(Self, usize), DecodeError> {
        let (raw, c) = varint::decode(buf)?;
        let (field, bits) = split(raw);
        let kind = WireKind::classify(bits)?;
        let field = FieldNumber::try_from(field).map_err(|_| DecodeError::Overflow)?;
        Ok((Tag { field, kind }, c))
    }

}

#[inline]
pub fn make(field: FieldNumber, kind: WireKind) -> u64 {
    (field as u64) << SHIFT | kind.selector() as u64
}

/// Splits a raw tag into field number and selector bits
#[inline]
pub fn split(tag: u64) -> (u64, u8) {
    (tag >> SHIFT, (tag & MASK) as u8)
}
