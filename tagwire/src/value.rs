//! The atom of a record is the `Value`. Every value knows its `FieldType`, which in turn decides
//! how the value is framed on wire and which numeric transform its varint goes through:
//!
//! | type              | wire kind        | transform                                   |
//! |-------------------|------------------|---------------------------------------------|
//! | `uint32`/`uint64` | varint           | none                                        |
//! | `int32`/`int64`   | varint           | two's complement bits as unsigned, same width |
//! | `sint32`/`sint64` | varint           | zigzag                                      |
//! | `bool`            | varint           | 0 or 1                                      |
//! | `string`/`bytes`  | length delimited | none                                        |
//!
//! Note that negative `int32` values occupy five bytes and negative `int64` values ten, since
//! their sign bits are part of the encoded number. Use the `sint` types for values which are
//! frequently negative.

use crate::error::{DecodeError, EncodeError, UnsupportedFieldType};
use crate::tag::WireKind;
use crate::{delimited, varint, zigzag, FieldNumber};
use std::borrow::Cow;
use std::convert::TryFrom;
use std::fmt;
use std::io::Write;
use std::str::FromStr;

/// The closed set of types a field can be declared with
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, PartialOrd, Ord)]
pub enum FieldType {
    String,
    Bytes,
    Bool,
    Uint32,
    Uint64,
    Sint32,
    Sint64,
    Int32,
    Int64,
}

impl FieldType {

    pub const ALL: [FieldType; 9] = [
        FieldType::String,
        FieldType::Bytes,
        FieldType::Bool,
        FieldType::Uint32,
        FieldType::Uint64,
        FieldType::Sint32,
        FieldType::Sint64,
        FieldType::Int32,
        FieldType::Int64,
    ];

    /// Returns the schema name of the type. This is useful for error messages.
    pub fn name(&self) -> &'static str {
        match *self {
            FieldType::String => "string",
            FieldType::Bytes  => "bytes",
            FieldType::Bool   => "bool",
            FieldType::Uint32 => "uint32",
            FieldType::Uint64 => "uint64",
            FieldType::Sint32 => "sint32",
            FieldType::Sint64 => "sint64",
            FieldType::Int32  => "int32",
            FieldType::Int64  => "int64",
        }
    }

    #[inline]
    pub fn wire_kind(&self) -> WireKind {
        WireKind::of(*self)
    }

    /// Interprets a raw varint payload of `field` as a value of this type. Fails with
    /// `DecodeError::Overflow` if a 32 bit type receives a wider number.
    pub fn from_varint(&self, field: FieldNumber, raw: u64) -> Result<Value<'static>, DecodeError> {
        let narrow = || u32::try_from(raw).map_err(|_| DecodeError::Overflow);
        match *self {
            FieldType::Bool   => Ok(Value::Bool(raw != 0)),
            FieldType::Uint32 => Ok(Value::Uint32(narrow()?)),
            FieldType::Uint64 => Ok(Value::Uint64(raw)),
            FieldType::Sint32 => Ok(Value::Sint32(zigzag::decode32(narrow()?))),
            FieldType::Sint64 => Ok(Value::Sint64(zigzag::decode64(raw))),
            FieldType::Int32  => Ok(Value::Int32(narrow()? as i32)),
            FieldType::Int64  => Ok(Value::Int64(raw as i64)),
            FieldType::String
                | FieldType::Bytes => Err(self.mismatch(field, WireKind::Varint)),
        }
    }

    /// Interprets a length delimited payload of `field` as a value of this type, borrowing from
    /// the input
    pub fn from_slice<'a>(&self, field: FieldNumber, raw: &'a [u8]) -> Result<Value<'a>, DecodeError> {
        match *self {
            FieldType::String => Ok(Value::Str(Cow::Borrowed(std::str::from_utf8(raw)?))),
            FieldType::Bytes  => Ok(Value::Bytes(Cow::Borrowed(raw))),
            _                 => Err(self.mismatch(field, WireKind::LengthDelimited)),
        }
    }

    fn mismatch(&self, field: FieldNumber, wire: WireKind) -> DecodeError {
        DecodeError::TypeMismatch { field, expected: *self, wire }
    }

}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for FieldType {
    type Err = UnsupportedFieldType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FieldType::ALL.iter()
            .find(|ty| ty.name() == s)
            .copied()
            .ok_or_else(|| UnsupportedFieldType(s.to_owned()))
    }
}

/// A typed field value. String and byte payloads borrow from the decoded buffer where possible.
#[derive(Debug, Clone, PartialEq)]
pub enum Value<'a> {
    Str(Cow<'a, str>),
    Bytes(Cow<'a, [u8]>),
    Bool(bool),
    Uint32(u32),
    Uint64(u64),
    Sint32(i32),
    Sint64(i64),
    Int32(i32),
    Int64(i64),
}

impl<'a> Value<'a> {

    pub fn field_type(&self) -> FieldType {
        match *self {
            Value::Str(_)    => FieldType::String,
            Value::Bytes(_)  => FieldType::Bytes,
            Value::Bool(_)   => FieldType::Bool,
            Value::Uint32(_) => FieldType::Uint32,
            Value::Uint64(_) => FieldType::Uint64,
            Value::Sint32(_) => FieldType::Sint32,
            Value::Sint64(_) => FieldType::Sint64,
            Value::Int32(_)  => FieldType::Int32,
            Value::Int64(_)  => FieldType::Int64,
        }
    }

    #[inline]
    pub fn wire_kind(&self) -> WireKind {
        self.field_type().wire_kind()
    }

    /// Detaches the value from the buffer it was decoded from
    pub fn into_owned(self) -> Value<'static> {
        match self {
            Value::Str(v)    => Value::Str(Cow::Owned(v.into_owned())),
            Value::Bytes(v)  => Value::Bytes(Cow::Owned(v.into_owned())),
            Value::Bool(v)   => Value::Bool(v),
            Value::Uint32(v) => Value::Uint32(v),
            Value::Uint64(v) => Value::Uint64(v),
            Value::Sint32(v) => Value::Sint32(v),
            Value::Sint64(v) => Value::Sint64(v),
            Value::Int32(v)  => Value::Int32(v),
            Value::Int64(v)  => Value::Int64(v),
        }
    }

    /// Borrows the value without copying string or byte payloads
    pub fn borrowed(&self) -> Value<'_> {
        match self {
            Value::Str(v)    => Value::Str(Cow::Borrowed(&**v)),
            Value::Bytes(v)  => Value::Bytes(Cow::Borrowed(&**v)),
            other            => other.clone(),
        }
    }

    /// The number a varint typed value is written as, `None` for length delimited values
    pub fn to_varint(&self) -> Option<u64> {
        match self.payload() {
            Payload::Varint(raw)    => Some(raw),
            Payload::Delimited(_)   => None,
        }
    }

    /// Writes the payload without its tag. Returns the number of written bytes.
    pub fn encode_payload<W: Write>(&self, w: &mut W) -> Result<usize, EncodeError> {
        match self.payload() {
            Payload::Varint(raw)    => varint::encode(raw, w),
            Payload::Delimited(buf) => delimited::encode(buf, w),
        }
    }

    fn payload(&self) -> Payload<'_> {
        match self {
            Value::Str(v)    => Payload::Delimited(v.as_bytes()),
            Value::Bytes(v)  => Payload::Delimited(v),
            Value::Bool(v)   => Payload::Varint(*v as u64),
            Value::Uint32(v) => Payload::Varint(*v as u64),
            Value::Uint64(v) => Payload::Varint(*v),
            Value::Sint32(v) => Payload::Varint(zigzag::encode32(*v) as u64),
            Value::Sint64(v) => Payload::Varint(zigzag::encode64(*v)),
            Value::Int32(v)  => Payload::Varint(*v as u32 as u64),
            Value::Int64(v)  => Payload::Varint(*v as u64),
        }
    }

}

/// What a value turns into on wire, after its numeric transform
enum Payload<'p> {
    Varint(u64),
    Delimited(&'p [u8]),
}

impl<'a> fmt::Display for Value<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Str(v)    => write!(f, "\"{}\"", v.replace('\\', "\\\\").replace('"', "\\\"")),
            Value::Bytes(v)  => write!(f, ":{}", base64::encode(v)),
            Value::Bool(v)   => write!(f, "{}", v),
            Value::Uint32(v) => write!(f, "{}", v),
            Value::Uint64(v) => write!(f, "{}", v),
            Value::Sint32(v) | Value::Int32(v) => write!(f, "{}", v),
            Value::Sint64(v) | Value::Int64(v) => write!(f, "{}", v),
        }
    }
}

impl From<&str> for Value<'static> {
    fn from(v: &str) -> Self {
        Value::Str(Cow::Owned(v.to_owned()))
    }
}

impl From<String> for Value<'static> {
    fn from(v: String) -> Self {
        Value::Str(Cow::Owned(v))
    }
}

impl From<Vec<u8>> for Value<'static> {
    fn from(v: Vec<u8>) -> Self {
        Value::Bytes(Cow::Owned(v))
    }
}

impl From<bool> for Value<'static> {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}
