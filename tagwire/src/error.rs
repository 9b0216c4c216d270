use crate::tag::WireKind;
use crate::value::FieldType;
use crate::FieldNumber;
use thiserror::Error;

/// A `DecodeError` together with the input position at which it was detected.
#[derive(Debug, PartialEq, Error)]
#[error("{inner} at input position {at}")]
pub struct DecoderError {
    #[source]
    inner: DecodeError,
    at: usize,
}

impl DecoderError {
    pub fn into_inner(self) -> DecodeError {
        self.inner
    }

    pub fn inner(&self) -> &DecodeError {
        &self.inner
    }

    /// Byte offset into the input buffer
    pub fn position(&self) -> usize {
        self.at
    }
}

#[derive(Debug, PartialEq, Error)]
pub enum DecodeError {
    #[error("Unexpected end of buffer while decoding")]
    TruncatedInput,
    #[error("Wire kind selector {0} is not known")]
    MalformedTag(u8),
    #[error("Varint exceeds the range of its target type")]
    Overflow,
    #[error("Length {0} exceeds maximum {max}", max = usize::MAX)]
    Length(u64),
    #[error("Field {0} has no expected type, cannot interpret varint payload")]
    UnknownField(FieldNumber),
    #[error("Field {field} expects {expected} but found a {wire} payload")]
    TypeMismatch { field: FieldNumber, expected: FieldType, wire: WireKind },
    #[error("String payload was not valid Utf-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),
    #[error("Field {field} refused a value of type {ty}")]
    Rejected { field: FieldNumber, ty: FieldType },
}

impl DecodeError {
    pub fn at(self, at: usize) -> DecoderError {
        DecoderError { inner: self, at }
    }
}

#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("IO error {0}")]
    Io(#[from] std::io::Error),
    #[error("Field {field} is declared as {declared} but holds a {actual}")]
    TypeMismatch { field: FieldNumber, declared: FieldType, actual: FieldType },
}

/// A type name that has no wire mapping in this format, e.g. `double` or `fixed32`.
#[derive(Debug, PartialEq, Error)]
#[error("Unsupported field type `{0}`")]
pub struct UnsupportedFieldType(pub String);
