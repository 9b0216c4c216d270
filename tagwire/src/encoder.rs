use crate::accessor::FieldAccessor;
use crate::error::EncodeError;
use crate::tag::Tag;
use crate::value::Value;
use crate::FieldNumber;
use std::io::Write;
use tracing::{debug, trace};

/// Used to encode records. Fields are always written in ascending field number order, no matter
/// in which order the accessor reports them, so equal records produce equal bytes.
pub struct Encoder<'w, W: Write> {
    writer: &'w mut W,
}

impl<'w, W: Write> Encoder<'w, W> {

    /// Encode a record to the given writer. The resulting `usize` is the amount of bytes that got
    /// written.
    ///
    /// All fields are checked against their declared types before the first byte is written, so a
    /// `EncodeError::TypeMismatch` leaves the writer untouched. An `EncodeError::Io` however may
    /// occur after a prefix of the record has been written. Use [to_bytes] if that matters.
    pub fn encode<A: ?Sized + FieldAccessor>(record: &A, writer: &'w mut W) -> Result<usize, EncodeError> {
        let fields = Self::collect(record)?;
        let mut encoder = Self { writer };
        let mut c = 0;
        for (field, value) in fields.iter() {
            c += encoder.encode_field(*field, value)?;
        }
        Ok(c)
    }

    fn collect<A: ?Sized + FieldAccessor>(record: &A) -> Result<Vec<(FieldNumber, Value<'_>)>, EncodeError> {
        let mut numbers = record.fields_present();
        numbers.sort_unstable();
        numbers.dedup();
        let mut fields = Vec::with_capacity(numbers.len());
        for field in numbers {
            let value = match record.get(field) {
                Some(value) => value,
                None => {
                    debug!(field, "field reported as present holds no value, skipping");
                    continue;
                }
            };
            let actual = value.field_type();
            match record.expected_type(field) {
                Some(declared) if declared != actual => {
                    debug!(field, %declared, %actual, "value does not match declared type");
                    return Err(EncodeError::TypeMismatch { field, declared, actual });
                },
                _ => fields.push((field, value)),
            }
        }
        Ok(fields)
    }

    fn encode_field(&mut self, field: FieldNumber, value: &Value) -> Result<usize, EncodeError> {
        let mut c = Tag::new(field, value.wire_kind()).encode(self.writer)?;
        c += value.encode_payload(self.writer)?;
        trace!(field, ty = %value.field_type(), bytes = c, "encoded field");
        Ok(c)
    }

}

/// Encode a record into a fresh buffer. On error no bytes are returned at all.
pub fn to_bytes<A: ?Sized + FieldAccessor>(record: &A) -> Result<Vec<u8>, EncodeError> {
    let mut buf = Vec::new();
    Encoder::encode(record, &mut buf)?;
    Ok(buf)
}
