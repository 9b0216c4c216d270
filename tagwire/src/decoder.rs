use crate::accessor::FieldAccessor;
use crate::delimited;
use crate::error::{DecodeError, DecoderError};
use crate::tag::{Tag, WireKind};
use crate::value::{FieldType, Value};
use crate::varint;
use tracing::{debug, trace};

/// Used to decode records. The decoder walks the buffer from left to right and stores every field
/// it encounters in the accessor, so fields may appear in any order and a later occurrence of a
/// field overwrites an earlier one.
///
/// Varint payloads can only be interpreted with the help of the accessor: `int32`, `sint32` and
/// `uint32` all look the same on wire. Fields with a varint payload must therefore be declared
/// before decoding, otherwise decoding fails with `DecodeError::UnknownField`. Length delimited
/// payloads of undeclared fields are decoded as strings.
///
/// Decoding is not atomic. If an error occurs, all fields before the faulty one have already been
/// stored in the accessor.
pub struct Decoder<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Decoder<'a> {

    /// Decode all fields in the given buffer into `record`. String and byte values handed to the
    /// accessor borrow from the buffer, accessors which keep them need to call
    /// [Value::into_owned].
    pub fn decode<B, A>(buf: &'a B, record: &mut A) -> Result<(), DecoderError>
    where
        B: ?Sized + AsRef<[u8]>,
        A: ?Sized + FieldAccessor,
    {
        let mut decoder = Self { buf: buf.as_ref(), pos: 0 };
        decoder.decode_record(record).map_err(|e| {
            debug!(at = decoder.pos, error = %e, "decoding failed");
            e.at(decoder.pos)
        })
    }

    fn decode_record<A: ?Sized + FieldAccessor>(&mut self, record: &mut A) -> Result<(), DecodeError> {
        while self.pos < self.buf.len() {
            let start = self.pos;
            let tag = self.decode_tag()?;
            let ty = match (record.expected_type(tag.field), tag.kind) {
                (Some(ty), kind) if ty.wire_kind() == kind => ty,
                (Some(ty), kind) => {
                    self.pos = start;
                    return Err(DecodeError::TypeMismatch { field: tag.field, expected: ty, wire: kind });
                },
                (None, WireKind::LengthDelimited) => FieldType::String,
                (None, WireKind::Varint) => {
                    self.pos = start;
                    return Err(DecodeError::UnknownField(tag.field));
                },
            };
            let value = self.decode_payload(tag, ty)?;
            trace!(field = tag.field, %ty, at = start, "decoded field");
            if let Err(refused) = record.set(tag.field, value) {
                self.pos = start;
                return Err(DecodeError::Rejected { field: tag.field, ty: refused.field_type() });
            }
        }
        Ok(())
    }

    fn decode_tag(&mut self) -> Result<Tag, DecodeError> {
        let (tag, c) = Tag::decode(&self.buf[self.pos..])?;
        self.pos += c;
        Ok(tag)
    }

    fn decode_payload(&mut self, tag: Tag, ty: FieldType) -> Result<Value<'a>, DecodeError> {
        let buf: &'a [u8] = &self.buf[self.pos..];
        match tag.kind {
            WireKind::Varint => {
                let (raw, c) = varint::decode(buf)?;
                let value = ty.from_varint(tag.field, raw)?;
                self.pos += c;
                Ok(value)
            },
            WireKind::LengthDelimited => {
                let (raw, c) = delimited::decode(buf)?;
                let value = ty.from_slice(tag.field, raw)?;
                self.pos += c;
                Ok(value)
            },
        }
    }

}

#[cfg(test)]
mod tests {
    use super::Decoder;
    use crate::accessor::FieldAccessor;
    use crate::encoder::to_bytes;
    use crate::error::DecodeError;
    use crate::record::Record;
    use crate::tag::WireKind;
    use crate::value::{FieldType, Value};
    use crate::FieldNumber;
    use std::borrow::Cow;

    #[test]
    fn single_record() {
        let record = decode(&[0x08, 0x01], &[(1, FieldType::Int32)]);
        assert_eq!(Some(&Value::Int32(1)), record.value(1));
    }

    #[test]
    fn inefficient_tag() {
        let record = decode(&[0x80, 0x80, 0x80, 0x08, 0x01], &[(1, FieldType::Int32)]);
        assert_eq!(Some(&Value::Int32(1)), record.value(1));
        let record = decode(&[0x80, 0x80, 0x80, 0x08, 0x81, 0x01], &[(1, FieldType::Int32)]);
        assert_eq!(Some(&Value::Int32(129)), record.value(1));
    }

    #[test]
    fn multiple_records() {
        let record = decode(&[0x08, 0x81, 0x01, 0x10, 0x01], &[(1, FieldType::Int32), (2, FieldType::Int32)]);
        assert_eq!(Some(&Value::Int32(129)), record.value(1));
        assert_eq!(Some(&Value::Int32(1)), record.value(2));
        assert_eq!(2, record.len());
    }

    #[test]
    fn undeclared_string() {
        let record = decode(&[0x09, 0x07, 0x74, 0x65, 0x73, 0x74, 0x69, 0x6e, 0x67], &[]);
        assert_eq!(Some(&Value::from("testing")), record.value(1));
        assert_eq!(Some(FieldType::String), record.expected_type(1));
    }

    #[test]
    fn mixed_types() {
        let buf = [0x09, 0x07, 0x74, 0x65, 0x73, 0x74, 0x69, 0x6e, 0x67, 0x10, 0x01];
        let record = decode(&buf, &[(1, FieldType::String), (2, FieldType::Int32)]);
        assert_eq!(Some(&Value::from("testing")), record.value(1));
        assert_eq!(Some(&Value::Int32(1)), record.value(2));
    }

    #[test]
    fn any_field_order() {
        let record = decode(&[0x10, 0x02, 0x08, 0x01], &[(1, FieldType::Uint32), (2, FieldType::Uint32)]);
        assert_eq!(Some(&Value::Uint32(1)), record.value(1));
        assert_eq!(Some(&Value::Uint32(2)), record.value(2));
    }

    #[test]
    fn last_occurrence_wins() {
        let record = decode(&[0x08, 0x01, 0x08, 0x02], &[(1, FieldType::Uint64)]);
        assert_eq!(Some(&Value::Uint64(2)), record.value(1));
    }

    #[test]
    fn signed_integers() {
        let record = decode(&[0x08, 0x8f, 0xff, 0xff, 0xff, 0x7f], &[(1, FieldType::Int32)]);
        assert_eq!(Some(&Value::Int32(-1)), record.value(1));
        let record = decode(&[0x08, 0x01], &[(1, FieldType::Sint32)]);
        assert_eq!(Some(&Value::Sint32(-1)), record.value(1));
        let record = decode(&[0x08, 0x01], &[(1, FieldType::Uint32)]);
        assert_eq!(Some(&Value::Uint32(1)), record.value(1));
    }

    #[test]
    fn roundtrip_every_type() {
        let values = [
            Value::from(""),
            Value::from("Üben von Xylophon und Querflöte ist ja zweckmäßig."),
            Value::from(vec![0u8, 255, 128]),
            Value::Bool(true),
            Value::Bool(false),
            Value::Uint32(0),
            Value::Uint32(u32::MAX),
            Value::Uint64(u64::MAX),
            Value::Sint32(-1),
            Value::Sint32(i32::MIN),
            Value::Sint32(i32::MAX),
            Value::Sint64(i64::MIN),
            Value::Int32(-1),
            Value::Int32(i32::MIN),
            Value::Int64(i64::MIN),
            Value::Int64(42),
        ];
        for (i, value) in values.iter().enumerate() {
            let field = i as FieldNumber + 1;
            let mut original = Record::new();
            original.insert(field, value.clone());
            let buf = to_bytes(&original).unwrap();
            let decoded = decode(&buf, &[(field, value.field_type())]);
            assert_eq!(original, decoded);
        }
    }

    #[test]
    fn custom_accessor_takes_ownership() {
        struct Owning {
            value: Option<Value<'static>>,
        }

        impl FieldAccessor for Owning {
            fn fields_present(&self) -> Vec<FieldNumber> { Vec::new() }
            fn expected_type(&self, _field: FieldNumber) -> Option<FieldType> { None }
            fn get(&self, _field: FieldNumber) -> Option<Value<'_>> { None }
            fn set<'v>(&mut self, _field: FieldNumber, value: Value<'v>) -> Result<(), Value<'v>> {
                self.value = Some(value.into_owned());
                Ok(())
            }
        }

        let buf = [0x09, 0x02, b'h', b'i'];
        let mut accessor = Owning { value: None };
        Decoder::decode(&buf, &mut accessor).unwrap();
        assert!(matches!(accessor.value, Some(Value::Str(Cow::Owned(ref s))) if s == "hi"));
    }

    #[test]
    fn truncated() {
        let schema = [(1, FieldType::Int32), (2, FieldType::String)];
        assert_eq!((DecodeError::TruncatedInput, 0), decode_err(&[0x88], &schema));
        assert_eq!((DecodeError::TruncatedInput, 1), decode_err(&[0x08], &schema));
        assert_eq!((DecodeError::TruncatedInput, 1), decode_err(&[0x08, 0x8f, 0xff], &schema));
        assert_eq!((DecodeError::TruncatedInput, 1), decode_err(&[0x11, 0x05, b'a'], &schema));
    }

    #[test]
    fn malformed_tag() {
        assert_eq!((DecodeError::MalformedTag(2), 2), decode_err(&[0x08, 0x01, 0x0a, 0x01], &[(1, FieldType::Int32)]));
        assert_eq!((DecodeError::MalformedTag(5), 0), decode_err(&[0x0d, 0x01], &[(1, FieldType::Int32)]));
    }

    #[test]
    fn unknown_field() {
        assert_eq!((DecodeError::UnknownField(2), 2), decode_err(&[0x08, 0x01, 0x10, 0x01], &[(1, FieldType::Int32)]));
    }

    #[test]
    fn wire_kind_mismatch() {
        assert_eq!(
            (DecodeError::TypeMismatch { field: 1, expected: FieldType::String, wire: WireKind::Varint }, 0),
            decode_err(&[0x08, 0x01], &[(1, FieldType::String)]),
        );
        assert_eq!(
            (DecodeError::TypeMismatch { field: 1, expected: FieldType::Sint64, wire: WireKind::LengthDelimited }, 0),
            decode_err(&[0x09, 0x00], &[(1, FieldType::Sint64)]),
        );
    }

    #[test]
    fn overflow() {
        assert_eq!((DecodeError::Overflow, 1), decode_err(&[0x08, 0x90, 0x80, 0x80, 0x80, 0x00], &[(1, FieldType::Uint32)]));
    }

    #[test]
    fn invalid_utf8() {
        let (err, at) = decode_err(&[0x09, 0x02, 0xc3, 0x28], &[]);
        assert!(matches!(err, DecodeError::Utf8(_)));
        assert_eq!(1, at);
    }

    #[test]
    fn partial_effect_on_failure() {
        let mut record = Record::new();
        record.declare(1, FieldType::Uint32);
        let err = Decoder::decode(&[0x08, 0x07, 0x10, 0x01], &mut record).unwrap_err();
        assert_eq!(&DecodeError::UnknownField(2), err.inner());
        assert_eq!(2, err.position());
        assert_eq!(Some(&Value::Uint32(7)), record.value(1));
    }

    #[test]
    fn rejected() {
        struct Stubborn;

        impl FieldAccessor for Stubborn {
            fn fields_present(&self) -> Vec<FieldNumber> { Vec::new() }
            fn expected_type(&self, _field: FieldNumber) -> Option<FieldType> { Some(FieldType::Bool) }
            fn get(&self, _field: FieldNumber) -> Option<Value<'_>> { None }
            fn set<'v>(&mut self, _field: FieldNumber, value: Value<'v>) -> Result<(), Value<'v>> { Err(value) }
        }

        let err = Decoder::decode(&[0x28, 0x01], &mut Stubborn).unwrap_err();
        assert_eq!(DecodeError::Rejected { field: 5, ty: FieldType::Bool }, err.into_inner());
    }

    #[test]
    fn errors_display_position() {
        let err = Decoder::decode(&[0x08, 0x01, 0x0f], &mut Record::new()).unwrap_err();
        assert_eq!("Field 1 has no expected type, cannot interpret varint payload at input position 0", err.to_string());
    }

    #[test]
    fn empty_buffer() {
        let record = decode(&[], &[(1, FieldType::Int32)]);
        assert!(record.is_empty());
    }

    fn decode(buf: &[u8], schema: &[(FieldNumber, FieldType)]) -> Record {
        let mut record = Record::with_schema(schema.iter().copied().collect());
        Decoder::decode(buf, &mut record).unwrap();
        record
    }

    fn decode_err(buf: &[u8], schema: &[(FieldNumber, FieldType)]) -> (DecodeError, usize) {
        let mut record = Record::with_schema(schema.iter().copied().collect());
        let err = Decoder::decode(buf, &mut record).unwrap_err();
        let at = err.position();
        (err.into_inner(), at)
    }

}
