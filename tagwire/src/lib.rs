//! `tagwire` encodes sparse records of numbered fields into a compact, tag prefixed byte stream
//! in the style of the Protocol Buffers wire format, and decodes them back.
//!
//! A record on wire is nothing but a sequence of fields. Each field starts with a varint tag
//! holding the field number and a wire kind selector in its low three bits, followed by either a
//! varint or a length delimited run of bytes. There is no header, no message length and no
//! terminator. Varints are written with their most significant group first, see [varint].
//!
//! The codec never needs to know the layout of a record. Instead it talks to a
//! [FieldAccessor], which reports the fields present, their declared types and values, and stores
//! decoded values. [Record] is a ready-made accessor backed by ordered maps.
//!
//! # Limitations
//!
//! Only the varint and length delimited wire kinds exist; nested messages, repeated and packed
//! fields, maps and fixed width numbers are not part of the format. Since the integer types
//! share one wire kind, the decoder relies on the accessor to declare the type of every field
//! with a varint payload and fails with [DecodeError::UnknownField] otherwise.
//!
//! # Examples
//!
//! ```
//! use tagwire::*;
//!
//! let mut record = Record::new();
//! record.insert(2, Value::Sint32(-1));
//! record.insert(1, Value::from("testing"));
//! let buf = to_bytes(&record).unwrap();
//! assert_eq!(buf, [
//!     0x09, // Field 1, length delimited
//!     0x07, // Length 7
//!     0x74, // 't'
//!     0x65, // 'e'
//!     0x73, // 's'
//!     0x74, // 't'
//!     0x69, // 'i'
//!     0x6e, // 'n'
//!     0x67, // 'g'
//!     0x10, // Field 2, varint
//!     0x01, // zigzag(-1)
//! ]);
//!
//! let mut decoded = Record::new();
//! decoded.declare(2, FieldType::Sint32);
//! Decoder::decode(&buf, &mut decoded).unwrap();
//! assert_eq!(record, decoded);
//! ```

mod accessor;
mod decoder;
mod encoder;
mod error;
mod record;
mod value;

pub mod delimited;
pub mod tag;
pub mod varint;
pub mod zigzag;

pub use accessor::*;
pub use decoder::*;
pub use encoder::*;
pub use error::*;
pub use record::*;
pub use tag::{Tag, WireKind};
pub use value::*;

/// Identifies a field within a record
pub type FieldNumber = u32;
