//! A dynamic record which keeps its values and their declared types in two ordered maps. It is
//! the default `FieldAccessor` for callers without generated message types.
//!
//! ```
//! use tagwire::*;
//!
//! let schema: Schema = [(1, FieldType::String), (2, FieldType::Sint32)].into_iter().collect();
//! let mut record = Record::with_schema(schema.clone());
//! record.insert(2, Value::Sint32(-1));
//! record.insert(1, Value::from("testing"));
//! assert_eq!("(\n  1: \"testing\",\n  2: -1,\n)", format!("{}", record));
//!
//! let buf = to_bytes(&record).unwrap();
//! let mut decoded = Record::with_schema(schema);
//! Decoder::decode(&buf, &mut decoded).unwrap();
//! assert_eq!(record, decoded);
//! ```

use crate::accessor::FieldAccessor;
use crate::value::{FieldType, Value};
use crate::FieldNumber;
use std::collections::btree_map::{self, BTreeMap};
use std::fmt;
use std::iter::FromIterator;

/// Declared field types, ordered by field number
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Schema {
    types: BTreeMap<FieldNumber, FieldType>,
}

impl Schema {

    pub fn new() -> Self {
        Self::default()
    }

    /// Declares `field` with type `ty`, returning the previous declaration
    pub fn declare(&mut self, field: FieldNumber, ty: FieldType) -> Option<FieldType> {
        self.types.insert(field, ty)
    }

    pub fn get(&self, field: FieldNumber) -> Option<FieldType> {
        self.types.get(&field).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (FieldNumber, FieldType)> + '_ {
        self.types.iter().map(|(k, v)| (*k, *v))
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

}

impl FromIterator<(FieldNumber, FieldType)> for Schema {
    fn from_iter<I: IntoIterator<Item = (FieldNumber, FieldType)>>(iter: I) -> Self {
        Self { types: iter.into_iter().collect() }
    }
}

/// Renders as `1:string,2:sint32`
impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let entries = self.iter().map(|(k, v)| format!("{}:{}", k, v)).collect::<Vec<String>>();
        f.write_str(&entries.join(","))
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    schema: Schema,
    values: BTreeMap<FieldNumber, Value<'static>>,
}

impl Record {

    pub fn new() -> Self {
        Self::default()
    }

    /// An empty record whose fields are already declared, as the `Decoder` requires for varint
    /// payloads
    pub fn with_schema(schema: Schema) -> Self {
        Self { schema, values: BTreeMap::new() }
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Declares the type of `field` without giving it a value
    pub fn declare(&mut self, field: FieldNumber, ty: FieldType) -> &mut Self {
        self.schema.declare(field, ty);
        self
    }

    /// Stores `value` and declares `field` with the value's type, returning the previous value
    pub fn insert<'v>(&mut self, field: FieldNumber, value: Value<'v>) -> Option<Value<'static>> {
        self.schema.declare(field, value.field_type());
        self.values.insert(field, value.into_owned())
    }

    pub fn remove(&mut self, field: FieldNumber) -> Option<Value<'static>> {
        self.values.remove(&field)
    }

    pub fn value(&self, field: FieldNumber) -> Option<&Value<'static>> {
        self.values.get(&field)
    }

    pub fn iter(&self) -> btree_map::Iter<'_, FieldNumber, Value<'static>> {
        self.values.iter()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

}

impl FieldAccessor for Record {

    fn fields_present(&self) -> Vec<FieldNumber> {
        self.values.keys().copied().collect()
    }

    fn expected_type(&self, field: FieldNumber) -> Option<FieldType> {
        self.schema.get(field)
    }

    fn get(&self, field: FieldNumber) -> Option<Value<'_>> {
        self.values.get(&field).map(Value::borrowed)
    }

    fn set<'v>(&mut self, field: FieldNumber, value: Value<'v>) -> Result<(), Value<'v>> {
        match self.schema.get(field) {
            Some(ty) if ty != value.field_type() => Err(value),
            _ => {
                self.insert(field, value);
                Ok(())
            }
        }
    }

}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.values.is_empty() {
            return f.write_str("()");
        }
        write!(f, "(\n{}\n)", self.values.iter()
            .map(|(k, v)| format!("  {}: {},", k, v))
            .collect::<Vec<String>>().join("\n"))
    }
}
