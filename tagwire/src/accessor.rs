use crate::value::{FieldType, Value};
use crate::FieldNumber;

/// The capability the `Encoder` and `Decoder` use to walk a record without knowing its layout.
///
/// Implementors decide how values are stored. The encoder only calls `fields_present`,
/// `expected_type` and `get`; the decoder only calls `expected_type` and `set`.
pub trait FieldAccessor {

    /// All fields which currently hold a value, in any order
    fn fields_present(&self) -> Vec<FieldNumber>;

    /// The type `field` is declared with, if any. The decoder needs this to tell the integer
    /// types apart, since they share one wire kind.
    fn expected_type(&self, field: FieldNumber) -> Option<FieldType>;

    fn get(&self, field: FieldNumber) -> Option<Value<'_>>;

    /// Stores `value` in `field`. An implementor refusing the value hands it back.
    fn set<'v>(&mut self, field: FieldNumber, value: Value<'v>) -> Result<(), Value<'v>>;

}
