//! Core schema and value types.

mod field;
mod value;

pub use field::{FieldSchema, FieldType, MAX_FIELD_NAME_LEN, record_length, validate_schema};
pub use value::{FieldValue, NamedRecord, Record};
