//! Record codec: fixed-width record bytes to and from typed values.
//!
//! A record is one deletion-flag byte followed by each field's fixed-width
//! encoded value in schema order.

use std::collections::BTreeMap;

use crate::coerce::{decode_value, encode_value};
use crate::error::{DbfError, Result};
use crate::types::{FieldSchema, FieldValue, Record, record_length};

/// Deletion flag byte of a soft-deleted record.
pub const DELETED_FLAG: u8 = b'*';

/// Deletion flag byte of an active record.
pub const ACTIVE_FLAG: u8 = b' ';

/// Encode one record from a name-keyed value mapping.
///
/// Keys must be the uppercase field names; every declared field needs a
/// value (use [`FieldValue::Null`] for blanks). `truncate` is the Character
/// overflow policy described in [`crate::coerce`].
pub fn encode_record(
    fields: &[FieldSchema],
    values: &BTreeMap<String, FieldValue>,
    deleted: bool,
    truncate: bool,
) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(record_length(fields));
    out.push(if deleted { DELETED_FLAG } else { ACTIVE_FLAG });

    for field in fields {
        let value = values
            .get(&field.name)
            .ok_or_else(|| DbfError::missing_field(&field.name))?;
        out.extend_from_slice(&encode_value(field, value, truncate)?);
    }

    Ok(out)
}

/// Decode one record.
///
/// Any flag byte other than `*` or space is treated as active with a
/// recorded warning.
pub fn decode_record(fields: &[FieldSchema], bytes: &[u8]) -> Result<Record> {
    let expected = record_length(fields);
    if bytes.len() < expected {
        return Err(DbfError::TruncatedRecord {
            expected,
            actual: bytes.len(),
        });
    }

    let deleted = match bytes[0] {
        DELETED_FLAG => true,
        ACTIVE_FLAG => false,
        flag => {
            tracing::warn!(flag, "unrecognized deletion flag byte, treating record as active");
            false
        }
    };

    let mut values = Vec::with_capacity(fields.len());
    let mut pos = 1usize;
    for field in fields {
        let len = field.length as usize;
        values.push(decode_value(field, &bytes[pos..pos + len])?);
        pos += len;
    }

    Ok(Record { deleted, values })
}
