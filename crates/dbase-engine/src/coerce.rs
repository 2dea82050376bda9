//! Per-type field value encoding and decoding.
//!
//! Every encoded value is exactly `field.length` bytes wide:
//!
//! - Character: left-justified, space-padded; overlong values are truncated
//!   by default (classic dBASE semantics) or rejected when truncation is
//!   disabled.
//! - Numeric/Float: right-justified ASCII digits with optional sign and
//!   decimal point, space-padded on the left.
//! - Date: `YYYYMMDD`, spaces when absent.
//! - Logical: one of `T`/`F`/`?`.
//!
//! Blank fields decode to [`FieldValue::Null`].

use chrono::NaiveDate;

use crate::error::{DbfError, Result};
use crate::types::{FieldSchema, FieldType, FieldValue};

/// Encode one value to its fixed-width on-disk form.
///
/// `truncate` controls the Character overflow policy: when true (the
/// default), overlong text is silently cut at the field width; when false
/// it is rejected with `ValueTooLong`.
pub(crate) fn encode_value(
    field: &FieldSchema,
    value: &FieldValue,
    truncate: bool,
) -> Result<Vec<u8>> {
    let len = field.length as usize;

    if value.is_null() {
        return Ok(vec![b' '; len]);
    }

    match (field.field_type, value) {
        (FieldType::Character, FieldValue::Character(text)) => {
            if !truncate && text.chars().count() > len {
                return Err(DbfError::ValueTooLong {
                    name: field.name.clone(),
                    actual: text.chars().count(),
                    limit: len,
                });
            }
            Ok(encode_text(text, len))
        }
        (FieldType::Numeric | FieldType::Float, FieldValue::Numeric(number)) => {
            if !number.is_finite() {
                // Non-finite values have no ASCII decimal form; store blank.
                return Ok(vec![b' '; len]);
            }
            let text = format!("{number:.prec$}", prec = field.decimal_count as usize);
            if text.len() > len {
                return Err(DbfError::ValueTooLong {
                    name: field.name.clone(),
                    actual: text.len(),
                    limit: len,
                });
            }
            let mut out = vec![b' '; len];
            out[len - text.len()..].copy_from_slice(text.as_bytes());
            Ok(out)
        }
        (FieldType::Date, FieldValue::Date(date)) => {
            let text = date.format("%Y%m%d").to_string();
            if text.len() > len {
                return Err(DbfError::ValueTooLong {
                    name: field.name.clone(),
                    actual: text.len(),
                    limit: len,
                });
            }
            Ok(encode_text(&text, len))
        }
        (FieldType::Logical, FieldValue::Logical(flag)) => {
            let mut out = vec![b' '; len];
            out[0] = if *flag { b'T' } else { b'F' };
            Ok(out)
        }
        (expected, _) => Err(DbfError::type_mismatch(&field.name, expected_name(expected))),
    }
}

/// Decode one fixed-width value; `bytes` must be exactly `field.length` long.
pub(crate) fn decode_value(field: &FieldSchema, bytes: &[u8]) -> Result<FieldValue> {
    match field.field_type {
        FieldType::Character => {
            let text = String::from_utf8_lossy(bytes);
            Ok(FieldValue::Character(text.trim_end().to_string()))
        }
        FieldType::Numeric | FieldType::Float => {
            let text = String::from_utf8_lossy(bytes);
            let trimmed = text.trim();
            if trimmed.is_empty() {
                return Ok(FieldValue::Null);
            }
            trimmed
                .parse::<f64>()
                .map(FieldValue::Numeric)
                .map_err(|_| DbfError::numeric_parse(&field.name, trimmed))
        }
        FieldType::Date => {
            let text = String::from_utf8_lossy(bytes);
            let trimmed = text.trim();
            if trimmed.is_empty() {
                return Ok(FieldValue::Null);
            }
            NaiveDate::parse_from_str(trimmed, "%Y%m%d")
                .map(FieldValue::Date)
                .map_err(|_| DbfError::date_parse(&field.name, trimmed))
        }
        FieldType::Logical => match bytes.first().copied().unwrap_or(b' ') {
            b'T' | b't' | b'Y' | b'y' => Ok(FieldValue::Logical(true)),
            b'F' | b'f' | b'N' | b'n' => Ok(FieldValue::Logical(false)),
            b'?' | b' ' => Ok(FieldValue::Null),
            byte => Err(DbfError::LogicalParse {
                name: field.name.clone(),
                byte,
            }),
        },
    }
}

/// Left-justified, space-padded text; non-ASCII characters become `?`.
fn encode_text(text: &str, len: usize) -> Vec<u8> {
    let mut out = Vec::with_capacity(len);
    for ch in text.chars().take(len) {
        if ch.is_ascii() {
            out.push(ch as u8);
        } else {
            out.push(b'?');
        }
    }
    while out.len() < len {
        out.push(b' ');
    }
    out
}

const fn expected_name(field_type: FieldType) -> &'static str {
    match field_type {
        FieldType::Character => "character",
        FieldType::Numeric => "numeric",
        FieldType::Date => "date",
        FieldType::Logical => "logical",
        FieldType::Float => "float",
    }
}
