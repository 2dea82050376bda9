//! Field schema types.
//!
//! A .dbf schema is an ordered list of [`FieldSchema`] entries; column order
//! is significant and fixed for the lifetime of the file.

use std::collections::BTreeSet;

use crate::error::{DbfError, Result};
use crate::header::header_block_len;

/// Maximum significant length of a field name in classic dBASE.
pub const MAX_FIELD_NAME_LEN: usize = 10;

/// The five classic dBASE III field types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    /// `C`: fixed-width text, space-padded.
    Character,
    /// `N`: right-justified ASCII decimal number.
    Numeric,
    /// `D`: `YYYYMMDD` calendar date.
    Date,
    /// `L`: single-byte boolean/unknown.
    Logical,
    /// `F`: floating point, same on-disk shape as Numeric.
    Float,
}

impl FieldType {
    /// The type character stored in the field descriptor.
    #[must_use]
    pub const fn type_char(self) -> u8 {
        match self {
            Self::Character => b'C',
            Self::Numeric => b'N',
            Self::Date => b'D',
            Self::Logical => b'L',
            Self::Float => b'F',
        }
    }

    /// Map a descriptor type character back to a field type.
    #[must_use]
    pub const fn from_type_char(ch: u8) -> Option<Self> {
        match ch {
            b'C' => Some(Self::Character),
            b'N' => Some(Self::Numeric),
            b'D' => Some(Self::Date),
            b'L' => Some(Self::Logical),
            b'F' => Some(Self::Float),
            _ => None,
        }
    }
}

impl std::fmt::Display for FieldType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Character => "Character",
            Self::Numeric => "Numeric",
            Self::Date => "Date",
            Self::Logical => "Logical",
            Self::Float => "Float",
        };
        write!(f, "{name}")
    }
}

/// One named, typed, fixed-width column.
///
/// Names are normalized to trimmed uppercase on construction, matching how
/// dBASE stores them in the descriptor table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSchema {
    /// Field name (uppercase, at most 10 characters).
    pub name: String,
    /// Field type.
    pub field_type: FieldType,
    /// On-disk byte width of the value.
    pub length: u8,
    /// Digits after the decimal point (Numeric/Float only).
    pub decimal_count: u8,
}

impl FieldSchema {
    /// Create a field with an explicit length and decimal count.
    pub fn new(
        name: impl Into<String>,
        field_type: FieldType,
        length: u8,
        decimal_count: u8,
    ) -> Self {
        Self {
            name: name.into().trim().to_uppercase(),
            field_type,
            length,
            decimal_count,
        }
    }

    /// Character field of the given width.
    pub fn character(name: impl Into<String>, length: u8) -> Self {
        Self::new(name, FieldType::Character, length, 0)
    }

    /// Numeric field with explicit width and decimal count.
    pub fn numeric(name: impl Into<String>, length: u8, decimal_count: u8) -> Self {
        Self::new(name, FieldType::Numeric, length, decimal_count)
    }

    /// Date field; always 8 bytes on disk.
    pub fn date(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::Date, 8, 0)
    }

    /// Logical field; always 1 byte on disk.
    pub fn logical(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::Logical, 1, 0)
    }

    /// Float field; 20 bytes on disk, the classic default width.
    pub fn float(name: impl Into<String>, decimal_count: u8) -> Self {
        Self::new(name, FieldType::Float, 20, decimal_count)
    }
}

/// Per-record byte width: one deletion-flag byte plus every field width.
#[must_use]
pub fn record_length(fields: &[FieldSchema]) -> usize {
    1 + fields.iter().map(|f| f.length as usize).sum::<usize>()
}

/// Validate a schema before creating a file.
pub fn validate_schema(fields: &[FieldSchema]) -> Result<()> {
    if fields.is_empty() {
        return Err(DbfError::invalid_schema("schema has no fields"));
    }

    let mut seen = BTreeSet::new();
    for field in fields {
        if field.name.is_empty() || field.name.len() > MAX_FIELD_NAME_LEN {
            return Err(DbfError::invalid_schema(format!(
                "field name {:?} must be non-empty and at most {MAX_FIELD_NAME_LEN} characters",
                field.name
            )));
        }
        if !field.name.bytes().all(|b| b.is_ascii_graphic()) {
            return Err(DbfError::invalid_schema(format!(
                "field name {:?} contains non-printable or non-ASCII characters",
                field.name
            )));
        }
        if field.length == 0 {
            return Err(DbfError::invalid_schema(format!(
                "field {} has zero length",
                field.name
            )));
        }
        if !seen.insert(field.name.clone()) {
            return Err(DbfError::invalid_schema(format!(
                "duplicate field name {}",
                field.name
            )));
        }
    }

    // The header stores both byte widths as u16; anything wider cannot be
    // represented on disk.
    let record_len = record_length(fields);
    if record_len > u16::MAX as usize {
        return Err(DbfError::invalid_schema(format!(
            "record length {record_len} exceeds the format limit of {}",
            u16::MAX
        )));
    }
    let header_len = header_block_len(fields.len());
    if header_len > u16::MAX as usize {
        return Err(DbfError::invalid_schema(format!(
            "{} fields need a {header_len}-byte header, over the format limit of {}",
            fields.len(),
            u16::MAX
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_char_roundtrip() {
        for ty in [
            FieldType::Character,
            FieldType::Numeric,
            FieldType::Date,
            FieldType::Logical,
            FieldType::Float,
        ] {
            assert_eq!(FieldType::from_type_char(ty.type_char()), Some(ty));
        }
        assert_eq!(FieldType::from_type_char(b'M'), None);
        assert_eq!(FieldType::from_type_char(b'X'), None);
    }

    #[test]
    fn test_constructors_fix_widths() {
        assert_eq!(FieldSchema::date("BORN").length, 8);
        assert_eq!(FieldSchema::logical("ISMEMBER").length, 1);
        assert_eq!(FieldSchema::float("SCORE", 4).length, 20);
    }

    #[test]
    fn test_name_normalization() {
        let field = FieldSchema::character(" name ", 50);
        assert_eq!(field.name, "NAME");
    }

    #[test]
    fn test_record_length() {
        let fields = vec![
            FieldSchema::character("NAME", 50),
            FieldSchema::numeric("AGE", 3, 0),
            FieldSchema::logical("ISMEMBER"),
        ];
        assert_eq!(record_length(&fields), 1 + 50 + 3 + 1);
    }

    #[test]
    fn test_validate_rejects_bad_schemas() {
        assert!(validate_schema(&[]).is_err());
        assert!(validate_schema(&[FieldSchema::character("", 10)]).is_err());
        assert!(validate_schema(&[FieldSchema::character("TOOLONGNAME", 10)]).is_err());
        assert!(validate_schema(&[FieldSchema::character("X", 0)]).is_err());
        assert!(
            validate_schema(&[
                FieldSchema::numeric("AGE", 3, 0),
                FieldSchema::character("age", 10),
            ])
            .is_err()
        );
    }

    #[test]
    fn test_validate_rejects_record_length_over_u16() {
        // 258 x 255 bytes sums to 65 791 with the flag byte, past u16::MAX.
        let fields: Vec<FieldSchema> = (0..258)
            .map(|i| FieldSchema::character(format!("F{i}"), 255))
            .collect();
        assert!(matches!(
            validate_schema(&fields),
            Err(DbfError::InvalidSchema { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_header_length_over_u16() {
        // 2047 descriptors need a 65 537-byte header even though the record
        // width itself fits.
        let fields: Vec<FieldSchema> = (0..2047)
            .map(|i| FieldSchema::logical(format!("F{i}")))
            .collect();
        assert_eq!(record_length(&fields), 2048);
        assert!(matches!(
            validate_schema(&fields),
            Err(DbfError::InvalidSchema { .. })
        ));

        // One field fewer stays within both limits.
        let fields: Vec<FieldSchema> = (0..2046)
            .map(|i| FieldSchema::logical(format!("F{i}")))
            .collect();
        assert!(validate_schema(&fields).is_ok());
    }

    #[test]
    fn test_validate_accepts_good_schema() {
        let fields = vec![
            FieldSchema::date("DATE"),
            FieldSchema::character("NAME", 50),
            FieldSchema::numeric("AGE", 3, 0),
            FieldSchema::character("EMAIL", 128),
            FieldSchema::logical("ISMEMBER"),
        ];
        assert!(validate_schema(&fields).is_ok());
    }
}
