//! Typed record values.

use std::collections::BTreeMap;

use chrono::NaiveDate;

/// A single decoded field value.
///
/// The variant carries the decoded form; `Null` stands for a fully blank
/// field (absent numeric/date, unknown logical).
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// Text with trailing padding removed.
    Character(String),
    /// Numeric or Float field contents.
    Numeric(f64),
    /// Calendar date.
    Date(NaiveDate),
    /// True/false.
    Logical(bool),
    /// Blank field.
    Null,
}

impl FieldValue {
    /// Create a character value.
    pub fn character(text: impl Into<String>) -> Self {
        Self::Character(text.into())
    }

    /// Create a numeric value.
    #[must_use]
    pub const fn numeric(value: f64) -> Self {
        Self::Numeric(value)
    }

    /// Create a date value.
    #[must_use]
    pub const fn date(date: NaiveDate) -> Self {
        Self::Date(date)
    }

    /// Create a logical value.
    #[must_use]
    pub const fn logical(value: bool) -> Self {
        Self::Logical(value)
    }

    /// Whether this is a blank value.
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Text content, if this is a character value.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Character(text) => Some(text),
            _ => None,
        }
    }

    /// Numeric content, if this is a numeric value.
    #[must_use]
    pub const fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Numeric(value) => Some(*value),
            _ => None,
        }
    }

    /// Date content, if this is a date value.
    #[must_use]
    pub const fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Self::Date(date) => Some(*date),
            _ => None,
        }
    }

    /// Boolean content, if this is a logical value.
    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Logical(value) => Some(*value),
            _ => None,
        }
    }
}

/// One decoded record: the deletion flag plus values in schema order.
///
/// A record's 1-based position is meaningful only until the next pack;
/// soft deletion never shifts positions.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    /// Soft-delete flag.
    pub deleted: bool,
    /// Field values, one per schema column, in column order.
    pub values: Vec<FieldValue>,
}

/// A decoded record keyed by field name.
#[derive(Debug, Clone, PartialEq)]
pub struct NamedRecord {
    /// Soft-delete flag.
    pub deleted: bool,
    /// Field values keyed by uppercase field name.
    pub values: BTreeMap<String, FieldValue>,
}

impl NamedRecord {
    /// Look up a value by field name (case-insensitive).
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.values.get(&name.trim().to_uppercase())
    }
}
