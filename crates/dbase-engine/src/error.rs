//! Error types for .dbf file operations.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur when reading or writing .dbf files.
#[derive(Debug, Error)]
pub enum DbfError {
    /// File not found.
    #[error("file not found: {path}")]
    FileNotFound { path: PathBuf },

    /// Refusing to overwrite an existing file.
    #[error("file already exists: {path}")]
    PathExists { path: PathBuf },

    /// Header or field descriptor table is malformed.
    #[error("corrupt header: {message}")]
    CorruptHeader { message: String },

    /// Schema rejected before file creation.
    #[error("invalid schema: {message}")]
    InvalidSchema { message: String },

    /// Record index outside 1..=record_count.
    #[error("record index {index} out of range 1..={count}")]
    OutOfRange { index: usize, count: usize },

    /// A declared field has no supplied value.
    #[error("no value supplied for field {name}")]
    MissingField { name: String },

    /// Encoded value does not fit the field width.
    #[error("value for field {name} is {actual} bytes, field width is {limit}")]
    ValueTooLong {
        name: String,
        actual: usize,
        limit: usize,
    },

    /// Non-blank numeric field contents failed to parse.
    #[error("field {name}: cannot parse {text:?} as a number")]
    NumericParse { name: String, text: String },

    /// Non-blank date field contents failed to parse.
    #[error("field {name}: cannot parse {text:?} as a YYYYMMDD date")]
    DateParse { name: String, text: String },

    /// Logical field byte is not one of T/t/Y/y/F/f/N/n/?/space.
    #[error("field {name}: invalid logical byte {byte:#04x}")]
    LogicalParse { name: String, byte: u8 },

    /// Supplied value variant does not match the field type.
    #[error("type mismatch for field {name}: expected a {expected} value")]
    TypeMismatch {
        name: String,
        expected: &'static str,
    },

    /// Fewer bytes available than the declared record length.
    #[error("truncated record: expected {expected} bytes, got {actual}")]
    TruncatedRecord { expected: usize, actual: usize },

    /// Mutation attempted through a read-only handle.
    #[error("file is opened read-only")]
    ReadOnly,

    /// Operation attempted after `close`.
    #[error("file handle already closed")]
    UseAfterClose,

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for .dbf operations.
pub type Result<T> = std::result::Result<T, DbfError>;

impl DbfError {
    /// Create a CorruptHeader error.
    pub fn corrupt_header(message: impl Into<String>) -> Self {
        Self::CorruptHeader {
            message: message.into(),
        }
    }

    /// Create an InvalidSchema error.
    pub fn invalid_schema(message: impl Into<String>) -> Self {
        Self::InvalidSchema {
            message: message.into(),
        }
    }

    /// Create a MissingField error.
    pub fn missing_field(name: impl Into<String>) -> Self {
        Self::MissingField { name: name.into() }
    }

    /// Create a NumericParse error.
    pub fn numeric_parse(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self::NumericParse {
            name: name.into(),
            text: text.into(),
        }
    }

    /// Create a DateParse error.
    pub fn date_parse(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self::DateParse {
            name: name.into(),
            text: text.into(),
        }
    }

    /// Create a TypeMismatch error.
    pub fn type_mismatch(name: impl Into<String>, expected: &'static str) -> Self {
        Self::TypeMismatch {
            name: name.into(),
            expected,
        }
    }
}
