//! dBASE III (.dbf) file format engine.
//!
//! This crate implements the on-disk dBASE record format: open/create,
//! sequential and random-access record read/write, soft-delete/undelete,
//! and physical compaction ("pack").
//!
//! # Features
//!
//! - Byte-exact dBASE III header and field-descriptor codecs
//! - The five classic field types: Character, Numeric, Date, Logical, Float
//! - Soft deletion via the record flag byte; pack rewrites the file
//!   atomically (temp file then rename)
//! - Typed errors for every corruption and validation case
//!
//! # Example
//!
//! ```no_run
//! use std::collections::BTreeMap;
//! use std::path::Path;
//! use dbase_engine::{DbfFile, FieldSchema, FieldValue, OpenMode};
//!
//! let schema = vec![
//!     FieldSchema::character("NAME", 50),
//!     FieldSchema::numeric("AGE", 3, 0),
//! ];
//! let mut db = DbfFile::create(Path::new("people.dbf"), schema).unwrap();
//! db.add_record(&BTreeMap::from([
//!     ("NAME".to_string(), FieldValue::character("Maxim Topolov")),
//!     ("AGE".to_string(), FieldValue::numeric(23.0)),
//! ]))
//! .unwrap();
//! db.close().unwrap();
//!
//! let mut db = DbfFile::open(Path::new("people.dbf"), OpenMode::ReadOnly).unwrap();
//! let record = db.record(1).unwrap();
//! assert!(!record.deleted);
//! ```
//!
//! # Concurrency
//!
//! The engine performs no internal threading and makes no guarantee across
//! independently opened handles to the same path; serializing concurrent
//! writers is the caller's job. `&mut self` receivers keep record
//! operations from interleaving with a running pack on one handle.

mod coerce;
mod error;
mod file;
pub mod header;
mod pack;
mod record;
mod types;

// Re-export error types
pub use error::{DbfError, Result};

// Re-export core types
pub use types::{
    FieldSchema, FieldType, FieldValue, MAX_FIELD_NAME_LEN, NamedRecord, Record, record_length,
    validate_schema,
};

// Re-export file handle and options
pub use file::{CreateOptions, DbfFile, FieldInfo, HeaderInfo, OpenMode};

// Re-export the record codec
pub use record::{ACTIVE_FLAG, DELETED_FLAG, decode_record, encode_record};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
