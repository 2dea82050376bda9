//! Open .dbf files: create/open, record CRUD, header maintenance.

use std::collections::BTreeMap;
use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use chrono::NaiveDate;

use crate::error::{DbfError, Result};
use crate::header::{
    DbfHeader, HEADER_LEN, decode_descriptor_table, decode_header, encode_header,
    encode_header_block, header_block_len,
};
use crate::record::{ACTIVE_FLAG, DELETED_FLAG, decode_record, encode_record};
use crate::types::{
    FieldSchema, FieldType, FieldValue, NamedRecord, Record, record_length, validate_schema,
};

/// How to open an existing file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OpenMode {
    /// Record reads only; mutations fail with `ReadOnly`.
    ReadOnly,
    /// Full read/write access.
    #[default]
    ReadWrite,
}

/// Options for creating a new file.
#[derive(Debug, Clone)]
pub struct CreateOptions {
    /// Replace an existing file instead of failing with `PathExists`.
    pub overwrite: bool,
    /// Truncate overlong Character values instead of rejecting them
    /// (default: true, matching dBASE semantics).
    pub truncate_values: bool,
}

impl Default for CreateOptions {
    fn default() -> Self {
        Self {
            overwrite: false,
            truncate_values: true,
        }
    }
}

impl CreateOptions {
    /// Create options with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Allow replacing an existing file.
    #[must_use]
    pub const fn overwrite(mut self) -> Self {
        self.overwrite = true;
        self
    }

    /// Reject overlong Character values with `ValueTooLong` instead of
    /// truncating them.
    #[must_use]
    pub const fn strict_lengths(mut self) -> Self {
        self.truncate_values = false;
        self
    }
}

/// Per-field metadata as reported by [`DbfFile::header_info`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldInfo {
    /// Field name.
    pub name: String,
    /// Field type.
    pub field_type: FieldType,
    /// On-disk byte width.
    pub length: u8,
    /// Digits after the decimal point.
    pub decimal_count: u8,
    /// Byte offset of the value within a record (the flag byte is offset 0).
    pub offset: usize,
}

/// Header metadata snapshot: schema plus record/header byte counts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderInfo {
    /// Version/signature byte.
    pub signature: u8,
    /// Date of the last mutation.
    pub last_update: NaiveDate,
    /// Physically stored records, soft-deleted included.
    pub record_count: u32,
    /// Header block size in bytes.
    pub header_len: u16,
    /// Per-record byte width.
    pub record_len: u16,
    /// Per-field metadata in column order.
    pub fields: Vec<FieldInfo>,
}

/// An open .dbf file.
///
/// Owns the storage handle and the in-memory header/schema cache; no two
/// `DbfFile` instances share a handle. Header mutations (record count,
/// last-update date) are flushed before each mutating call returns, so the
/// on-disk record count is always consistent with the stored records.
#[derive(Debug)]
pub struct DbfFile {
    pub(crate) path: PathBuf,
    pub(crate) handle: Option<File>,
    pub(crate) mode: OpenMode,
    pub(crate) header: DbfHeader,
    pub(crate) fields: Vec<FieldSchema>,
    pub(crate) truncate_values: bool,
}

impl DbfFile {
    /// Create a new file with the given schema and zero records.
    ///
    /// Fails with `PathExists` if a file is already present at `path` and
    /// with `InvalidSchema` if the schema is empty or malformed.
    pub fn create(path: &Path, schema: Vec<FieldSchema>) -> Result<Self> {
        Self::create_with_options(path, schema, CreateOptions::default())
    }

    /// Create a new file with explicit options.
    pub fn create_with_options(
        path: &Path,
        schema: Vec<FieldSchema>,
        options: CreateOptions,
    ) -> Result<Self> {
        validate_schema(&schema)?;

        if !options.overwrite && path.exists() {
            return Err(DbfError::PathExists {
                path: path.to_path_buf(),
            });
        }

        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)?;

        let header = DbfHeader::new(
            header_block_len(schema.len()) as u16,
            record_length(&schema) as u16,
        );
        file.write_all(&encode_header_block(&header, &schema))?;

        Ok(Self {
            path: path.to_path_buf(),
            handle: Some(file),
            mode: OpenMode::ReadWrite,
            header,
            fields: schema,
            truncate_values: options.truncate_values,
        })
    }

    /// Open an existing file, parsing its header and schema.
    pub fn open(path: &Path, mode: OpenMode) -> Result<Self> {
        let mut open_options = OpenOptions::new();
        open_options.read(true);
        if mode == OpenMode::ReadWrite {
            open_options.write(true);
        }
        let mut file = open_options.open(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                DbfError::FileNotFound {
                    path: path.to_path_buf(),
                }
            } else {
                DbfError::Io(e)
            }
        })?;

        let mut prefix = vec![0u8; HEADER_LEN];
        let got = read_up_to(&mut file, &mut prefix)?;
        let header = decode_header(&prefix[..got])?;

        let table_len = header.header_len as usize - HEADER_LEN;
        let mut table = vec![0u8; table_len];
        let got = read_up_to(&mut file, &mut table)?;
        let fields = decode_descriptor_table(&table[..got], &header)?;

        Ok(Self {
            path: path.to_path_buf(),
            handle: Some(file),
            mode,
            header,
            fields,
            truncate_values: true,
        })
    }

    /// Number of stored records, soft-deleted ones included. O(1).
    #[must_use]
    pub fn record_count(&self) -> usize {
        self.header.record_count as usize
    }

    /// Number of schema fields. O(1).
    #[must_use]
    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    /// The schema, in column order.
    #[must_use]
    pub fn fields(&self) -> &[FieldSchema] {
        &self.fields
    }

    /// Path this handle was opened or created at.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Header metadata plus per-field layout.
    #[must_use]
    pub fn header_info(&self) -> HeaderInfo {
        let mut offset = 1usize;
        let fields = self
            .fields
            .iter()
            .map(|field| {
                let info = FieldInfo {
                    name: field.name.clone(),
                    field_type: field.field_type,
                    length: field.length,
                    decimal_count: field.decimal_count,
                    offset,
                };
                offset += field.length as usize;
                info
            })
            .collect();

        HeaderInfo {
            signature: self.header.signature,
            last_update: self.header.last_update,
            record_count: self.header.record_count,
            header_len: self.header.header_len,
            record_len: self.header.record_len,
            fields,
        }
    }

    /// Read the record at the 1-based `index`.
    ///
    /// Soft-deleted records remain retrievable (with `deleted` set) until
    /// the next pack.
    pub fn record(&mut self, index: usize) -> Result<Record> {
        let bytes = self.read_raw_record(index)?;
        decode_record(&self.fields, &bytes)
    }

    /// Read the record at `index` as a name-keyed mapping.
    pub fn record_with_names(&mut self, index: usize) -> Result<NamedRecord> {
        let record = self.record(index)?;
        let values = self
            .fields
            .iter()
            .map(|field| field.name.clone())
            .zip(record.values)
            .collect();
        Ok(NamedRecord {
            deleted: record.deleted,
            values,
        })
    }

    /// Append a record; returns its 1-based index.
    ///
    /// `values` is keyed by field name (case-insensitive); every declared
    /// field needs an entry.
    pub fn add_record(&mut self, values: &BTreeMap<String, FieldValue>) -> Result<usize> {
        self.ensure_writable()?;
        let bytes = encode_record(
            &self.fields,
            &normalize_keys(values),
            false,
            self.truncate_values,
        )?;

        let index = self.record_count() + 1;
        let offset = self.record_offset(index);
        let file = self.handle_mut()?;
        file.seek(SeekFrom::Start(offset))?;
        file.write_all(&bytes)?;

        self.header.record_count += 1;
        self.flush_header()?;
        Ok(index)
    }

    /// Overwrite the record at `index` in place.
    ///
    /// The current deletion flag is preserved unless `deleted` is supplied
    /// explicitly.
    pub fn replace_record(
        &mut self,
        index: usize,
        values: &BTreeMap<String, FieldValue>,
        deleted: Option<bool>,
    ) -> Result<()> {
        self.ensure_writable()?;
        let flag = match deleted {
            Some(flag) => {
                self.check_index(index)?;
                flag
            }
            None => self.record(index)?.deleted,
        };

        let bytes = encode_record(
            &self.fields,
            &normalize_keys(values),
            flag,
            self.truncate_values,
        )?;

        let offset = self.record_offset(index);
        let file = self.handle_mut()?;
        file.seek(SeekFrom::Start(offset))?;
        file.write_all(&bytes)?;
        self.flush_header()
    }

    /// Soft-delete the record at `index` by setting its flag byte.
    ///
    /// Idempotent; never alters the record count or shifts other records.
    pub fn delete_record(&mut self, index: usize) -> Result<()> {
        self.set_deletion_flag(index, DELETED_FLAG)
    }

    /// Clear the deletion flag of the record at `index`. Idempotent.
    pub fn undelete_record(&mut self, index: usize) -> Result<()> {
        self.set_deletion_flag(index, ACTIVE_FLAG)
    }

    /// Flush and release the storage handle.
    ///
    /// Every later operation on this handle, a second `close` included,
    /// fails with `UseAfterClose`.
    pub fn close(&mut self) -> Result<()> {
        let file = self.handle.take().ok_or(DbfError::UseAfterClose)?;
        if self.mode == OpenMode::ReadWrite {
            file.sync_all()?;
        }
        Ok(())
    }

    pub(crate) fn ensure_writable(&self) -> Result<()> {
        match self.mode {
            OpenMode::ReadWrite => Ok(()),
            OpenMode::ReadOnly => Err(DbfError::ReadOnly),
        }
    }

    pub(crate) fn handle_mut(&mut self) -> Result<&mut File> {
        self.handle.as_mut().ok_or(DbfError::UseAfterClose)
    }

    pub(crate) fn check_index(&self, index: usize) -> Result<()> {
        if index == 0 || index > self.record_count() {
            return Err(DbfError::OutOfRange {
                index,
                count: self.record_count(),
            });
        }
        Ok(())
    }

    pub(crate) fn record_offset(&self, index: usize) -> u64 {
        u64::from(self.header.header_len) + (index as u64 - 1) * u64::from(self.header.record_len)
    }

    /// Read the raw bytes of the record at `index`, flag byte included.
    pub(crate) fn read_raw_record(&mut self, index: usize) -> Result<Vec<u8>> {
        self.check_index(index)?;
        let expected = self.header.record_len as usize;
        let offset = self.record_offset(index);

        let file = self.handle_mut()?;
        file.seek(SeekFrom::Start(offset))?;
        let mut buf = vec![0u8; expected];
        let actual = read_up_to(file, &mut buf)?;
        if actual < expected {
            return Err(DbfError::TruncatedRecord { expected, actual });
        }
        Ok(buf)
    }

    fn set_deletion_flag(&mut self, index: usize, flag: u8) -> Result<()> {
        self.ensure_writable()?;
        self.check_index(index)?;
        let offset = self.record_offset(index);
        let file = self.handle_mut()?;
        file.seek(SeekFrom::Start(offset))?;
        file.write_all(&[flag])?;
        self.flush_header()
    }

    /// Rewrite the 32-byte header, stamping the last-update date.
    pub(crate) fn flush_header(&mut self) -> Result<()> {
        self.header.touch();
        let encoded = encode_header(&self.header);
        let file = self.handle_mut()?;
        file.seek(SeekFrom::Start(0))?;
        file.write_all(&encoded)?;
        Ok(())
    }
}

/// Uppercase and trim the caller's value keys to match stored field names.
fn normalize_keys(values: &BTreeMap<String, FieldValue>) -> BTreeMap<String, FieldValue> {
    values
        .iter()
        .map(|(key, value)| (key.trim().to_uppercase(), value.clone()))
        .collect()
}

/// Read until the buffer is full or EOF; returns the bytes read.
fn read_up_to(file: &mut File, buf: &mut [u8]) -> Result<usize> {
    let mut total = 0usize;
    while total < buf.len() {
        let n = file.read(&mut buf[total..])?;
        if n == 0 {
            break;
        }
        total += n;
    }
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_keys() {
        let values = BTreeMap::from([(" age ".to_string(), FieldValue::numeric(23.0))]);
        let normalized = normalize_keys(&values);
        assert!(normalized.contains_key("AGE"));
    }

    #[test]
    fn test_create_options_builders() {
        let options = CreateOptions::new().overwrite().strict_lengths();
        assert!(options.overwrite);
        assert!(!options.truncate_values);
    }
}
