//! The fixed 32-byte .dbf file header.
//!
//! # Header layout
//!
//! | Offset | Field        | Type         | Description                     |
//! |--------|--------------|--------------|---------------------------------|
//! | 0      | signature    | u8           | Version byte (0x03 = dBASE III) |
//! | 1-3    | last update  | u8 x 3       | YY (since 1900), MM, DD         |
//! | 4-7    | record count | u32 LE       | Records stored, deleted included|
//! | 8-9    | header len   | u16 LE       | Bytes before the first record   |
//! | 10-11  | record len   | u16 LE       | Bytes per record, flag included |
//! | 12-31  | reserved     | u8 x 20      | Zeroed                          |

use chrono::{Datelike, NaiveDate};

use crate::error::{DbfError, Result};

/// Size of the fixed file header.
pub const HEADER_LEN: usize = 32;

/// Signature byte for plain dBASE III files.
pub const SIG_DBASE3: u8 = 0x03;

/// Signature byte for dBASE III files with a memo (.dbt) companion.
pub const SIG_DBASE3_MEMO: u8 = 0x83;

/// Parsed file header.
///
/// Owned exclusively by a [`DbfFile`](crate::DbfFile); mutated on
/// add/delete/pack and flushed back to disk before any dependent read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DbfHeader {
    /// Version/signature byte.
    pub signature: u8,
    /// Date of the last mutation.
    pub last_update: NaiveDate,
    /// Number of physically stored records, soft-deleted ones included.
    pub record_count: u32,
    /// Total size of header plus descriptor table plus terminator.
    pub header_len: u16,
    /// Fixed per-record byte width.
    pub record_len: u16,
}

impl DbfHeader {
    /// Header for a freshly created file with zero records.
    #[must_use]
    pub fn new(header_len: u16, record_len: u16) -> Self {
        Self {
            signature: SIG_DBASE3,
            last_update: today(),
            record_count: 0,
            header_len,
            record_len,
        }
    }

    /// Stamp the last-update date with the current date.
    pub fn touch(&mut self) {
        self.last_update = today();
    }
}

/// Encode the fixed 32-byte header.
#[must_use]
pub fn encode_header(header: &DbfHeader) -> [u8; HEADER_LEN] {
    let mut out = [0u8; HEADER_LEN];
    out[0] = header.signature;
    out[1] = header.last_update.year().saturating_sub(1900).clamp(0, 255) as u8;
    out[2] = header.last_update.month() as u8;
    out[3] = header.last_update.day() as u8;
    out[4..8].copy_from_slice(&header.record_count.to_le_bytes());
    out[8..10].copy_from_slice(&header.header_len.to_le_bytes());
    out[10..12].copy_from_slice(&header.record_len.to_le_bytes());
    out
}

/// Decode the fixed 32-byte header.
///
/// The memo-enabled signature `0x83` is accepted as the plain dBASE III
/// layout with a warning, since memo fields are out of scope; any other
/// signature is rejected.
pub fn decode_header(bytes: &[u8]) -> Result<DbfHeader> {
    if bytes.len() < HEADER_LEN {
        return Err(DbfError::corrupt_header(format!(
            "file shorter than the {HEADER_LEN}-byte header ({} bytes)",
            bytes.len()
        )));
    }

    let signature = bytes[0];
    match signature {
        SIG_DBASE3 => {}
        SIG_DBASE3_MEMO => {
            tracing::warn!(
                signature,
                "memo-enabled dBASE III signature; memo data is ignored"
            );
        }
        other => {
            return Err(DbfError::corrupt_header(format!(
                "unrecognized signature byte {other:#04x}"
            )));
        }
    }

    let last_update = decode_update_date(bytes[1], bytes[2], bytes[3]);
    let record_count = u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]);
    let header_len = u16::from_le_bytes([bytes[8], bytes[9]]);
    let record_len = u16::from_le_bytes([bytes[10], bytes[11]]);

    if (header_len as usize) < HEADER_LEN + 1 {
        return Err(DbfError::corrupt_header(format!(
            "declared header length {header_len} is smaller than the fixed header"
        )));
    }
    if record_len == 0 {
        return Err(DbfError::corrupt_header("declared record length is zero"));
    }

    Ok(DbfHeader {
        signature,
        last_update,
        record_count,
        header_len,
        record_len,
    })
}

/// Decode the YY/MM/DD update date; junk bytes fall back to 1900-01-01.
fn decode_update_date(yy: u8, mm: u8, dd: u8) -> NaiveDate {
    match NaiveDate::from_ymd_opt(1900 + i32::from(yy), u32::from(mm), u32::from(dd)) {
        Some(date) => date,
        None => {
            tracing::warn!(yy, mm, dd, "invalid last-update date bytes in header");
            NaiveDate::from_ymd_opt(1900, 1, 1).unwrap_or_default()
        }
    }
}

fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}
