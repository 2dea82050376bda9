//! Physical compaction of soft-deleted records.
//!
//! Pack streams the surviving records into a temp file in the same
//! directory and atomically renames it over the original, so a crash
//! mid-pack leaves either the old file or the fully written replacement,
//! never a half-written one.

use std::io::{Seek, SeekFrom, Write};
use std::path::Path;

use tempfile::NamedTempFile;

use crate::error::{DbfError, Result};
use crate::file::DbfFile;
use crate::header::{encode_header, encode_header_block};
use crate::record::{ACTIVE_FLAG, DELETED_FLAG};

impl DbfFile {
    /// Remove all soft-deleted records, renumbering survivors from 1.
    ///
    /// Relative order of surviving records is preserved; their flags are
    /// forced to active. Returns the retained record count. The `&mut self`
    /// receiver is the exclusivity guard: no other operation can interleave
    /// with a running pack on this handle.
    pub fn pack(&mut self) -> Result<usize> {
        self.ensure_writable()?;
        self.handle_mut()?;

        let dir = self
            .path
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let mut tmp = NamedTempFile::new_in(dir)?;

        // Header goes first with a placeholder count, rewritten below once
        // the survivors are known.
        let mut new_header = self.header;
        new_header.record_count = 0;
        tmp.write_all(&encode_header_block(&new_header, &self.fields))?;

        let mut retained = 0usize;
        for index in 1..=self.record_count() {
            let mut bytes = self.read_raw_record(index)?;
            if bytes[0] == DELETED_FLAG {
                continue;
            }
            bytes[0] = ACTIVE_FLAG;
            tmp.write_all(&bytes)?;
            retained += 1;
        }

        new_header.record_count = retained as u32;
        new_header.touch();
        tmp.as_file_mut().seek(SeekFrom::Start(0))?;
        tmp.as_file_mut().write_all(&encode_header(&new_header))?;
        tmp.as_file().sync_all()?;

        // The old handle is released only once the rename has succeeded, so
        // a failed pack leaves this handle fully usable.
        let file = tmp
            .persist(&self.path)
            .map_err(|e| DbfError::Io(e.error))?;

        self.handle = Some(file);
        self.header = new_header;
        Ok(retained)
    }
}
