//! .dbf header parsing and building.
//!
//! This module handles the two on-disk metadata structures:
//! - the fixed 32-byte file header (signature, last update, record count,
//!   header and record lengths)
//! - the field descriptor table (one 32-byte entry per field, 0x0D
//!   terminated)

mod descriptor;
mod file;

pub use descriptor::{
    DESCRIPTOR_LEN, TERMINATOR, decode_descriptor, decode_descriptor_table, decode_header_block,
    encode_descriptor, encode_header_block, header_block_len,
};
pub use file::{
    DbfHeader, HEADER_LEN, SIG_DBASE3, SIG_DBASE3_MEMO, decode_header, encode_header,
};
