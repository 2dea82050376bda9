//! Field descriptor table codec.
//!
//! Each field descriptor is 32 bytes; the table follows the fixed header
//! and ends with a 0x0D terminator byte.
//!
//! # Descriptor layout
//!
//! | Offset | Field         | Type      | Description                  |
//! |--------|---------------|-----------|------------------------------|
//! | 0-10   | name          | char[11]  | Null-padded ASCII, <=10 chars|
//! | 11     | type          | char      | `C`, `N`, `D`, `L`, `F`      |
//! | 12-15  | reserved      | u8 x 4    | Zeroed                       |
//! | 16     | length        | u8        | Byte width of the value      |
//! | 17     | decimal count | u8        | Digits after the point       |
//! | 18-31  | reserved      | u8 x 14   | Zeroed                       |

use crate::error::{DbfError, Result};
use crate::header::file::{DbfHeader, HEADER_LEN, decode_header, encode_header};
use crate::types::{FieldSchema, FieldType, record_length};

/// Size of one field descriptor.
pub const DESCRIPTOR_LEN: usize = 32;

/// Byte marking the end of the descriptor table.
pub const TERMINATOR: u8 = 0x0D;

/// Encode a single 32-byte field descriptor.
#[must_use]
pub fn encode_descriptor(field: &FieldSchema) -> [u8; DESCRIPTOR_LEN] {
    let mut out = [0u8; DESCRIPTOR_LEN];
    let name = field.name.as_bytes();
    out[..name.len().min(10)].copy_from_slice(&name[..name.len().min(10)]);
    out[11] = field.field_type.type_char();
    out[16] = field.length;
    out[17] = field.decimal_count;
    out
}

/// Decode a single 32-byte field descriptor.
pub fn decode_descriptor(bytes: &[u8], index: usize) -> Result<FieldSchema> {
    if bytes.len() < DESCRIPTOR_LEN {
        return Err(DbfError::corrupt_header(format!(
            "field descriptor {index} is truncated ({} bytes)",
            bytes.len()
        )));
    }

    let name_end = bytes[..11].iter().position(|&b| b == 0).unwrap_or(11);
    let name = String::from_utf8_lossy(&bytes[..name_end]).trim().to_uppercase();
    if name.is_empty() {
        return Err(DbfError::corrupt_header(format!(
            "field descriptor {index} has an empty name"
        )));
    }

    let type_char = bytes[11];
    let field_type = FieldType::from_type_char(type_char).ok_or_else(|| {
        DbfError::corrupt_header(format!(
            "field {name}: unsupported type character {:?}",
            type_char as char
        ))
    })?;

    let length = bytes[16];
    if length == 0 {
        return Err(DbfError::corrupt_header(format!(
            "field {name} has zero length"
        )));
    }

    Ok(FieldSchema {
        name,
        field_type,
        length,
        decimal_count: bytes[17],
    })
}

/// Total header size for a schema: fixed header, descriptors, terminator.
#[must_use]
pub fn header_block_len(field_count: usize) -> usize {
    HEADER_LEN + field_count * DESCRIPTOR_LEN + 1
}

/// Encode the complete header block: fixed header, descriptor table,
/// terminator byte.
#[must_use]
pub fn encode_header_block(header: &DbfHeader, fields: &[FieldSchema]) -> Vec<u8> {
    let mut out = Vec::with_capacity(header_block_len(fields.len()));
    out.extend_from_slice(&encode_header(header));
    for field in fields {
        out.extend_from_slice(&encode_descriptor(field));
    }
    out.push(TERMINATOR);
    out
}

/// Decode the descriptor table from the region between the fixed header and
/// the first record (`header.header_len - 32` bytes, terminator included).
///
/// Fails when the declared header length disagrees with the actual table
/// size, or when the field widths are inconsistent with the declared record
/// length.
pub fn decode_descriptor_table(bytes: &[u8], header: &DbfHeader) -> Result<Vec<FieldSchema>> {
    let table_len = header.header_len as usize - HEADER_LEN;
    if bytes.len() < table_len {
        return Err(DbfError::corrupt_header(format!(
            "descriptor table is truncated: {} of {table_len} bytes",
            bytes.len()
        )));
    }

    let mut fields = Vec::new();
    let mut offset = 0usize;
    loop {
        if offset >= table_len {
            return Err(DbfError::corrupt_header(
                "descriptor table has no terminator within the declared header length",
            ));
        }
        if bytes[offset] == TERMINATOR {
            break;
        }
        if offset + DESCRIPTOR_LEN > table_len {
            return Err(DbfError::corrupt_header(format!(
                "header length {} disagrees with descriptor table size",
                header.header_len
            )));
        }
        fields.push(decode_descriptor(
            &bytes[offset..offset + DESCRIPTOR_LEN],
            fields.len(),
        )?);
        offset += DESCRIPTOR_LEN;
    }

    if header_block_len(fields.len()) != header.header_len as usize {
        return Err(DbfError::corrupt_header(format!(
            "header length {} disagrees with descriptor table size ({} fields)",
            header.header_len,
            fields.len()
        )));
    }

    if record_length(&fields) != header.record_len as usize {
        return Err(DbfError::corrupt_header(format!(
            "field widths sum to {} but declared record length is {}",
            record_length(&fields),
            header.record_len
        )));
    }

    Ok(fields)
}

/// Decode a full in-memory header block into header plus schema.
pub fn decode_header_block(bytes: &[u8]) -> Result<(DbfHeader, Vec<FieldSchema>)> {
    let header = decode_header(bytes)?;
    let fields = decode_descriptor_table(&bytes[HEADER_LEN..], &header)?;
    Ok((header, fields))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_fields() -> Vec<FieldSchema> {
        vec![
            FieldSchema::character("NAME", 50),
            FieldSchema::numeric("AGE", 3, 0),
            FieldSchema::logical("ISMEMBER"),
        ]
    }

    fn sample_block() -> Vec<u8> {
        let fields = sample_fields();
        let header = DbfHeader::new(
            header_block_len(fields.len()) as u16,
            record_length(&fields) as u16,
        );
        encode_header_block(&header, &fields)
    }

    #[test]
    fn test_descriptor_roundtrip() {
        let field = FieldSchema::numeric("AGE", 3, 0);
        let encoded = encode_descriptor(&field);
        assert_eq!(&encoded[..3], b"AGE");
        assert_eq!(encoded[3], 0);
        assert_eq!(encoded[11], b'N');
        assert_eq!(encoded[16], 3);
        assert_eq!(decode_descriptor(&encoded, 0).unwrap(), field);
    }

    #[test]
    fn test_decode_rejects_unknown_type() {
        let mut encoded = encode_descriptor(&FieldSchema::character("MEMO", 10));
        encoded[11] = b'M';
        let result = decode_descriptor(&encoded, 0);
        assert!(matches!(result, Err(DbfError::CorruptHeader { .. })));
    }

    #[test]
    fn test_block_roundtrip() {
        let block = sample_block();
        assert_eq!(block.len(), header_block_len(3));
        assert_eq!(*block.last().unwrap(), TERMINATOR);

        let (header, fields) = decode_header_block(&block).unwrap();
        assert_eq!(fields, sample_fields());
        assert_eq!(header.record_len as usize, record_length(&fields));
    }

    #[test]
    fn test_header_length_mismatch_is_rejected() {
        let mut block = sample_block();
        // Claim one descriptor fewer than the table holds.
        let bogus = (header_block_len(2) as u16).to_le_bytes();
        block[8..10].copy_from_slice(&bogus);
        let result = decode_header_block(&block);
        assert!(matches!(result, Err(DbfError::CorruptHeader { .. })));
    }

    #[test]
    fn test_record_length_mismatch_is_rejected() {
        let mut block = sample_block();
        block[10..12].copy_from_slice(&99u16.to_le_bytes());
        let result = decode_header_block(&block);
        assert!(matches!(result, Err(DbfError::CorruptHeader { .. })));
    }

    #[test]
    fn test_missing_terminator_is_rejected() {
        let mut block = sample_block();
        let last = block.len() - 1;
        block[last] = 0;
        let result = decode_header_block(&block);
        assert!(matches!(result, Err(DbfError::CorruptHeader { .. })));
    }
}
