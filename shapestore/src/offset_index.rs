//! The fixed-stride offset index.
//!
//! The offset index file mirrors the geometry file's 100-byte header and
//! then carries one 8-byte entry per record in record-number order: byte
//! offset and content length, both stored as big-endian counts of 16-bit
//! words. The table is built once when the store opens and never changes.

use std::io::Cursor;

use byteorder::{BigEndian, ReadBytesExt};

use crate::error::{StoreError, StoreResult};
use crate::shapefile::constants::{FILE_HEADER_LEN, OFFSET_ENTRY_LEN};

/// Where one record lives in the geometry file, in byte units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OffsetEntry {
    /// Byte offset of the record header from the start of the geometry file.
    pub byte_offset: u64,
    /// Byte length of the record content, excluding the record header.
    pub byte_length: u32,
}

/// Ordered table mapping 1-based record numbers to geometry file positions.
#[derive(Debug, Clone, PartialEq)]
pub struct OffsetTable {
    entries: Vec<OffsetEntry>,
}

impl OffsetTable {
    /// Builds the table from the full contents of an offset index file.
    /// The stored word counts are doubled into byte units here, once.
    pub fn from_bytes(bytes: &[u8]) -> StoreResult<Self> {
        if bytes.len() < FILE_HEADER_LEN {
            return Err(StoreError::Truncated);
        }
        let body = &bytes[FILE_HEADER_LEN..];
        if body.len() % OFFSET_ENTRY_LEN != 0 {
            return Err(StoreError::Truncated);
        }

        let count = body.len() / OFFSET_ENTRY_LEN;
        let mut cursor = Cursor::new(body);
        let mut entries = Vec::with_capacity(count);
        for _ in 0..count {
            let offset_words = cursor.read_i32::<BigEndian>()?;
            let length_words = cursor.read_i32::<BigEndian>()?;
            if offset_words < 0 || length_words < 0 {
                return Err(StoreError::DecodeFailure(format!(
                    "negative offset index entry: ({}, {})",
                    offset_words, length_words
                )));
            }
            entries.push(OffsetEntry {
                byte_offset: offset_words as u64 * 2,
                byte_length: length_words as u32 * 2,
            });
        }

        Ok(Self { entries })
    }

    /// Number of records the table covers.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Looks up a 1-based record number. Numbers outside `[1, len]` are a
    /// caller contract violation and fail with `OutOfRange`.
    pub fn entry(&self, record_number: u32) -> StoreResult<OffsetEntry> {
        if record_number == 0 || record_number as usize > self.entries.len() {
            return Err(StoreError::OutOfRange {
                record_number,
                count: self.entries.len() as u32,
            });
        }
        Ok(self.entries[record_number as usize - 1])
    }

    /// Byte offset of a record in the geometry file.
    pub fn offset_of(&self, record_number: u32) -> StoreResult<u64> {
        self.entry(record_number).map(|e| e.byte_offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use byteorder::WriteBytesExt;

    fn index_bytes(entries: &[(i32, i32)]) -> Vec<u8> {
        let mut bytes = vec![0u8; FILE_HEADER_LEN];
        for (offset_words, length_words) in entries {
            bytes.write_i32::<BigEndian>(*offset_words).unwrap();
            bytes.write_i32::<BigEndian>(*length_words).unwrap();
        }
        bytes
    }

    #[test]
    fn test_build_and_lookup() {
        let table = OffsetTable::from_bytes(&index_bytes(&[(50, 10), (64, 24), (92, 10)])).unwrap();

        assert_eq!(table.len(), 3);
        assert_eq!(
            table.entry(1).unwrap(),
            OffsetEntry {
                byte_offset: 100,
                byte_length: 20
            }
        );
        assert_eq!(
            table.entry(2).unwrap(),
            OffsetEntry {
                byte_offset: 128,
                byte_length: 48
            }
        );
        assert_eq!(table.offset_of(3).unwrap(), 184);
    }

    #[test]
    fn test_offset_doubles_stored_word_offset() {
        // offset_of(r) must equal twice the word offset stored at
        // header + 8 * (r - 1), for every r in range.
        let stored = [(50, 10), (64, 24), (92, 10), (107, 2)];
        let table = OffsetTable::from_bytes(&index_bytes(&stored)).unwrap();
        for (i, (offset_words, _)) in stored.iter().enumerate() {
            let record_number = i as u32 + 1;
            assert_eq!(
                table.offset_of(record_number).unwrap(),
                *offset_words as u64 * 2
            );
        }
    }

    #[test]
    fn test_zero_and_past_end_are_out_of_range() {
        let table = OffsetTable::from_bytes(&index_bytes(&[(50, 10), (64, 24)])).unwrap();

        assert!(matches!(
            table.entry(0),
            Err(StoreError::OutOfRange {
                record_number: 0,
                count: 2
            })
        ));
        assert!(matches!(
            table.entry(3),
            Err(StoreError::OutOfRange {
                record_number: 3,
                count: 2
            })
        ));
    }

    #[test]
    fn test_empty_table() {
        let table = OffsetTable::from_bytes(&index_bytes(&[])).unwrap();
        assert!(table.is_empty());
        assert!(matches!(table.entry(1), Err(StoreError::OutOfRange { .. })));
    }

    #[test]
    fn test_short_file_is_truncated() {
        let result = OffsetTable::from_bytes(&[0u8; 40]);
        assert!(matches!(result, Err(StoreError::Truncated)));
    }

    #[test]
    fn test_partial_trailing_entry_is_truncated() {
        let mut bytes = index_bytes(&[(50, 10)]);
        bytes.extend_from_slice(&[0, 0, 0]);
        let result = OffsetTable::from_bytes(&bytes);
        assert!(matches!(result, Err(StoreError::Truncated)));
    }

    #[test]
    fn test_negative_entry_is_decode_failure() {
        let result = OffsetTable::from_bytes(&index_bytes(&[(-4, 10)]));
        assert!(matches!(result, Err(StoreError::DecodeFailure(_))));
    }
}
