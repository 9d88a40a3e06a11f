//! Geometry file header decoding.
//!
//! The geometry file opens with a fixed 100-byte header. The header mixes
//! endianness: the magic number and the file length are big-endian, while
//! the version, the dominant shape type, and the extent doubles are
//! little-endian. The byte-swapping boundary is part of the format; moving
//! it silently corrupts every coordinate decoded afterwards.

use std::io::Cursor;

use byteorder::{BigEndian, LittleEndian, ReadBytesExt};

use super::constants::{FILE_HEADER_LEN, FILE_MAGIC, FILE_VERSION};
use super::shape::ShapeType;
use crate::bounding_box::BoundingBox;
use crate::error::{StoreError, StoreResult};

/// The decoded geometry file header.
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeHeader {
    /// Total file length in 16-bit words.
    pub file_length_words: i32,
    /// Format version, always 1000 for a valid file.
    pub version: i32,
    /// The dominant shape type declared for the file. Individual records
    /// still carry their own type code.
    pub shape_type: ShapeType,
    /// X/Y extents of all shapes in the file, trusted as given.
    pub bbox: BoundingBox,
    /// Z extent (min, max).
    pub z_range: (f64, f64),
    /// Measure extent (min, max).
    pub m_range: (f64, f64),
}

impl ShapeHeader {
    /// Decodes the 100-byte file header. Fails with `FormatMismatch` when
    /// the magic number or version constant is wrong, `Truncated` when
    /// fewer than 100 bytes are available.
    pub fn decode(bytes: &[u8]) -> StoreResult<Self> {
        if bytes.len() < FILE_HEADER_LEN {
            return Err(StoreError::Truncated);
        }

        let mut cursor = Cursor::new(bytes);
        let magic = cursor.read_i32::<BigEndian>()?;
        if magic != FILE_MAGIC {
            return Err(StoreError::FormatMismatch(format!(
                "bad geometry file magic: {}",
                magic
            )));
        }

        // Bytes 4..24 are unused by the format.
        cursor.set_position(24);
        let file_length_words = cursor.read_i32::<BigEndian>()?;

        let version = cursor.read_i32::<LittleEndian>()?;
        if version != FILE_VERSION {
            return Err(StoreError::FormatMismatch(format!(
                "wrong geometry file version: {}",
                version
            )));
        }

        let shape_type = ShapeType::from_code(cursor.read_i32::<LittleEndian>()?)?;

        let min_x = cursor.read_f64::<LittleEndian>()?;
        let min_y = cursor.read_f64::<LittleEndian>()?;
        let max_x = cursor.read_f64::<LittleEndian>()?;
        let max_y = cursor.read_f64::<LittleEndian>()?;
        let min_z = cursor.read_f64::<LittleEndian>()?;
        let max_z = cursor.read_f64::<LittleEndian>()?;
        let min_m = cursor.read_f64::<LittleEndian>()?;
        let max_m = cursor.read_f64::<LittleEndian>()?;

        Ok(Self {
            file_length_words,
            version,
            shape_type,
            bbox: BoundingBox::new(min_x, min_y, max_x, max_y),
            z_range: (min_z, max_z),
            m_range: (min_m, max_m),
        })
    }
}
