//! Geometry record decoding.
//!
//! A record is an 8-byte big-endian header (record number, content length
//! in 16-bit words) followed by the content: a little-endian shape type
//! code and a type-specific little-endian payload. The input slice is the
//! buffer bound; the declared content length sizes that buffer but is not
//! cross-checked against what the payload actually consumes.

use std::io::Cursor;

use byteorder::{BigEndian, LittleEndian, ReadBytesExt};

use super::shape::{MultiPointShape, Point, PolyShape, Record, Shape, ShapeType};
use crate::bounding_box::BoundingBox;
use crate::error::{StoreError, StoreResult};

/// Decodes one geometry record from its byte image.
///
/// Running past the end of `bytes` yields `Truncated`. Shape types other
/// than the four 2D ones yield `UnsupportedShapeType` and unknown type
/// codes yield `DecodeFailure`; neither aborts iteration over other
/// records, since every record decodes from its own buffer.
pub fn decode_record(bytes: &[u8]) -> StoreResult<Record> {
    let mut cursor = Cursor::new(bytes);

    let record_number = cursor.read_i32::<BigEndian>()?;
    let content_words = cursor.read_i32::<BigEndian>()?;
    let record_number = u32::try_from(record_number).map_err(|_| {
        StoreError::DecodeFailure(format!("negative record number: {}", record_number))
    })?;

    let shape_type = ShapeType::from_code(cursor.read_i32::<LittleEndian>()?)?;
    let shape = match shape_type {
        ShapeType::Point => Shape::Point(decode_point(&mut cursor)?),
        ShapeType::PolyLine => Shape::PolyLine(decode_poly_shape(&mut cursor)?),
        ShapeType::Polygon => Shape::Polygon(decode_poly_shape(&mut cursor)?),
        ShapeType::MultiPoint => Shape::MultiPoint(decode_multi_point(&mut cursor)?),
        unsupported => return Err(StoreError::UnsupportedShapeType(unsupported)),
    };

    Ok(Record {
        record_number,
        content_words,
        shape,
    })
}

fn decode_point(cursor: &mut Cursor<&[u8]>) -> StoreResult<Point> {
    let x = cursor.read_f64::<LittleEndian>()?;
    let y = cursor.read_f64::<LittleEndian>()?;
    Ok(Point::new(x, y))
}

fn decode_bbox(cursor: &mut Cursor<&[u8]>) -> StoreResult<BoundingBox> {
    let min_x = cursor.read_f64::<LittleEndian>()?;
    let min_y = cursor.read_f64::<LittleEndian>()?;
    let max_x = cursor.read_f64::<LittleEndian>()?;
    let max_y = cursor.read_f64::<LittleEndian>()?;
    Ok(BoundingBox::new(min_x, min_y, max_x, max_y))
}

fn decode_count(cursor: &mut Cursor<&[u8]>, what: &str) -> StoreResult<usize> {
    let count = cursor.read_i32::<LittleEndian>()?;
    if count < 0 {
        return Err(StoreError::DecodeFailure(format!(
            "negative {} count: {}",
            what, count
        )));
    }
    Ok(count as usize)
}

fn decode_poly_shape(cursor: &mut Cursor<&[u8]>) -> StoreResult<PolyShape> {
    let bbox = decode_bbox(cursor)?;
    let part_count = decode_count(cursor, "part")?;
    let point_count = decode_count(cursor, "point")?;

    let mut parts = Vec::with_capacity(part_count);
    for _ in 0..part_count {
        parts.push(cursor.read_i32::<LittleEndian>()?);
    }

    let mut points = Vec::with_capacity(point_count);
    for _ in 0..point_count {
        points.push(decode_point(cursor)?);
    }

    Ok(PolyShape {
        bbox,
        parts,
        points,
    })
}

fn decode_multi_point(cursor: &mut Cursor<&[u8]>) -> StoreResult<MultiPointShape> {
    let bbox = decode_bbox(cursor)?;
    let point_count = decode_count(cursor, "point")?;

    let mut points = Vec::with_capacity(point_count);
    for _ in 0..point_count {
        points.push(decode_point(cursor)?);
    }

    Ok(MultiPointShape { bbox, points })
}

#[cfg(test)]
mod tests {
    use super::*;
    use byteorder::WriteBytesExt;

    fn encode_record_header(bytes: &mut Vec<u8>, record_number: i32, content_words: i32) {
        bytes.write_i32::<BigEndian>(record_number).unwrap();
        bytes.write_i32::<BigEndian>(content_words).unwrap();
    }

    fn point_record(record_number: i32, x: f64, y: f64) -> Vec<u8> {
        let mut bytes = Vec::new();
        encode_record_header(&mut bytes, record_number, 10);
        bytes.write_i32::<LittleEndian>(1).unwrap();
        bytes.write_f64::<LittleEndian>(x).unwrap();
        bytes.write_f64::<LittleEndian>(y).unwrap();
        bytes
    }

    fn poly_record(
        record_number: i32,
        shape_code: i32,
        parts: &[i32],
        points: &[(f64, f64)],
    ) -> Vec<u8> {
        let mut bytes = Vec::new();
        let content_words = (4 + 32 + 8 + 4 * parts.len() + 16 * points.len()) as i32 / 2;
        encode_record_header(&mut bytes, record_number, content_words);
        bytes.write_i32::<LittleEndian>(shape_code).unwrap();
        let min_x = points.iter().map(|p| p.0).fold(f64::INFINITY, f64::min);
        let min_y = points.iter().map(|p| p.1).fold(f64::INFINITY, f64::min);
        let max_x = points.iter().map(|p| p.0).fold(f64::NEG_INFINITY, f64::max);
        let max_y = points.iter().map(|p| p.1).fold(f64::NEG_INFINITY, f64::max);
        for extent in [min_x, min_y, max_x, max_y] {
            bytes.write_f64::<LittleEndian>(extent).unwrap();
        }
        bytes.write_i32::<LittleEndian>(parts.len() as i32).unwrap();
        bytes.write_i32::<LittleEndian>(points.len() as i32).unwrap();
        for part in parts {
            bytes.write_i32::<LittleEndian>(*part).unwrap();
        }
        for (x, y) in points {
            bytes.write_f64::<LittleEndian>(*x).unwrap();
            bytes.write_f64::<LittleEndian>(*y).unwrap();
        }
        bytes
    }

    #[test]
    fn test_decode_point_record() {
        let bytes = point_record(1, 3.5, -7.25);
        let record = decode_record(&bytes).unwrap();

        assert_eq!(record.record_number, 1);
        assert_eq!(record.content_words, 10);
        assert_eq!(record.shape, Shape::Point(Point::new(3.5, -7.25)));
    }

    #[test]
    fn test_decode_polygon_record() {
        let bytes = poly_record(
            2,
            5,
            &[0],
            &[(0.0, 0.0), (0.0, 10.0), (10.0, 10.0), (10.0, 0.0), (0.0, 0.0)],
        );
        let record = decode_record(&bytes).unwrap();

        let Shape::Polygon(poly) = &record.shape else {
            panic!("expected polygon");
        };
        assert_eq!(poly.parts, vec![0]);
        assert_eq!(poly.points.len(), 5);
        assert_eq!(poly.bbox, BoundingBox::new(0.0, 0.0, 10.0, 10.0));
    }

    #[test]
    fn test_decode_polyline_record() {
        let bytes = poly_record(3, 3, &[0, 2], &[(0.0, 0.0), (1.0, 1.0), (5.0, 5.0), (6.0, 7.0)]);
        let record = decode_record(&bytes).unwrap();

        let Shape::PolyLine(line) = &record.shape else {
            panic!("expected polyline");
        };
        assert_eq!(line.parts, vec![0, 2]);
        assert_eq!(line.points.len(), 4);
    }

    #[test]
    fn test_decode_multipoint_record() {
        let mut bytes = Vec::new();
        encode_record_header(&mut bytes, 4, 28);
        bytes.write_i32::<LittleEndian>(8).unwrap();
        for extent in [1.0, 2.0, 3.0, 4.0] {
            bytes.write_f64::<LittleEndian>(extent).unwrap();
        }
        bytes.write_i32::<LittleEndian>(2).unwrap();
        for (x, y) in [(1.0, 2.0), (3.0, 4.0)] {
            bytes.write_f64::<LittleEndian>(x).unwrap();
            bytes.write_f64::<LittleEndian>(y).unwrap();
        }

        let record = decode_record(&bytes).unwrap();
        let Shape::MultiPoint(multi) = &record.shape else {
            panic!("expected multipoint");
        };
        assert_eq!(multi.points, vec![Point::new(1.0, 2.0), Point::new(3.0, 4.0)]);
    }

    #[test]
    fn test_multipatch_is_unsupported() {
        let mut bytes = Vec::new();
        encode_record_header(&mut bytes, 5, 2);
        bytes.write_i32::<LittleEndian>(31).unwrap();

        let result = decode_record(&bytes);
        assert!(matches!(
            result,
            Err(StoreError::UnsupportedShapeType(ShapeType::MultiPatch))
        ));
    }

    #[test]
    fn test_null_shape_is_unsupported() {
        let mut bytes = Vec::new();
        encode_record_header(&mut bytes, 6, 2);
        bytes.write_i32::<LittleEndian>(0).unwrap();

        let result = decode_record(&bytes);
        assert!(matches!(
            result,
            Err(StoreError::UnsupportedShapeType(ShapeType::NullShape))
        ));
    }

    #[test]
    fn test_unknown_type_code_is_decode_failure() {
        let mut bytes = Vec::new();
        encode_record_header(&mut bytes, 7, 2);
        bytes.write_i32::<LittleEndian>(99).unwrap();

        let result = decode_record(&bytes);
        assert!(matches!(result, Err(StoreError::DecodeFailure(_))));
    }

    #[test]
    fn test_truncated_payload() {
        let bytes = point_record(1, 3.5, -7.25);
        let result = decode_record(&bytes[..bytes.len() - 4]);
        assert!(matches!(result, Err(StoreError::Truncated)));
    }

    #[test]
    fn test_negative_point_count_is_decode_failure() {
        let mut bytes = Vec::new();
        encode_record_header(&mut bytes, 8, 26);
        bytes.write_i32::<LittleEndian>(8).unwrap();
        for extent in [0.0, 0.0, 1.0, 1.0] {
            bytes.write_f64::<LittleEndian>(extent).unwrap();
        }
        bytes.write_i32::<LittleEndian>(-3).unwrap();

        let result = decode_record(&bytes);
        assert!(matches!(result, Err(StoreError::DecodeFailure(_))));
    }
}
