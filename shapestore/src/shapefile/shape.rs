//! Shape types decoded from geometry records.
//!
//! The on-disk format enumerates fourteen shape types. Only the four 2D
//! types (point, polyline, polygon, multipoint) are decodable; the Z/M
//! variants, multipatch, and the null shape are recognized but rejected
//! with an unsupported-shape-type error at decode time.

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};

use crate::bounding_box::BoundingBox;
use crate::error::{StoreError, StoreResult};

/// The closed set of shape type codes the format defines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShapeType {
    NullShape,
    Point,
    PolyLine,
    Polygon,
    MultiPoint,
    PointZ,
    PolyLineZ,
    PolygonZ,
    MultiPointZ,
    PointM,
    PolyLineM,
    PolygonM,
    MultiPointM,
    MultiPatch,
}

impl ShapeType {
    /// Maps an on-disk type code to a shape type. Codes outside the
    /// fourteen defined values are a hard decode error, never a default.
    pub fn from_code(code: i32) -> StoreResult<Self> {
        match code {
            0 => Ok(ShapeType::NullShape),
            1 => Ok(ShapeType::Point),
            3 => Ok(ShapeType::PolyLine),
            5 => Ok(ShapeType::Polygon),
            8 => Ok(ShapeType::MultiPoint),
            11 => Ok(ShapeType::PointZ),
            13 => Ok(ShapeType::PolyLineZ),
            15 => Ok(ShapeType::PolygonZ),
            18 => Ok(ShapeType::MultiPointZ),
            21 => Ok(ShapeType::PointM),
            23 => Ok(ShapeType::PolyLineM),
            25 => Ok(ShapeType::PolygonM),
            28 => Ok(ShapeType::MultiPointM),
            31 => Ok(ShapeType::MultiPatch),
            other => Err(StoreError::DecodeFailure(format!(
                "bad shape type code: {}",
                other
            ))),
        }
    }

    /// The on-disk integer code for this shape type.
    pub fn code(&self) -> i32 {
        match self {
            ShapeType::NullShape => 0,
            ShapeType::Point => 1,
            ShapeType::PolyLine => 3,
            ShapeType::Polygon => 5,
            ShapeType::MultiPoint => 8,
            ShapeType::PointZ => 11,
            ShapeType::PolyLineZ => 13,
            ShapeType::PolygonZ => 15,
            ShapeType::MultiPointZ => 18,
            ShapeType::PointM => 21,
            ShapeType::PolyLineM => 23,
            ShapeType::PolygonM => 25,
            ShapeType::MultiPointM => 28,
            ShapeType::MultiPatch => 31,
        }
    }
}

impl Display for ShapeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} ({})", self, self.code())
    }
}

/// A 2D point (x, y).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// A multi-part shape: a bounding box, an ordered point sequence, and the
/// part-start indices partitioning the points into rings or branches.
/// PolyLine and Polygon share this exact layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolyShape {
    pub bbox: BoundingBox,
    /// Index into `points` where each part starts, as stored on disk.
    pub parts: Vec<i32>,
    pub points: Vec<Point>,
}

/// A bounding box plus an unordered collection of member points. Unlike
/// `PolyShape` there is no part array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultiPointShape {
    pub bbox: BoundingBox,
    pub points: Vec<Point>,
}

/// One decoded geometric record payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Shape {
    Point(Point),
    PolyLine(PolyShape),
    Polygon(PolyShape),
    MultiPoint(MultiPointShape),
}

impl Shape {
    pub fn shape_type(&self) -> ShapeType {
        match self {
            Shape::Point(_) => ShapeType::Point,
            Shape::PolyLine(_) => ShapeType::PolyLine,
            Shape::Polygon(_) => ShapeType::Polygon,
            Shape::MultiPoint(_) => ShapeType::MultiPoint,
        }
    }
}

/// A decoded record: its 1-based record number, the content length the
/// record header declared (in 16-bit words), and the shape. Identity is
/// the record number; a record is immutable once decoded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub record_number: u32,
    pub content_words: i32,
    pub shape: Shape,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_code_known_types() {
        assert_eq!(ShapeType::from_code(0).unwrap(), ShapeType::NullShape);
        assert_eq!(ShapeType::from_code(1).unwrap(), ShapeType::Point);
        assert_eq!(ShapeType::from_code(3).unwrap(), ShapeType::PolyLine);
        assert_eq!(ShapeType::from_code(5).unwrap(), ShapeType::Polygon);
        assert_eq!(ShapeType::from_code(8).unwrap(), ShapeType::MultiPoint);
        assert_eq!(ShapeType::from_code(31).unwrap(), ShapeType::MultiPatch);
    }

    #[test]
    fn test_from_code_round_trips_all_codes() {
        for code in [0, 1, 3, 5, 8, 11, 13, 15, 18, 21, 23, 25, 28, 31] {
            let shape_type = ShapeType::from_code(code).unwrap();
            assert_eq!(shape_type.code(), code);
        }
    }

    #[test]
    fn test_from_code_unknown_is_error() {
        for code in [-1, 2, 4, 6, 7, 9, 10, 14, 30, 32, 1000] {
            let result = ShapeType::from_code(code);
            assert!(
                matches!(result, Err(StoreError::DecodeFailure(_))),
                "code {} should not decode",
                code
            );
        }
    }

    #[test]
    fn test_shape_type_of_variants() {
        let point = Shape::Point(Point::new(1.0, 2.0));
        assert_eq!(point.shape_type(), ShapeType::Point);

        let poly = Shape::Polygon(PolyShape {
            bbox: BoundingBox::new(0.0, 0.0, 1.0, 1.0),
            parts: vec![0],
            points: vec![Point::new(0.0, 0.0)],
        });
        assert_eq!(poly.shape_type(), ShapeType::Polygon);
    }

    #[test]
    fn test_record_equality_is_field_for_field() {
        let make = || Record {
            record_number: 7,
            content_words: 10,
            shape: Shape::Point(Point::new(3.0, 4.0)),
        };
        assert_eq!(make(), make());

        let mut other = make();
        other.record_number = 8;
        assert_ne!(make(), other);
    }
}
