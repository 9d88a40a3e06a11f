//! The geometry format: header, shape types, record codec, and the
//! point-in-shape containment tests.
//!
//! The geometry file is a 100-byte header followed by a stream of
//! variable-length records. Each record is located through the offset
//! index and decoded independently from its own byte buffer, so one
//! malformed record never blocks access to its neighbors.

pub mod codec;
pub mod constants;
pub mod contains;
pub mod header;
pub mod shape;

pub use codec::decode_record;
pub use header::ShapeHeader;
pub use shape::{MultiPointShape, Point, PolyShape, Record, Shape, ShapeType};
