//! # shapestore - point queries over shapefile geometry
//!
//! This crate answers one question about a shapefile data set: which
//! records contain a given point? It reads the geometry file, the
//! fixed-stride offset index, and the quadtree spatial index, and filters
//! the index's candidate records through each shape's exact containment
//! test. The full geometry file is never decoded up front.
//!
//! ## Features
//!
//! - **Lazy decoding**: records are decoded on first lookup, one record
//!   per read, through a bounded insertion-order cache
//! - **Quadtree pruning**: point queries descend only the index subtrees
//!   whose boxes contain the point
//! - **Typed shapes**: point, polyline, polygon, and multipoint records
//!   decode into a closed enum; the remaining format shape types surface
//!   an explicit unsupported-shape-type error
//! - **Delegated attributes**: the attribute table is read through the
//!   `TabularReader` trait, joined to query results by record number
//! - **Read-only**: the file set is opened once and never written
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use shapestore::ShapeStore;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // Opens counties.shp, counties.shx, and counties.qix.
//! let store = ShapeStore::open("data/counties")?;
//!
//! for record in store.records_at(-93.265, 44.977)? {
//!     println!("record {} contains the point", record.record_number);
//! }
//! # Ok(())
//! # }
//! ```

pub mod bounding_box;
pub mod error;
pub mod offset_index;
pub mod record_cache;
pub mod shapefile;
pub mod spatial_index;
pub mod store;
pub mod tabular;

pub use bounding_box::BoundingBox;
pub use error::{StoreError, StoreResult};
pub use offset_index::{OffsetEntry, OffsetTable};
pub use record_cache::RecordCache;
pub use shapefile::{
    decode_record, MultiPointShape, Point, PolyShape, Record, Shape, ShapeHeader, ShapeType,
};
pub use spatial_index::{QueryTrace, RecordId, SpatialIndex};
pub use store::{ShapeStore, StoreStats};
pub use tabular::{TabularReader, Value};
