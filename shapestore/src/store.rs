//! The spatial store facade.
//!
//! `ShapeStore` composes the pieces: it opens the geometry file, builds
//! the offset table and the quadtree, and answers point queries by
//! filtering the quadtree's candidate set through each record's exact
//! containment test. Records are decoded lazily through the bounded cache.
//!
//! Everything except the cache and the seekable file handle is immutable
//! after `open`; construction is atomic, so a failed open never yields a
//! partially usable store.

use std::fs::{self, File};
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;

use crate::bounding_box::BoundingBox;
use crate::error::{StoreError, StoreResult};
use crate::offset_index::OffsetTable;
use crate::record_cache::RecordCache;
use crate::shapefile::codec::decode_record;
use crate::shapefile::constants::{DEFAULT_CACHE_CAPACITY, FILE_HEADER_LEN, RECORD_HEADER_LEN};
use crate::shapefile::{Record, ShapeHeader, ShapeType};
use crate::spatial_index::{RecordId, SpatialIndex};
use crate::tabular::{TabularReader, Value};

/// Snapshot of a store's cache and decode counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreStats {
    pub cache_hits: u64,
    pub cache_misses: u64,
    pub records_decoded: u64,
}

struct StoreCounters {
    cache_hits: AtomicU64,
    cache_misses: AtomicU64,
    records_decoded: AtomicU64,
}

impl StoreCounters {
    fn new() -> Self {
        Self {
            cache_hits: AtomicU64::new(0),
            cache_misses: AtomicU64::new(0),
            records_decoded: AtomicU64::new(0),
        }
    }
}

/// A read-only spatial store over one geometry file and its sidecar
/// indexes.
pub struct ShapeStore {
    geometry_file: RwLock<File>,
    header: ShapeHeader,
    offsets: OffsetTable,
    spatial_index: SpatialIndex,
    cache: RwLock<RecordCache>,
    tabular: Option<Box<dyn TabularReader>>,
    counters: StoreCounters,
}

/// The base path names the file set; each component appends its own
/// extension, so `open("data/counties")` reads `data/counties.shp`,
/// `data/counties.shx`, and `data/counties.qix`.
fn sibling(base: &Path, extension: &str) -> PathBuf {
    let mut name = base.as_os_str().to_os_string();
    name.push(extension);
    PathBuf::from(name)
}

impl ShapeStore {
    /// Opens the geometry file, offset index, and spatial index under the
    /// given base path. The store answers geometry queries only; attribute
    /// queries need `open_with_tabular`.
    pub fn open(base_path: impl AsRef<Path>) -> StoreResult<Self> {
        Self::open_inner(base_path.as_ref(), None, DEFAULT_CACHE_CAPACITY)
    }

    /// Opens a store joined to an external attribute-table reader.
    pub fn open_with_tabular(
        base_path: impl AsRef<Path>,
        tabular: Box<dyn TabularReader>,
    ) -> StoreResult<Self> {
        Self::open_inner(base_path.as_ref(), Some(tabular), DEFAULT_CACHE_CAPACITY)
    }

    /// Opens a store with a custom record cache capacity.
    pub fn open_with_cache_capacity(
        base_path: impl AsRef<Path>,
        capacity: usize,
    ) -> StoreResult<Self> {
        Self::open_inner(base_path.as_ref(), None, capacity)
    }

    fn open_inner(
        base_path: &Path,
        tabular: Option<Box<dyn TabularReader>>,
        capacity: usize,
    ) -> StoreResult<Self> {
        log::debug!("opening shape store at {:?}", base_path);

        let mut geometry_file = File::open(sibling(base_path, ".shp"))?;
        let mut header_bytes = [0u8; FILE_HEADER_LEN];
        geometry_file.read_exact(&mut header_bytes)?;
        let header = ShapeHeader::decode(&header_bytes)?;

        let offsets = OffsetTable::from_bytes(&fs::read(sibling(base_path, ".shx"))?)?;
        let spatial_index = SpatialIndex::from_bytes(&fs::read(sibling(base_path, ".qix"))?)?;

        log::debug!(
            "opened shape store: {} records, spatial index depth {}",
            offsets.len(),
            spatial_index.max_depth()
        );

        Ok(Self {
            geometry_file: RwLock::new(geometry_file),
            header,
            offsets,
            spatial_index,
            cache: RwLock::new(RecordCache::new(capacity)),
            tabular,
            counters: StoreCounters::new(),
        })
    }

    /// Resolves one record through the cache, decoding it on a miss.
    ///
    /// A record that fails to decode is reported to this caller and
    /// cached for nobody; the failure does not taint other records.
    pub fn record(&self, record_number: RecordId) -> StoreResult<Arc<Record>> {
        if let Some(record) = self.cache.read().get(record_number) {
            self.counters.cache_hits.fetch_add(1, Ordering::Relaxed);
            return Ok(record);
        }
        self.counters.cache_misses.fetch_add(1, Ordering::Relaxed);

        let entry = self.offsets.entry(record_number)?;
        let mut buffer = vec![0u8; RECORD_HEADER_LEN + entry.byte_length as usize];
        {
            let mut file = self.geometry_file.write();
            file.seek(SeekFrom::Start(entry.byte_offset))?;
            file.read_exact(&mut buffer)?;
        }

        let record = Arc::new(decode_record(&buffer)?);
        self.counters.records_decoded.fetch_add(1, Ordering::Relaxed);
        self.cache.write().insert(record_number, record.clone());
        Ok(record)
    }

    /// Records whose shape contains the query point.
    ///
    /// The quadtree provides the candidate set; each candidate is resolved
    /// through the cache and kept only if its exact containment test
    /// accepts the point. Results follow the index's traversal order.
    pub fn records_at(&self, x: f64, y: f64) -> StoreResult<Vec<Arc<Record>>> {
        let candidates = self.spatial_index.records_at_point(x, y);
        let mut matches = Vec::new();
        for record_number in candidates {
            let record = self.record(record_number)?;
            if record.shape.contains(x, y) {
                matches.push(record);
            }
        }
        Ok(matches)
    }

    /// Attribute values of the records containing the query point, in the
    /// same order `records_at` returns them.
    pub fn field_values_at(&self, x: f64, y: f64, field_name: &str) -> StoreResult<Vec<Value>> {
        let tabular = self.tabular.as_deref().ok_or(StoreError::NoTabularSource)?;
        self.records_at(x, y)?
            .iter()
            .map(|record| tabular.field_value(record.record_number, field_name))
            .collect()
    }

    /// Attribute value of one record.
    pub fn field_value(&self, record_number: RecordId, field_name: &str) -> StoreResult<Value> {
        let tabular = self.tabular.as_deref().ok_or(StoreError::NoTabularSource)?;
        tabular.field_value(record_number, field_name)
    }

    /// Number of records the offset index covers.
    pub fn record_count(&self) -> usize {
        self.offsets.len()
    }

    /// X/Y extents declared by the geometry file header.
    pub fn bounds(&self) -> BoundingBox {
        self.header.bbox
    }

    /// Z extent (min, max) declared by the geometry file header.
    pub fn z_bounds(&self) -> (f64, f64) {
        self.header.z_range
    }

    /// Measure extent (min, max) declared by the geometry file header.
    pub fn m_bounds(&self) -> (f64, f64) {
        self.header.m_range
    }

    /// Total geometry file length in 16-bit words, from the header.
    pub fn file_length_words(&self) -> i32 {
        self.header.file_length_words
    }

    /// Geometry file format version.
    pub fn version(&self) -> i32 {
        self.header.version
    }

    /// Dominant shape type declared for the file.
    pub fn shape_type(&self) -> ShapeType {
        self.header.shape_type
    }

    /// Cache and decode counters since the store was opened.
    pub fn stats(&self) -> StoreStats {
        StoreStats {
            cache_hits: self.counters.cache_hits.load(Ordering::Relaxed),
            cache_misses: self.counters.cache_misses.load(Ordering::Relaxed),
            records_decoded: self.counters.records_decoded.load(Ordering::Relaxed),
        }
    }
}
