//! The quadtree spatial index.
//!
//! The index file holds a recursive tree of bounding boxes. Each node
//! claims a list of record numbers and owns its child nodes outright, so
//! the decoded structure is a strict tree with no sharing and no
//! back-pointers; queries only ever descend. Every multi-byte field is
//! decoded big-endian, header and node payload alike, matching a
//! stream-order reader that never byte-swaps.
//!
//! Node descent uses strict inequalities on all four bounds. A point lying
//! exactly on a splitting boundary between sibling nodes can be claimed by
//! neither; that is a property of the format's containment rule, not
//! something this module corrects.

use std::io::{Cursor, Read};

use byteorder::{BigEndian, ReadBytesExt};

use crate::bounding_box::BoundingBox;
use crate::error::{StoreError, StoreResult};
use crate::shapefile::constants::{QUADTREE_SIGNATURE, QUADTREE_VERSION};

/// A 1-based record number.
pub type RecordId = u32;

/// Counters describing one index query, for diagnostics and tests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueryTrace {
    /// Nodes whose containment test ran, including nodes that rejected
    /// the point. A pruned subtree contributes nothing here.
    pub nodes_visited: usize,
}

/// One node of the quadtree: a bounding box, the record numbers the node
/// claims directly, and its children.
#[derive(Debug, Clone, PartialEq)]
pub struct TreeNode {
    bbox: BoundingBox,
    record_ids: Vec<RecordId>,
    children: Vec<TreeNode>,
}

impl TreeNode {
    fn decode(cursor: &mut Cursor<&[u8]>) -> StoreResult<Self> {
        // Leading offset field is a historical artifact, never used for
        // navigation.
        let _offset = cursor.read_i32::<BigEndian>()?;

        let min_x = cursor.read_f64::<BigEndian>()?;
        let min_y = cursor.read_f64::<BigEndian>()?;
        let max_x = cursor.read_f64::<BigEndian>()?;
        let max_y = cursor.read_f64::<BigEndian>()?;

        let record_count = cursor.read_i32::<BigEndian>()?;
        if record_count < 0 {
            return Err(StoreError::DecodeFailure(format!(
                "negative record count in spatial index node: {}",
                record_count
            )));
        }
        let mut record_ids = Vec::with_capacity(record_count as usize);
        for _ in 0..record_count {
            // Stored 0-based on disk, held 1-based in memory.
            let raw = cursor.read_i32::<BigEndian>()?;
            let id = raw
                .checked_add(1)
                .and_then(|v| u32::try_from(v).ok())
                .ok_or_else(|| {
                    StoreError::DecodeFailure(format!(
                        "bad record id in spatial index node: {}",
                        raw
                    ))
                })?;
            record_ids.push(id);
        }

        let child_count = cursor.read_i32::<BigEndian>()?;
        if child_count < 0 {
            return Err(StoreError::DecodeFailure(format!(
                "negative child count in spatial index node: {}",
                child_count
            )));
        }
        let mut children = Vec::with_capacity(child_count as usize);
        for _ in 0..child_count {
            children.push(TreeNode::decode(cursor)?);
        }

        Ok(Self {
            bbox: BoundingBox::new(min_x, min_y, max_x, max_y),
            record_ids,
            children,
        })
    }

    fn collect_records(&self, x: f64, y: f64, out: &mut Vec<RecordId>, trace: &mut QueryTrace) {
        trace.nodes_visited += 1;
        if !self.bbox.contains_point_exclusive(x, y) {
            // Children are sub-regions of this box, so the whole subtree
            // is pruned.
            return;
        }
        out.extend_from_slice(&self.record_ids);
        for child in &self.children {
            child.collect_records(x, y, out, trace);
        }
    }
}

/// The decoded quadtree.
#[derive(Debug, Clone, PartialEq)]
pub struct SpatialIndex {
    total_records: i32,
    max_depth: i32,
    root: TreeNode,
}

impl SpatialIndex {
    /// Decodes a quadtree index from the full file contents.
    pub fn from_bytes(bytes: &[u8]) -> StoreResult<Self> {
        let mut cursor = Cursor::new(bytes);

        let mut signature = [0u8; 3];
        cursor.read_exact(&mut signature)?;
        if &signature != QUADTREE_SIGNATURE {
            return Err(StoreError::FormatMismatch(format!(
                "bad spatial index signature: {:?}",
                signature
            )));
        }

        // The endianness flag is recorded by writers but plays no role in
        // decoding; everything is read big-endian.
        let _endianness = cursor.read_u8()?;

        let version = cursor.read_u8()?;
        if version != QUADTREE_VERSION {
            return Err(StoreError::FormatMismatch(format!(
                "wrong spatial index version: {}",
                version
            )));
        }

        let mut reserved = [0u8; 3];
        cursor.read_exact(&mut reserved)?;

        let total_records = cursor.read_i32::<BigEndian>()?;
        let max_depth = cursor.read_i32::<BigEndian>()?;
        let root = TreeNode::decode(&mut cursor)?;

        Ok(Self {
            total_records,
            max_depth,
            root,
        })
    }

    /// Record count the index header declares. Diagnostic only; the tree
    /// is not validated against it.
    pub fn total_records(&self) -> i32 {
        self.total_records
    }

    /// Maximum depth the index header declares. Diagnostic only.
    pub fn max_depth(&self) -> i32 {
        self.max_depth
    }

    /// Candidate record numbers for a query point, in depth-first
    /// traversal order. Sibling regions can overlap, so duplicates are
    /// possible and preserved; exact containment filtering happens in the
    /// layer above.
    pub fn records_at_point(&self, x: f64, y: f64) -> Vec<RecordId> {
        self.records_at_point_traced(x, y).0
    }

    /// Like `records_at_point`, also returning traversal counters.
    pub fn records_at_point_traced(&self, x: f64, y: f64) -> (Vec<RecordId>, QueryTrace) {
        let mut out = Vec::new();
        let mut trace = QueryTrace::default();
        self.root.collect_records(x, y, &mut out, &mut trace);
        (out, trace)
    }
}
