//! Vendor-neutral ABI for the embedded ANN graph engine.
//!
//! The adaptation layer in `kombu-bridge` depends only on the types and
//! traits defined here; the engine itself (node insertion, layer search,
//! pruning, persistence) lives elsewhere and links against the same
//! definitions. This keeps the bridge testable without a running engine and
//! keeps engine internals out of the database-facing code.
//!
//! # Architecture
//!
//! ```text
//! kombu-bridge (options, labels, normalization, gating)
//!      │ depends on
//!      ▼
//! kombu-ann (InitOptions, GraphMetadata, GraphIndex)   <-- this crate
//!      ▲ implemented by
//!      │
//! embedded HNSW engine
//! ```

use serde::{Deserialize, Serialize};

/// Engine node label: the compact 64-bit tag attached to every graph node.
///
/// Distinct from a database row identifier; `kombu-bridge` owns the mapping
/// between the two.
pub type Label = u64;

/// Scalar storage format for vector components.
///
/// The engine supports several; the adaptation layer only ever selects
/// [`ScalarKind::F32`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScalarKind {
    F32,
    F64,
    F16,
    I8,
}

/// Distance metric selected at index initialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MetricKind {
    /// Squared Euclidean (L2) distance.
    L2Squared,
    /// Cosine distance.
    Cosine,
    /// Negative inner product.
    InnerProduct,
}

/// A caller-supplied distance function, overriding built-in dispatch.
pub type MetricFn = fn(&[f32], &[f32]) -> f32;

/// Engine initialization structure.
///
/// Built once per operation from persisted index options and handed to the
/// engine when a graph is created or reopened.
#[derive(Debug, Clone)]
pub struct InitOptions {
    /// Vector dimensionality.
    pub dimensions: usize,
    /// Max edges per node per layer (M).
    pub connectivity: usize,
    /// Candidate-list size during graph construction.
    pub expansion_add: usize,
    /// Candidate-list size during query traversal.
    pub expansion_search: usize,
    /// Distance metric kind.
    pub metric: MetricKind,
    /// Custom distance function; `None` selects the engine's built-in
    /// dispatch for `metric`.
    pub metric_override: Option<MetricFn>,
    /// Component storage format.
    pub quantization: ScalarKind,
}

/// Runtime metadata reported by a live graph index.
///
/// Mirrors the configuration the graph was created with, plus the neighbor
/// block sizes the engine derived from it. Feeds per-node sizing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphMetadata {
    /// Vector dimensionality.
    pub dimensions: usize,
    /// Max edges per node per layer (M).
    pub connectivity: usize,
    /// Candidate-list size during graph construction.
    pub expansion_add: usize,
    /// Candidate-list size during query traversal.
    pub expansion_search: usize,
    /// Bytes of the base neighbor block every node carries.
    pub neighbors_base_bytes: usize,
    /// Bytes of the neighbor block added per upper level.
    pub neighbors_bytes_per_level: usize,
}

/// Fixed per-node head: 8-byte label, 4-byte dimension count, 8-byte level.
const NODE_HEAD_BYTES: usize = 8 + 4 + 8;

/// Size in bytes of one graph node.
///
/// A node is stored as a tape: head, base neighbor block, one neighbor
/// block per upper level spanned, then the vector payload.
pub fn node_bytes(meta: &GraphMetadata, vector_bytes: usize, levels: usize) -> usize {
    NODE_HEAD_BYTES
        + meta.neighbors_base_bytes
        + meta.neighbors_bytes_per_level * levels
        + vector_bytes
}

/// What the adaptation layer needs from a live engine handle.
///
/// Deliberately narrow: the bridge reads metadata and occupancy, nothing
/// else. Search and mutation stay behind the access-method layer.
pub trait GraphIndex {
    /// Runtime metadata for this graph.
    fn metadata(&self) -> GraphMetadata;

    /// Number of nodes currently in the graph.
    fn len(&self) -> usize;

    /// Whether the graph holds no nodes.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
