//! Adaptation layer between a database's index access methods and the
//! embedded HNSW graph engine.
//!
//! The engine knows nothing about row identity, SQL-level numeric types,
//! backend memory ceilings, or extension versioning. This crate owns those
//! contracts:
//!
//! - [`options`]: translate persisted index options into engine
//!   [`InitOptions`](kombu_ann::InitOptions)
//! - [`normalize`]: coerce caller-supplied arrays into canonical `f32` form
//! - [`label`]: embed 6-byte row identifiers into 64-bit engine labels
//! - [`memory`]: warn before a bulk build outgrows the configured ceiling
//! - [`version`]: gate index interaction on binary/schema version agreement
//!
//! # Architecture
//!
//! ```text
//! access-method callbacks (build / insert / scan)
//!      │ VersionGate::check_compatible    -- refuse risky work on mismatch
//!      │ build_init_options               -- engine configuration
//!      │ normalize                        -- canonical f32 input
//!      │ RowId::to_label                  -- row identity -> node label
//!      │ check_budget                     -- advisory OOM warning
//!      ▼
//! embedded ANN engine (kombu-ann ABI)
//! ```
//!
//! Everything here runs synchronously inside one backend's request context;
//! there is no internal threading or async suspension. The only I/O is the
//! catalog lookup behind [`ExtensionCatalog`].
//!
//! # Example
//!
//! ```
//! use kombu_bridge::{build_init_options, normalize, IndexOptions, RowId, SourceArray};
//!
//! let opts = IndexOptions::new(4);
//! let init = build_init_options(&opts);
//! assert_eq!(init.connectivity, 16);
//!
//! let values = [1, 2, 3, 4];
//! let vector = normalize(SourceArray::Int4(&values)).unwrap();
//! assert_eq!(vector.as_ref(), &[1.0, 2.0, 3.0, 4.0]);
//!
//! let label = RowId::new(7, 2).to_label();
//! assert_eq!(RowId::from_label(label), RowId::new(7, 2));
//! ```

pub mod label;
pub mod memory;
pub mod normalize;
pub mod options;
pub mod version;

pub use label::RowId;
pub use memory::{
    check_budget, estimate, expected_node_levels, HostMemory, MemoryEstimate, NoopMemory,
    ProcessMemory,
};
pub use normalize::{normalize, ElementType, SourceArray, VectorBuffer};
pub use options::{build_init_options, log_init_options, IndexOptions};
pub use version::{CatalogError, ExtensionCatalog, SnapshotState, VersionGate};

use kombu_ann::Label;

/// Error type for bridge operations.
///
/// Every variant is fatal to the in-progress index operation. Version
/// mismatches and memory-budget overruns are not errors; they are reported
/// through `tracing` and the operation continues.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("unsupported array element type: {0}")]
    UnsupportedElementType(ElementType),

    #[error("label {0:#018x} has non-zero high bytes, not a row identifier")]
    LabelOutOfRange(Label),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error("version query returned {0} rows, expected exactly one")]
    VersionRowCount(usize),

    #[error("version query returned null")]
    NullVersion,
}

/// Result type for bridge operations.
pub type Result<T> = std::result::Result<T, Error>;
