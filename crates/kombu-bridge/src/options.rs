//! Persisted index options and their translation into engine configuration.

use kombu_ann::{InitOptions, MetricKind, ScalarKind};
use serde::{Deserialize, Serialize};

/// HNSW options persisted with an index definition.
///
/// Read fresh from index metadata for every operation, never cached across
/// calls. Range validation happens where the options are stored; this layer
/// trusts what it is handed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexOptions {
    /// Vector dimensionality.
    pub dimensions: usize,

    /// Max connections per node per layer (M parameter).
    /// Default: 16
    pub m: usize,

    /// Beam width during construction (ef_construction).
    /// Higher = better quality, slower build.
    /// Default: 200
    pub ef_construction: usize,

    /// Beam width during search (ef).
    /// Higher = better recall, slower search.
    /// Default: 100
    pub ef_search: usize,

    /// Distance metric.
    pub metric: MetricKind,
}

impl IndexOptions {
    /// Options for `dimensions`-wide vectors with default HNSW parameters.
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions,
            m: 16,
            ef_construction: 200,
            ef_search: 100,
            metric: MetricKind::L2Squared,
        }
    }
}

/// Translate persisted options into the engine initialization structure.
///
/// Pure mapping, never fails. The metric override stays unset so the engine
/// uses built-in dispatch for the configured kind, and quantization is
/// pinned to 32-bit float; this layer supports no other storage format.
pub fn build_init_options(opts: &IndexOptions) -> InitOptions {
    InitOptions {
        dimensions: opts.dimensions,
        connectivity: opts.m,
        expansion_add: opts.ef_construction,
        expansion_search: opts.ef_search,
        metric: opts.metric,
        metric_override: None,
        quantization: ScalarKind::F32,
    }
}

/// Report the engine configuration chosen for a build.
pub fn log_init_options(opts: &InitOptions) {
    tracing::info!(
        dimensions = opts.dimensions,
        connectivity = opts.connectivity,
        expansion_add = opts.expansion_add,
        expansion_search = opts.expansion_search,
        metric = ?opts.metric,
        quantization = ?opts.quantization,
        has_metric_override = opts.metric_override.is_some(),
        "engine init options"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let opts = IndexOptions::new(128);
        assert_eq!(opts.dimensions, 128);
        assert_eq!(opts.m, 16);
        assert_eq!(opts.ef_construction, 200);
        assert_eq!(opts.ef_search, 100);
        assert_eq!(opts.metric, MetricKind::L2Squared);
    }

    #[test]
    fn test_field_mapping() {
        let opts = IndexOptions {
            dimensions: 64,
            m: 24,
            ef_construction: 150,
            ef_search: 80,
            metric: MetricKind::Cosine,
        };

        let init = build_init_options(&opts);
        assert_eq!(init.dimensions, 64);
        assert_eq!(init.connectivity, 24);
        assert_eq!(init.expansion_add, 150);
        assert_eq!(init.expansion_search, 80);
        assert_eq!(init.metric, MetricKind::Cosine);
    }

    #[test]
    fn test_quantization_pinned_to_f32() {
        let init = build_init_options(&IndexOptions::new(8));
        assert_eq!(init.quantization, ScalarKind::F32);
        assert!(init.metric_override.is_none());
    }
}
