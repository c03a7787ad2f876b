//! End-to-end flow of an index operation through the adaptation layer:
//! version gate, engine configuration, input normalization, label encoding,
//! and the advisory memory check, with warning emission observed through a
//! counting subscriber.

use kombu_ann::{GraphIndex, GraphMetadata, ScalarKind};
use kombu_bridge::{
    build_init_options, check_budget, log_init_options, normalize, CatalogError,
    ExtensionCatalog, IndexOptions, NoopMemory, RowId, SnapshotState, SourceArray, VersionGate,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::{span, Event, Level, Metadata};

/// Subscriber that counts WARN-level events and ignores everything else.
struct WarningCounter(Arc<AtomicUsize>);

impl tracing::Subscriber for WarningCounter {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        *metadata.level() == Level::WARN
    }
    fn new_span(&self, _: &span::Attributes<'_>) -> span::Id {
        span::Id::from_u64(1)
    }
    fn record(&self, _: &span::Id, _: &span::Record<'_>) {}
    fn record_follows_from(&self, _: &span::Id, _: &span::Id) {}
    fn event(&self, _: &Event<'_>) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
    fn enter(&self, _: &span::Id) {}
    fn exit(&self, _: &span::Id) {}
}

/// Run `f` under a counting subscriber and return how many warnings fired.
fn count_warnings(f: impl FnOnce()) -> usize {
    let count = Arc::new(AtomicUsize::new(0));
    tracing::subscriber::with_default(WarningCounter(count.clone()), f);
    count.load(Ordering::SeqCst)
}

struct StaticCatalog {
    version: String,
    calls: AtomicUsize,
}

impl StaticCatalog {
    fn returning(version: &str) -> Self {
        Self {
            version: version.to_string(),
            calls: AtomicUsize::new(0),
        }
    }
}

impl ExtensionCatalog for StaticCatalog {
    fn installed_version(&self) -> Result<Vec<Option<String>>, CatalogError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(vec![Some(self.version.clone())])
    }
}

struct FakeGraph {
    meta: GraphMetadata,
}

impl FakeGraph {
    fn new(dimensions: usize) -> Self {
        Self {
            meta: GraphMetadata {
                dimensions,
                connectivity: 16,
                expansion_add: 200,
                expansion_search: 100,
                neighbors_base_bytes: 64,
                neighbors_bytes_per_level: 32,
            },
        }
    }
}

impl GraphIndex for FakeGraph {
    fn metadata(&self) -> GraphMetadata {
        self.meta
    }
    fn len(&self) -> usize {
        0
    }
}

#[test]
fn test_build_flow_with_matching_versions() {
    let gate = VersionGate::new("0.2.0");
    let catalog = StaticCatalog::returning("0.2.0");
    let graph = FakeGraph::new(4);

    let warnings = count_warnings(|| {
        // Gate first; a matching install proceeds silently.
        assert!(gate
            .check_compatible(&catalog, SnapshotState::Active)
            .unwrap());

        // Engine configuration from persisted options, reported at INFO.
        let init = build_init_options(&IndexOptions::new(4));
        assert_eq!(init.quantization, ScalarKind::F32);
        log_init_options(&init);

        // Caller input arrives as int4; the engine sees f32.
        let values = [3, 1, 4, 1];
        let vector = normalize(SourceArray::Int4(&values)).unwrap();
        assert_eq!(vector.as_ref(), &[3.0, 1.0, 4.0, 1.0]);

        // Row identity becomes a 48-bit node label and back.
        let id = RowId::new(11, 7);
        assert_eq!(RowId::from_label(id.to_label()), id);

        // Generous ceiling: the budget check stays quiet.
        check_budget(1 << 20, Some(&graph), 100, "index build over budget", &NoopMemory);
    });

    assert_eq!(warnings, 0);
}

#[test]
fn test_version_mismatch_warns_exactly_once() {
    let gate = VersionGate::new("0.2.0");
    let catalog = StaticCatalog::returning("0.1.9");

    let warnings = count_warnings(|| {
        assert!(!gate
            .check_compatible(&catalog, SnapshotState::Active)
            .unwrap());
        // Cached verdict: no second query, no second warning.
        assert!(!gate
            .check_compatible(&catalog, SnapshotState::Active)
            .unwrap());
    });

    assert_eq!(warnings, 1);
    assert_eq!(catalog.calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_budget_overrun_warns_exactly_once() {
    let graph = FakeGraph::new(128);

    let warnings = count_warnings(|| {
        // 1 KiB ceiling against ~6 MiB of projected nodes.
        check_budget(1, Some(&graph), 10_000, "index build over budget", &NoopMemory);
    });

    assert_eq!(warnings, 1);
}

#[test]
fn test_budget_without_index_handle_uses_baseline_only() {
    let warnings = count_warnings(|| {
        // No handle: node size is zero, and NoopMemory reports no baseline,
        // so even a 0 KiB ceiling holds.
        check_budget(0, None, 1_000_000, "index build over budget", &NoopMemory);
    });

    assert_eq!(warnings, 0);
}

#[test]
fn test_parallel_worker_without_snapshot_passes() {
    let gate = VersionGate::new("0.2.0");
    let catalog = StaticCatalog::returning("0.1.9");

    let warnings = count_warnings(|| {
        // A worker without a snapshot is waved through without querying,
        // even though the installed version actually mismatches.
        assert!(gate
            .check_compatible(&catalog, SnapshotState::Unavailable)
            .unwrap());
    });

    assert_eq!(warnings, 0);
    assert_eq!(catalog.calls.load(Ordering::SeqCst), 0);
}
