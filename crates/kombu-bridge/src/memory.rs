//! Advisory memory-budget estimation for bulk index builds.
//!
//! A bulk build inserts nodes far faster than an operator can react to a
//! runaway backend. Before each batch the access method asks this module
//! whether the projected graph growth would push the process past a
//! configured ceiling. The answer is a warning, never a refusal: the check
//! allocates nothing, blocks on nothing, and lets the build continue.

use kombu_ann::{node_bytes, GraphIndex};

/// Expected number of levels a newly inserted node spans.
///
/// HNSW assigns a new node to layer `floor(-ln(u) * mL)` with
/// `mL = 1/ln(M)`, giving an expected per-node level count of `mL + 1`.
/// The estimator only needs that expected value, rounded; the resulting
/// error is acceptable for a warning-grade signal. Clamped to at least one
/// level (the options layer guarantees `m >= 2` in practice).
pub fn expected_node_levels(connectivity: usize) -> usize {
    if connectivity <= 1 {
        return 1;
    }
    let m_l = 1.0 / (connectivity as f64).ln();
    (m_l + 1.0).round() as usize
}

/// Host memory accounting capability.
///
/// Reports bytes attributable to the calling backend process only, never
/// aggregated across processes.
pub trait ProcessMemory {
    fn allocated_bytes(&self) -> usize;
}

/// Memory accounting backed by the host platform.
///
/// On Linux this reads the resident set size from `/proc/self/status`. On
/// hosts without the facility it reports zero, and estimates reflect
/// projected growth only.
#[derive(Debug, Clone, Copy, Default)]
pub struct HostMemory;

impl ProcessMemory for HostMemory {
    fn allocated_bytes(&self) -> usize {
        resident_bytes().unwrap_or(0)
    }
}

#[cfg(target_os = "linux")]
fn resident_bytes() -> Option<usize> {
    let status = std::fs::read_to_string("/proc/self/status").ok()?;
    let line = status.lines().find(|l| l.starts_with("VmRSS:"))?;
    let kib: usize = line.split_whitespace().nth(1)?.parse().ok()?;
    Some(kib * 1024)
}

#[cfg(not(target_os = "linux"))]
fn resident_bytes() -> Option<usize> {
    None
}

/// A do-nothing accounting backend for tests and hosts that don't track
/// per-process memory.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopMemory;

impl ProcessMemory for NoopMemory {
    fn allocated_bytes(&self) -> usize {
        0
    }
}

/// Snapshot of one budget evaluation. Derived on demand, never stored.
#[derive(Debug, Clone, Copy)]
pub struct MemoryEstimate {
    /// Estimated byte size of one new graph node.
    pub node_size_bytes: usize,
    /// Bytes the calling process currently has allocated.
    pub current_process_bytes: usize,
    /// `node_size_bytes` times the pending insert count.
    pub projected_additional_bytes: usize,
}

impl MemoryEstimate {
    /// Whether current plus projected memory exceeds `limit_kib` kibibytes.
    pub fn over(&self, limit_kib: usize) -> bool {
        self.current_process_bytes + self.projected_additional_bytes > limit_kib * 1024
    }
}

/// Estimate the memory footprint of inserting `pending_nodes` more nodes.
///
/// Without a live index handle (estimating before an index exists) the node
/// size is zero and only baseline process memory remains in play.
pub fn estimate(
    index: Option<&dyn GraphIndex>,
    pending_nodes: usize,
    mem: &dyn ProcessMemory,
) -> MemoryEstimate {
    let node_size_bytes = match index {
        Some(index) => {
            let meta = index.metadata();
            let vector_bytes = meta.dimensions * std::mem::size_of::<f32>();
            node_bytes(
                &meta,
                vector_bytes,
                expected_node_levels(meta.connectivity),
            )
        }
        None => 0,
    };

    MemoryEstimate {
        node_size_bytes,
        current_process_bytes: mem.allocated_bytes(),
        projected_additional_bytes: node_size_bytes * pending_nodes,
    }
}

/// Warn when a bulk build is projected to outgrow the memory ceiling.
///
/// `limit_kib` is the ceiling in kibibytes, supplied per invocation. On
/// overrun this emits a single warning carrying the caller-supplied
/// `message`; it never aborts the operation.
pub fn check_budget(
    limit_kib: usize,
    index: Option<&dyn GraphIndex>,
    pending_nodes: usize,
    message: &str,
    mem: &dyn ProcessMemory,
) {
    let est = estimate(index, pending_nodes, mem);
    if est.over(limit_kib) {
        tracing::warn!(
            node_size_bytes = est.node_size_bytes,
            current_process_bytes = est.current_process_bytes,
            projected_additional_bytes = est.projected_additional_bytes,
            limit_kib,
            "{}",
            message
        );
    }
}
