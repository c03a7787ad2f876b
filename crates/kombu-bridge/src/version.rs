//! Binary/schema version compatibility gating.
//!
//! An index written by one binary version must not be touched while the
//! schema side still records another: the two surfaces evolve together and
//! can disagree on formats. Every index build, insert, and scan entry point
//! consults the gate first.
//!
//! The gate is a per-backend-process context object with an explicit
//! lifecycle: create it at process or connection start, call
//! [`VersionGate::reset`] when the transactional snapshot is lost, drop it
//! at teardown. The first check under an active snapshot runs the catalog
//! lookup and caches the verdict; later checks return the cache without
//! touching the catalog.

use crate::{Error, Result};
use parking_lot::Mutex;

/// Whether the calling context holds an active transactional snapshot.
///
/// Ancillary catalog queries need one. Parallel workers run without it, and
/// for them the gate is permissive on the assumption that the leader
/// performed the real check before spawning them. A leader that skipped its
/// check can mask a genuine mismatch; that race is accepted, not solved,
/// here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotState {
    Active,
    Unavailable,
}

/// Errors from the host's embedded query facility.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("could not open catalog session to check binary version: {0}")]
    Session(String),

    #[error("version query failed: {0}")]
    Execute(String),
}

/// Single-row lookup of the installed extension's version string.
///
/// Implementations run the lookup through the host's embedded executor and
/// return the raw result rows; the gate enforces the exactly-one-non-null
/// contract itself.
pub trait ExtensionCatalog {
    fn installed_version(&self) -> std::result::Result<Vec<Option<String>>, CatalogError>;
}

#[derive(Debug, Clone, Copy, Default)]
struct VersionState {
    checked: bool,
    matches: bool,
}

/// Per-process version compatibility gate.
///
/// Holds the compiled binary's version string and the cached verdict of the
/// last catalog comparison. One gate per backend process; state is never
/// shared across processes.
pub struct VersionGate {
    binary_version: String,
    state: Mutex<VersionState>,
}

impl Default for VersionGate {
    /// Gate for the compiled crate version.
    fn default() -> Self {
        Self::new(env!("CARGO_PKG_VERSION"))
    }
}

impl VersionGate {
    pub fn new(binary_version: impl Into<String>) -> Self {
        Self {
            binary_version: binary_version.into(),
            state: Mutex::new(VersionState::default()),
        }
    }

    pub fn binary_version(&self) -> &str {
        &self.binary_version
    }

    /// Forget the cached verdict. Called on snapshot-loss events.
    pub fn reset(&self) {
        *self.state.lock() = VersionState::default();
    }

    /// Check that the running binary matches the schema's recorded version.
    ///
    /// Returns `Ok(true)` when the versions agree, when a prior check in
    /// this process already agreed, or (permissively) when no snapshot is
    /// available to run the lookup under. Returns `Ok(false)` after a
    /// mismatch, emitting one warning (per process) that names both versions
    /// and the remediation command. Errors mean the catalog itself is
    /// broken, not that the versions differ.
    pub fn check_compatible(
        &self,
        catalog: &dyn ExtensionCatalog,
        snapshot: SnapshotState,
    ) -> Result<bool> {
        if snapshot == SnapshotState::Unavailable {
            // A worker without a snapshot cannot run the lookup; the leader
            // is assumed to have checked before spawning it. Reset so a
            // later call with a snapshot re-verifies instead of trusting
            // stale state.
            self.reset();
            return Ok(true);
        }

        let mut state = self.state.lock();
        if state.checked {
            return Ok(state.matches);
        }

        let rows = catalog.installed_version()?;
        if rows.len() != 1 {
            return Err(Error::VersionRowCount(rows.len()));
        }
        let schema_version = rows
            .into_iter()
            .next()
            .flatten()
            .ok_or(Error::NullVersion)?;

        let matches = versions_match(&schema_version, &self.binary_version);
        *state = VersionState {
            checked: true,
            matches,
        };
        drop(state);

        if !matches {
            tracing::warn!(
                binary = %self.binary_version,
                schema = %schema_version,
                "binary version does not match the extension version in SQL; the two APIs \
                 may differ. Run `ALTER EXTENSION kombu UPDATE` and reconnect before \
                 working with indexes"
            );
        }
        Ok(matches)
    }
}

/// Compare the schema's version string against the binary's.
///
/// The comparison runs over the longer of the two lengths, so a version
/// that is a strict prefix of the other does not count as a match. Callers
/// depend on this exact-length agreement; keep the rule as is.
fn versions_match(schema: &str, binary: &str) -> bool {
    let a = schema.as_bytes();
    let b = binary.as_bytes();
    let len = a.len().max(b.len());
    (0..len).all(|i| match (a.get(i), b.get(i)) {
        (Some(x), Some(y)) => x == y,
        _ => false,
    })
}
