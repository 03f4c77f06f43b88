//! Build cycle types
//!
//! - [`CycleId`]: one per `update`/`set_emphasized` call
//! - [`ReleaseOrigin`]: where a cycle's releases came from
//! - [`BuildResult`]: what consumers render
//! - [`BuildOutcome`]: whether a completed cycle was published
//! - [`SeriesSnapshot`]: watch channel payload

use markline_model::Release;
use markline_series::OverlaySeries;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use ulid::Ulid;

/// Unique build cycle identifier (ULID for sortability)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CycleId(pub Ulid);

impl CycleId {
    /// Generate new cycle ID
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self(Ulid::new())
    }
}

impl Default for CycleId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CycleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Where a cycle's releases came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReleaseOrigin {
    /// Caller-supplied override
    Override,
    /// Memoized listing
    Cache,
    /// Fresh fetch
    Network,
    /// Same source as the previous applied cycle; nothing loaded
    Retained,
}

impl ReleaseOrigin {
    /// Check if this cycle hit the network
    #[inline]
    #[must_use]
    pub fn is_network(self) -> bool {
        matches!(self, Self::Network)
    }
}

impl fmt::Display for ReleaseOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Override => "override",
            Self::Cache => "cache",
            Self::Network => "network",
            Self::Retained => "retained",
        };
        f.write_str(name)
    }
}

/// Releases resolved for one cycle
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedReleases {
    /// Releases in source order
    pub releases: Arc<[Release]>,
    /// Where they came from
    pub origin: ReleaseOrigin,
}

/// Output of one applied build cycle
#[derive(Debug, Clone, PartialEq)]
pub struct BuildResult {
    /// Cycle that produced this result
    pub cycle: CycleId,
    /// Where `releases` came from
    pub origin: ReleaseOrigin,
    /// Releases the series were built from
    pub releases: Arc<[Release]>,
    /// One marker per well-formed release, release order
    pub release_series: Vec<OverlaySeries>,
    /// Versions without a marker because their date did not parse
    pub skipped: Vec<String>,
}

/// Completed cycle, published or not
#[derive(Debug, Clone, PartialEq)]
pub enum BuildOutcome {
    /// Published to subscribers and stored as latest
    Applied(Arc<BuildResult>),
    /// Props moved to another release source while this cycle loaded
    Superseded(BuildResult),
}

impl BuildOutcome {
    /// Check if the cycle was published
    #[inline]
    #[must_use]
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied(_))
    }

    /// Result regardless of publication
    #[must_use]
    pub fn result(&self) -> &BuildResult {
        match self {
            Self::Applied(result) => result,
            Self::Superseded(result) => result,
        }
    }
}

/// State visible to subscribers
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeriesSnapshot {
    /// Last applied result
    pub result: Option<Arc<BuildResult>>,
    /// Last error message, cleared by the next applied cycle
    pub error: Option<String>,
}

impl SeriesSnapshot {
    /// Check if a cycle has failed since the last applied one
    #[inline]
    #[must_use]
    pub fn has_error(&self) -> bool {
        self.error.is_some()
    }
}
