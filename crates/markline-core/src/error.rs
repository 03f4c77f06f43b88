//! Error types for the release series builder
//!
//! Provides error handling for:
//! - Missing organization context (fatal precondition)
//! - Filter interpretation failures
//! - Release fetch failures
//! - Configuration loading

use markline_fetch::FetchError;
use markline_model::QueryError;
use std::path::PathBuf;

/// Message shown to consumers when a fetch fails
pub const FETCH_FAILED_MESSAGE: &str = "Error fetching releases";

/// Main builder error type
#[derive(Debug, thiserror::Error)]
pub enum SeriesError {
    /// Releases must be fetched but no organization is set
    #[error("organization is required to fetch releases")]
    MissingOrganization,

    /// Filters could not be turned into a query
    #[error("invalid filters: {0}")]
    Query(#[from] QueryError),

    /// Release fetch failed; nothing was cached
    #[error("Error fetching releases: {0}")]
    Fetch(#[from] FetchError),
}

impl SeriesError {
    /// Check if repeating the same update could succeed
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Fetch(e) if e.is_retryable())
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("io error reading {path}: {source}")]
    Io {
        /// File path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid TOML for [`crate::SeriesConfig`]
    #[error("config parse error: {0}")]
    Parse(#[from] toml::de::Error),

    /// Values parse but cannot be used
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Result type alias for builder operations
pub type SeriesResult<T> = Result<T, SeriesError>;
