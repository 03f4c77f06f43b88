//! Builder configuration
//!
//! Loaded from TOML; every field has a default so an empty file is valid.
//!
//! ```toml
//! api_base = "https://sentry.example.com/api/0"
//! cache_capacity = 256
//! max_pages = 20
//! zone = "utc"
//! ```

use crate::error::ConfigError;
use markline_fetch::{FetchResult, HttpReleaseFetcher, ReleaseCache};
use markline_model::DisplayZone;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Release series builder configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeriesConfig {
    /// API root the release endpoint hangs off
    pub api_base: String,
    /// Bearer token for the release endpoint
    pub auth_token: Option<String>,
    /// Maximum memoized listings per builder
    pub cache_capacity: u64,
    /// Memoized listing lifetime; unset keeps entries until evicted
    pub cache_ttl_secs: Option<u64>,
    /// Maximum pages followed per fetch
    pub max_pages: usize,
    /// HTTP request timeout; unset means no client-side timeout
    pub request_timeout_secs: Option<u64>,
    /// Wall clock for query bounds and tooltip times
    pub zone: DisplayZone,
}

impl SeriesConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse TOML and validate
    ///
    /// # Errors
    /// `ConfigError::Parse` for bad TOML, `ConfigError::Invalid` for bad values
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file
    ///
    /// # Errors
    /// `ConfigError::Io` when the file cannot be read, otherwise as
    /// [`SeriesConfig::from_toml_str`]
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(path = %path.display(), "loaded series config");
        Self::from_toml_str(&raw)
    }

    /// Check values are usable
    ///
    /// # Errors
    /// `ConfigError::Invalid` naming the first bad field
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api_base.trim().is_empty() {
            return Err(ConfigError::Invalid("api_base must not be empty".to_string()));
        }
        if self.cache_capacity == 0 {
            return Err(ConfigError::Invalid("cache_capacity must be positive".to_string()));
        }
        if self.max_pages == 0 {
            return Err(ConfigError::Invalid("max_pages must be positive".to_string()));
        }
        self.zone
            .validate()
            .map_err(|e| ConfigError::Invalid(e.to_string()))
    }

    /// With API base
    #[inline]
    #[must_use]
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    /// With bearer token
    #[inline]
    #[must_use]
    pub fn with_auth_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into());
        self
    }

    /// With cache capacity
    #[inline]
    #[must_use]
    pub fn with_cache_capacity(mut self, capacity: u64) -> Self {
        self.cache_capacity = capacity;
        self
    }

    /// With page limit
    #[inline]
    #[must_use]
    pub fn with_max_pages(mut self, max_pages: usize) -> Self {
        self.max_pages = max_pages;
        self
    }

    /// With display zone
    #[inline]
    #[must_use]
    pub fn with_zone(mut self, zone: DisplayZone) -> Self {
        self.zone = zone;
        self
    }

    /// Fresh, empty cache sized by this config
    #[must_use]
    pub fn build_cache(&self) -> ReleaseCache {
        match self.cache_ttl_secs {
            Some(ttl) => ReleaseCache::with_ttl(self.cache_capacity, Duration::from_secs(ttl)),
            None => ReleaseCache::new(self.cache_capacity),
        }
    }

    /// HTTP fetcher for `api_base`
    ///
    /// # Errors
    /// `FetchError::Request` if the HTTP client cannot be built
    pub fn http_fetcher(&self) -> FetchResult<HttpReleaseFetcher> {
        let fetcher = HttpReleaseFetcher::new(
            self.api_base.clone(),
            self.request_timeout_secs.map(Duration::from_secs),
        )?;
        Ok(match &self.auth_token {
            Some(token) => fetcher.with_token(token.clone()),
            None => fetcher,
        })
    }
}

impl Default for SeriesConfig {
    fn default() -> Self {
        Self {
            api_base: "https://sentry.io/api/0".to_string(),
            auth_token: None,
            cache_capacity: 256,
            cache_ttl_secs: None,
            max_pages: 20,
            request_timeout_secs: Some(30),
            zone: DisplayZone::Local,
        }
    }
}
