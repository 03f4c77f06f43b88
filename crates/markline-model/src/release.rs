//! Release records
//!
//! A [`Release`] is immutable once fetched and is identified by its version.

use crate::date::{parse_date_text, ParsedDate};
use crate::error::{QueryError, QueryResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// Release record returned by the release-listing endpoint
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Release {
    /// Version string, optionally `package@version`
    pub version: String,
    /// ISO 8601 release date
    pub date: String,
}

impl Release {
    /// Create new release record
    #[inline]
    #[must_use]
    pub fn new(version: impl Into<String>, date: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            date: date.into(),
        }
    }

    /// Package/version view of the version string
    #[inline]
    #[must_use]
    pub fn parsed_version(&self) -> ReleaseVersion<'_> {
        ReleaseVersion::parse(&self.version)
    }

    /// Parse `date` into an instant
    ///
    /// Accepts the same text layouts as [`crate::DateInput`]; dates without
    /// a zone, including a bare `YYYY-MM-DD`, are taken as UTC.
    ///
    /// # Errors
    /// `QueryError::MalformedReleaseDate` when `date` is not a date
    pub fn timestamp(&self) -> QueryResult<DateTime<Utc>> {
        match parse_date_text(self.date.trim()) {
            Some(ParsedDate::Instant(instant)) => Ok(instant),
            Some(ParsedDate::Wall(wall)) => Ok(wall.and_utc()),
            None => Err(QueryError::MalformedReleaseDate {
                version: self.version.clone(),
                date: self.date.clone(),
            }),
        }
    }

    /// Epoch milliseconds of `date`
    ///
    /// # Errors
    /// `QueryError::MalformedReleaseDate` when `date` is not a date
    pub fn timestamp_millis(&self) -> QueryResult<i64> {
        self.timestamp().map(|instant| instant.timestamp_millis())
    }
}

/// Version string split into package and short version
///
/// Split happens on the first `@`:
/// - `sentry-android-shop@1.2.0` → package `sentry-android-shop`, short `1.2.0`
/// - `v1.2.0` → no package, short `v1.2.0`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReleaseVersion<'a> {
    raw: &'a str,
    package: Option<&'a str>,
    short: &'a str,
}

impl<'a> ReleaseVersion<'a> {
    /// Parse a raw version string
    #[must_use]
    pub fn parse(raw: &'a str) -> Self {
        match raw.split_once('@') {
            Some((package, short)) if !package.is_empty() && !short.is_empty() => Self {
                raw,
                package: Some(package),
                short,
            },
            _ => Self {
                raw,
                package: None,
                short: raw,
            },
        }
    }

    /// Raw version string
    #[inline]
    #[must_use]
    pub fn raw(&self) -> &'a str {
        self.raw
    }

    /// Package name, when the version is `package@version`
    #[inline]
    #[must_use]
    pub fn package(&self) -> Option<&'a str> {
        self.package
    }

    /// Version without the package prefix
    #[inline]
    #[must_use]
    pub fn short(&self) -> &'a str {
        self.short
    }

    /// Marker label: `"{short}, {package}"`, or the raw version
    #[must_use]
    pub fn label(&self) -> String {
        self.to_string()
    }
}

impl Display for ReleaseVersion<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self.package {
            Some(package) => write!(f, "{}, {}", self.short, package),
            None => f.write_str(self.raw),
        }
    }
}
