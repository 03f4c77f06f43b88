//! Error types for the release model
//!
//! Covers the two places raw input is interpreted:
//! - date filters turned into wall-clock query bounds
//! - release dates turned into marker positions

/// Errors while interpreting raw dates
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueryError {
    /// A `start`/`end` filter could not be parsed
    #[error("invalid {field} date: '{value}'")]
    InvalidDate {
        /// Filter field name (`start` or `end`)
        field: &'static str,
        /// Raw input
        value: String,
    },

    /// A release record carries an unparsable `date`
    #[error("release '{version}' has malformed date '{date}'")]
    MalformedReleaseDate {
        /// Release version
        version: String,
        /// Raw date string from the service
        date: String,
    },

    /// A fixed display offset is outside +/- 24h
    #[error("utc offset out of range: {0}s")]
    OffsetOutOfRange(i32),
}

impl QueryError {
    /// Create invalid date error for a filter field
    pub fn invalid_date(field: &'static str, value: impl Into<String>) -> Self {
        Self::InvalidDate {
            field,
            value: value.into(),
        }
    }
}

/// Result type alias for model operations
pub type QueryResult<T> = Result<T, QueryError>;
