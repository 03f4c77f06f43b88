//! Error types for release fetching
//!
//! Failures are never retried here; callers decide what to do with
//! [`FetchError::is_retryable`].

use std::sync::Arc;

/// Errors from the release-listing collaborator
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// Transport-level failure (connect, timeout, TLS)
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Non-success HTTP status
    #[error("release endpoint returned {status}: {body}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Response body, truncated
        body: String,
    },

    /// Body was not a list of releases
    #[error("malformed release list: {0}")]
    Decode(#[from] serde_json::Error),

    /// Organization slug missing or blank
    #[error("organization slug is required")]
    InvalidOrganization,

    /// Failure reported by a non-HTTP fetcher
    #[error("transport error: {0}")]
    Transport(String),

    /// Failure of a load shared by several concurrent callers
    #[error(transparent)]
    Shared(Arc<FetchError>),
}

impl FetchError {
    /// Create status error, truncating the body
    pub fn status(status: u16, body: impl Into<String>) -> Self {
        let mut body = body.into();
        if body.len() > MAX_BODY_CHARS {
            let cut = (0..=MAX_BODY_CHARS)
                .rev()
                .find(|i| body.is_char_boundary(*i))
                .unwrap_or(0);
            body.truncate(cut);
        }
        Self::Status { status, body }
    }

    /// Check if a later identical request could succeed
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Request(e) => e.is_timeout() || e.is_connect(),
            Self::Status { status, .. } => *status == 429 || *status >= 500,
            Self::Transport(_) => true,
            Self::Shared(inner) => inner.is_retryable(),
            Self::Decode(_) | Self::InvalidOrganization => false,
        }
    }
}

impl From<Arc<FetchError>> for FetchError {
    /// Take sole ownership back when no other caller still holds the error
    fn from(shared: Arc<FetchError>) -> Self {
        Arc::try_unwrap(shared).unwrap_or_else(Self::Shared)
    }
}

const MAX_BODY_CHARS: usize = 512;

/// Result type alias for fetch operations
pub type FetchResult<T> = Result<T, FetchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_display() {
        let err = FetchError::status(404, "not found");
        assert_eq!(err.to_string(), "release endpoint returned 404: not found");
    }

    #[test]
    fn status_body_truncated() {
        let err = FetchError::status(500, "x".repeat(2_000));
        match err {
            FetchError::Status { body, .. } => assert_eq!(body.len(), MAX_BODY_CHARS),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn retryable_classification() {
        assert!(FetchError::status(503, "").is_retryable());
        assert!(FetchError::status(429, "").is_retryable());
        assert!(!FetchError::status(403, "").is_retryable());
        assert!(FetchError::Transport("reset".to_string()).is_retryable());
        assert!(!FetchError::InvalidOrganization.is_retryable());
    }

    #[test]
    fn shared_error_unwraps_when_unique() {
        let unique: FetchError = Arc::new(FetchError::status(502, "gateway")).into();
        assert!(matches!(unique, FetchError::Status { status: 502, .. }));

        let shared = Arc::new(FetchError::status(503, "busy"));
        let held = Arc::clone(&shared);
        let err: FetchError = shared.into();
        assert!(matches!(err, FetchError::Shared(_)));
        assert!(err.is_retryable());
        assert_eq!(err.to_string(), held.to_string());
    }
}
