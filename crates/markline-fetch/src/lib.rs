//! Markline fetch layer
//!
//! Everything between a [`markline_model::CanonicalQuery`] and a list of
//! releases:
//!
//! - [`ReleaseFetcher`]: async seam to the release-listing endpoint
//! - [`HttpReleaseFetcher`]: `reqwest` implementation with cursor pagination
//! - [`fetch_all_pages`]: follows `Link` cursors up to a page limit
//! - [`ReleaseCache`]: `moka` memo of listings per organization and query
//!
//! # Architecture
//!
//! ```text
//! CanonicalQuery → ReleaseCache ─hit→ [Release]
//!                      │ miss
//!                      ↓
//!               fetch_all_pages → ReleaseFetcher::fetch_page (× pages) → [Release]
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod cache;
pub mod error;
pub mod fetcher;
pub mod http;
pub mod link;

pub use cache::{CacheKey, CacheStats, CachedListing, ReleaseCache};
pub use error::{FetchError, FetchResult};
pub use fetcher::{fetch_all_pages, ReleaseFetcher, ReleasePage};
pub use http::HttpReleaseFetcher;
pub use link::{next_cursor, parse_link_header, PageLink};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
