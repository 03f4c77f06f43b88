//! Markline release model
//!
//! Plain data shared by every other markline crate.
//!
//! # Core Concepts
//!
//! - [`Release`]: a release record as returned by the release-listing endpoint
//! - [`ReleaseVersion`]: `package@version` view used for marker labels
//! - [`FilterSet`]: raw dashboard filters (projects, environments, date window)
//! - [`CanonicalQuery`]: normalized request parameters, also the cache key
//! - [`build_query`]: the only way to turn a [`FilterSet`] into a [`CanonicalQuery`]
//!
//! # Example
//!
//! ```rust,ignore
//! use markline_model::{build_query, DisplayZone, FilterSet};
//!
//! let filters = FilterSet::new().with_projects([1, 2]).with_period("14d");
//! let query = build_query(&filters, DisplayZone::Utc)?;
//! assert_eq!(query.stats_period(), Some("14d"));
//! ```

#![warn(unreachable_pub)]

pub mod date;
pub mod error;
pub mod filter;
pub mod query;
pub mod release;

pub use date::{DateInput, DisplayZone, WALL_TIME_FORMAT};
pub use error::{QueryError, QueryResult};
pub use filter::{FilterSet, ProjectId};
pub use query::{build_query, CanonicalQuery};
pub use release::{Release, ReleaseVersion};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
