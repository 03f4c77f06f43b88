//! Markline core
//!
//! Turns chart filters into an overlay series of release markers:
//!
//! - [`SeriesProps`]: organization, release override, filters, emphasis
//! - [`ReleaseSeriesBuilder`]: resolves releases (override, memo or fetch)
//!   and synthesizes [`markline_series::OverlaySeries`]
//! - [`SeriesConfig`]: endpoint, cache and paging settings from TOML
//!
//! # Example
//!
//! ```no_run
//! use markline_core::{ReleaseSeriesBuilder, SeriesConfig, SeriesProps};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let builder = ReleaseSeriesBuilder::with_http(SeriesConfig::default())?;
//! let props = SeriesProps::new("acme")
//!     .with_projects([1, 2])
//!     .with_period("14d")
//!     .with_memoized(true);
//!
//! let outcome = builder.update(props).await?;
//! for marker in &outcome.result().release_series {
//!     println!("{} at {}", marker.marker_label, marker.position);
//! }
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod builder;
pub mod config;
pub mod error;
pub mod props;
pub mod types;

pub use builder::ReleaseSeriesBuilder;
pub use config::SeriesConfig;
pub use error::{ConfigError, SeriesError, SeriesResult, FETCH_FAILED_MESSAGE};
pub use props::SeriesProps;
pub use types::{BuildOutcome, BuildResult, CycleId, ReleaseOrigin, ResolvedReleases, SeriesSnapshot};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
