//! Markline series synthesis
//!
//! Turns release records into overlay marker descriptors for a plotting
//! engine that draws vertical lines atop a time-series chart.
//!
//! # Architecture
//!
//! ```text
//! [Release] + EmphasisSet + SeriesContext → build_overlay_series → Synthesis { series, skipped }
//! ```

#![warn(unreachable_pub)]

pub mod series;
pub mod style;
pub mod synth;

pub use series::{OverlaySeries, ReleaseTooltip, SERIES_NAME, TOOLTIP_FOOTER};
pub use style::{Emphasis, EmphasisSet, LineKind, LineStyle, EMPHASIZED_OPACITY, MUTED_OPACITY};
pub use synth::{build_overlay_series, SeriesContext, Synthesis};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
