//! Overlay marker descriptors
//!
//! One [`OverlaySeries`] per release: where to draw the vertical line, what
//! to call it, how heavy it is, and where clicking it leads.

use crate::style::{Emphasis, LineStyle};
use serde::Serialize;
use std::fmt::{self, Display, Formatter};

/// Series name shown in chart legends
pub const SERIES_NAME: &str = "Releases";

/// Tooltip footer
pub const TOOLTIP_FOOTER: &str = "Click to see details";

/// Single release marker
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverlaySeries {
    /// Legend name
    pub series_name: &'static str,
    /// Raw release version
    pub version: String,
    /// `"{short}, {package}"` or the raw version
    pub marker_label: String,
    /// Epoch milliseconds of the release date
    pub position: i64,
    /// Whether the caller selected this release
    pub emphasized: bool,
    /// Stroke derived from emphasis
    pub line_style: LineStyle,
    /// Hover text
    pub tooltip: ReleaseTooltip,
    /// Release detail page path, filters preserved
    pub detail_path: String,
}

impl OverlaySeries {
    /// Emphasis level of this marker
    #[inline]
    #[must_use]
    pub fn emphasis(&self) -> Emphasis {
        if self.emphasized {
            Emphasis::Emphasized
        } else {
            Emphasis::Muted
        }
    }

    /// Line opacity
    #[inline]
    #[must_use]
    pub fn opacity(&self) -> f32 {
        self.line_style.opacity
    }
}

/// Hover text for a marker
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReleaseTooltip {
    /// Marker label
    pub label: String,
    /// Formatted release time, e.g. `Mar 23, 2020 12:00 AM`
    pub time: String,
}

impl Display for ReleaseTooltip {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "Release {}\n{}\n{}", self.label, self.time, TOOLTIP_FOOTER)
    }
}
