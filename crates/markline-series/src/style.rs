//! Emphasis and line styling
//!
//! Emphasis is a fixed two-level scheme, not a continuous weight.

use serde::Serialize;
use std::collections::BTreeSet;

/// Versions the caller wants emphasized
pub type EmphasisSet = BTreeSet<String>;

/// Opacity of emphasized marker lines
pub const EMPHASIZED_OPACITY: f32 = 0.8;

/// Opacity of every other marker line
pub const MUTED_OPACITY: f32 = 0.3;

/// Visual weight of a marker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Emphasis {
    /// Caller-selected release
    Emphasized,
    /// Everything else
    Muted,
}

impl Emphasis {
    /// Emphasis of `version` under `set`
    #[inline]
    #[must_use]
    pub fn of(version: &str, set: &EmphasisSet) -> Self {
        if set.contains(version) {
            Self::Emphasized
        } else {
            Self::Muted
        }
    }

    /// Line opacity for this weight
    #[inline]
    #[must_use]
    pub fn opacity(self) -> f32 {
        match self {
            Self::Emphasized => EMPHASIZED_OPACITY,
            Self::Muted => MUTED_OPACITY,
        }
    }

    /// Whether this is [`Emphasis::Emphasized`]
    #[inline]
    #[must_use]
    pub fn is_emphasized(self) -> bool {
        matches!(self, Self::Emphasized)
    }
}

/// Stroke pattern of a marker line
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LineKind {
    /// Continuous stroke
    #[default]
    Solid,
}

/// Line style handed to the plotting engine
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LineStyle {
    /// Stroke opacity
    pub opacity: f32,
    /// Stroke pattern
    #[serde(rename = "type")]
    pub kind: LineKind,
}

impl From<Emphasis> for LineStyle {
    fn from(emphasis: Emphasis) -> Self {
        Self {
            opacity: emphasis.opacity(),
            kind: LineKind::Solid,
        }
    }
}
