//! Dashboard filters
//!
//! A [`FilterSet`] is the raw, caller-facing filter state. It is never sent
//! as-is; [`crate::build_query`] normalizes it first.

use crate::date::DateInput;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// Project identifier
///
/// Passed through verbatim; `-1` conventionally means "all projects".
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectId(pub i64);

impl Display for ProjectId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for ProjectId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl From<i32> for ProjectId {
    fn from(id: i32) -> Self {
        Self(i64::from(id))
    }
}

/// Raw filter state
///
/// At most one of `start`/`end` or `period` is authoritative: a complete
/// `start`+`end` pair wins over `period`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct FilterSet {
    /// Selected projects, in caller order
    pub projects: Vec<ProjectId>,
    /// Selected environments, in caller order
    pub environments: Vec<String>,
    /// Window start
    pub start: Option<DateInput>,
    /// Window end
    pub end: Option<DateInput>,
    /// Relative window such as `14d`
    pub period: Option<String>,
}

impl FilterSet {
    /// Empty filter set (unbounded, all projects the caller can see)
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With projects
    #[must_use]
    pub fn with_projects<I, P>(mut self, projects: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<ProjectId>,
    {
        self.projects = projects.into_iter().map(Into::into).collect();
        self
    }

    /// With environments
    #[must_use]
    pub fn with_environments<I, S>(mut self, environments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.environments = environments.into_iter().map(Into::into).collect();
        self
    }

    /// With absolute window
    #[must_use]
    pub fn with_range(mut self, start: impl Into<DateInput>, end: impl Into<DateInput>) -> Self {
        self.start = Some(start.into());
        self.end = Some(end.into());
        self
    }

    /// With relative window
    #[inline]
    #[must_use]
    pub fn with_period(mut self, period: impl Into<String>) -> Self {
        self.period = Some(period.into());
        self
    }

    /// Whether both window bounds are set
    #[inline]
    #[must_use]
    pub fn has_range(&self) -> bool {
        self.start.is_some() && self.end.is_some()
    }
}
