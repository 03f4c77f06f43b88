//! Canonical release queries
//!
//! [`CanonicalQuery`] is both the literal request parameters and the cache
//! key, so it must be deterministic: equal filters always build equal
//! queries with equal hashes.

use crate::date::DisplayZone;
use crate::error::QueryResult;
use crate::filter::{FilterSet, ProjectId};
use serde::Serialize;

/// Normalized release query
///
/// Only [`build_query`] constructs one, which keeps the absolute window
/// (`start`+`end`) and the relative window (`statsPeriod`) exclusive.
/// Absent keys are omitted when serialized.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
pub struct CanonicalQuery {
    #[serde(rename = "project", skip_serializing_if = "Vec::is_empty")]
    projects: Vec<ProjectId>,
    #[serde(rename = "environment", skip_serializing_if = "Vec::is_empty")]
    environments: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    start: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    end: Option<String>,
    #[serde(rename = "statsPeriod", skip_serializing_if = "Option::is_none")]
    stats_period: Option<String>,
}

impl CanonicalQuery {
    /// Project ids (`project`)
    #[inline]
    #[must_use]
    pub fn projects(&self) -> &[ProjectId] {
        &self.projects
    }

    /// Environment names (`environment`)
    #[inline]
    #[must_use]
    pub fn environments(&self) -> &[String] {
        &self.environments
    }

    /// Absolute window as (`start`, `end`)
    #[must_use]
    pub fn range(&self) -> Option<(&str, &str)> {
        self.start.as_deref().zip(self.end.as_deref())
    }

    /// Relative window (`statsPeriod`)
    #[inline]
    #[must_use]
    pub fn stats_period(&self) -> Option<&str> {
        self.stats_period.as_deref()
    }

    /// Whether the query carries no date bounds
    #[inline]
    #[must_use]
    pub fn is_unbounded(&self) -> bool {
        self.start.is_none() && self.stats_period.is_none()
    }

    /// Request parameters in a stable order
    ///
    /// List values become repeated keys (`project=1&project=2`).
    #[must_use]
    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::with_capacity(self.projects.len() + self.environments.len() + 2);
        params.extend(self.projects.iter().map(|id| ("project", id.to_string())));
        params.extend(self.environments.iter().map(|env| ("environment", env.clone())));
        if let Some((start, end)) = self.range() {
            params.push(("start", start.to_string()));
            params.push(("end", end.to_string()));
        }
        if let Some(period) = &self.stats_period {
            params.push(("statsPeriod", period.clone()));
        }
        params
    }
}

/// Build the canonical query for a filter set
///
/// Date priority:
/// 1. `start` and `end` both set → wall-time bounds in `zone`
/// 2. `period` set → `statsPeriod`
/// 3. neither → no date keys
///
/// # Errors
/// `QueryError::InvalidDate` when a window bound cannot be parsed
pub fn build_query(filters: &FilterSet, zone: DisplayZone) -> QueryResult<CanonicalQuery> {
    let mut query = CanonicalQuery {
        projects: filters.projects.clone(),
        environments: filters.environments.clone(),
        ..CanonicalQuery::default()
    };

    match (&filters.start, &filters.end, &filters.period) {
        (Some(start), Some(end), _) => {
            query.start = Some(start.to_query_string("start", zone)?);
            query.end = Some(end.to_query_string("end", zone)?);
        }
        (_, _, Some(period)) => {
            query.stats_period = Some(period.clone());
        }
        _ => {}
    }

    tracing::trace!(?query, "built release query");
    Ok(query)
}
