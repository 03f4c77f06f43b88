//! Builder inputs

use markline_model::{DateInput, FilterSet, ProjectId, Release};
use markline_series::EmphasisSet;

/// Everything one build cycle depends on
///
/// `releases` is an override: when it holds at least one release nothing is
/// fetched. An empty override behaves as no override.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeriesProps {
    /// Organization slug; required only when releases must be fetched
    pub organization: Option<String>,
    /// Caller-supplied releases
    pub releases: Option<Vec<Release>>,
    /// Project, environment and date filters
    pub filters: FilterSet,
    /// Versions drawn at full emphasis
    pub emphasize_releases: EmphasisSet,
    /// Reuse listings for previously seen queries
    pub memoized: bool,
    /// Tooltip times in UTC
    pub utc: bool,
}

impl SeriesProps {
    /// Props for an organization
    #[inline]
    #[must_use]
    pub fn new(organization: impl Into<String>) -> Self {
        Self {
            organization: Some(organization.into()),
            ..Self::default()
        }
    }

    /// With release override
    #[inline]
    #[must_use]
    pub fn with_releases(mut self, releases: Vec<Release>) -> Self {
        self.releases = Some(releases);
        self
    }

    /// With filters replaced wholesale
    #[inline]
    #[must_use]
    pub fn with_filters(mut self, filters: FilterSet) -> Self {
        self.filters = filters;
        self
    }

    /// With project filter
    #[must_use]
    pub fn with_projects<I, P>(mut self, projects: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<ProjectId>,
    {
        self.filters = self.filters.with_projects(projects);
        self
    }

    /// With environment filter
    #[must_use]
    pub fn with_environments<I, S>(mut self, environments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.filters = self.filters.with_environments(environments);
        self
    }

    /// With absolute range
    #[must_use]
    pub fn with_range(mut self, start: impl Into<DateInput>, end: impl Into<DateInput>) -> Self {
        self.filters = self.filters.with_range(start, end);
        self
    }

    /// With relative period such as `14d`
    #[must_use]
    pub fn with_period(mut self, period: impl Into<String>) -> Self {
        self.filters = self.filters.with_period(period);
        self
    }

    /// With emphasized versions
    #[must_use]
    pub fn with_emphasized<I, S>(mut self, versions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.emphasize_releases = versions.into_iter().map(Into::into).collect();
        self
    }

    /// With memoization
    #[inline]
    #[must_use]
    pub fn with_memoized(mut self, memoized: bool) -> Self {
        self.memoized = memoized;
        self
    }

    /// With UTC tooltip times
    #[inline]
    #[must_use]
    pub fn with_utc(mut self, utc: bool) -> Self {
        self.utc = utc;
        self
    }

    /// Non-empty release override, if any
    #[inline]
    #[must_use]
    pub fn override_releases(&self) -> Option<&[Release]> {
        self.releases.as_deref().filter(|releases| !releases.is_empty())
    }
}
