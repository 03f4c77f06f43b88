//! Release → overlay series synthesis
//!
//! No grouping or bucketing: every release gets its own marker, in input
//! order, even when two releases share a timestamp.

use crate::series::{OverlaySeries, ReleaseTooltip, SERIES_NAME};
use crate::style::{Emphasis, EmphasisSet};
use chrono::{DateTime, Utc};
use markline_model::{DisplayZone, ProjectId, Release};
use std::fmt::Write as _;

/// Tooltip time layout (`Mar 23, 2020 12:00 AM`)
const TOOLTIP_TIME_FORMAT: &str = "%b %-d, %Y %-I:%M %p";

/// Rendering context shared by every marker of one build
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeriesContext {
    /// Organization slug for detail links
    pub organization: String,
    /// Project filter preserved on detail links
    pub projects: Vec<ProjectId>,
    /// Environment filter preserved on detail links
    pub environments: Vec<String>,
    /// Render tooltip times in UTC instead of `zone`
    pub utc: bool,
    /// Wall clock for tooltip times
    pub zone: DisplayZone,
}

impl SeriesContext {
    /// Create context for an organization
    #[inline]
    #[must_use]
    pub fn new(organization: impl Into<String>) -> Self {
        Self {
            organization: organization.into(),
            ..Self::default()
        }
    }

    /// With UTC tooltip times
    #[inline]
    #[must_use]
    pub fn with_utc(mut self, utc: bool) -> Self {
        self.utc = utc;
        self
    }

    /// With display zone
    #[inline]
    #[must_use]
    pub fn with_zone(mut self, zone: DisplayZone) -> Self {
        self.zone = zone;
        self
    }

    /// With filters preserved on detail links
    #[must_use]
    pub fn with_filters(mut self, projects: &[ProjectId], environments: &[String]) -> Self {
        self.projects = projects.to_vec();
        self.environments = environments.to_vec();
        self
    }

    /// Path of a release's detail page
    #[must_use]
    pub fn detail_path(&self, version: &str) -> String {
        let mut path = format!(
            "/organizations/{}/releases/{}/",
            urlencoding::encode(&self.organization),
            urlencoding::encode(version)
        );

        let mut separator = '?';
        let params = self
            .projects
            .iter()
            .map(|id| ("project", id.to_string()))
            .chain(self.environments.iter().map(|env| ("environment", env.clone())));
        for (key, value) in params {
            let _ = write!(path, "{separator}{key}={}", urlencoding::encode(&value));
            separator = '&';
        }
        path
    }

    /// Tooltip time for an instant
    #[must_use]
    pub fn format_time(&self, instant: DateTime<Utc>) -> String {
        let wall = if self.utc {
            instant.naive_utc()
        } else {
            self.zone
                .wall_time(instant)
                .unwrap_or_else(|_| instant.naive_utc())
        };
        wall.format(TOOLTIP_TIME_FORMAT).to_string()
    }
}

/// Result of one synthesis pass
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Synthesis {
    /// One marker per well-formed release, input order
    pub series: Vec<OverlaySeries>,
    /// Versions dropped because their date did not parse
    pub skipped: Vec<String>,
}

/// Build overlay markers for `releases`
///
/// Releases with unparsable dates are skipped with a warning and listed in
/// [`Synthesis::skipped`]; the rest of the build continues.
#[must_use]
pub fn build_overlay_series(
    releases: &[Release],
    emphasized: &EmphasisSet,
    context: &SeriesContext,
) -> Synthesis {
    let mut synthesis = Synthesis {
        series: Vec::with_capacity(releases.len()),
        skipped: Vec::new(),
    };

    for release in releases {
        let instant = match release.timestamp() {
            Ok(instant) => instant,
            Err(e) => {
                tracing::warn!(version = %release.version, "skipping release marker: {}", e);
                synthesis.skipped.push(release.version.clone());
                continue;
            }
        };

        let label = release.parsed_version().label();
        let emphasis = Emphasis::of(&release.version, emphasized);

        synthesis.series.push(OverlaySeries {
            series_name: SERIES_NAME,
            version: release.version.clone(),
            marker_label: label.clone(),
            position: instant.timestamp_millis(),
            emphasized: emphasis.is_emphasized(),
            line_style: emphasis.into(),
            tooltip: ReleaseTooltip {
                label,
                time: context.format_time(instant),
            },
            detail_path: context.detail_path(&release.version),
        });
    }

    tracing::debug!(
        markers = synthesis.series.len(),
        skipped = synthesis.skipped.len(),
        "synthesized release series"
    );
    synthesis
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn context() -> SeriesContext {
        SeriesContext::new("acme").with_utc(true)
    }

    fn emphasis(versions: &[&str]) -> EmphasisSet {
        versions.iter().map(|v| (*v).to_string()).collect()
    }

    #[test]
    fn label_and_position() {
        let releases = vec![Release::new("sentry-android-shop@1.2.0", "2020-03-23T00:00:00Z")];
        let synthesis = build_overlay_series(&releases, &EmphasisSet::new(), &context());

        assert_eq!(synthesis.series.len(), 1);
        let marker = &synthesis.series[0];
        assert_eq!(marker.marker_label, "1.2.0, sentry-android-shop");
        assert_eq!(marker.position, 1_584_921_600_000);
        assert!(!marker.emphasized);
        assert_eq!(marker.series_name, "Releases");
    }

    #[test]
    fn emphasized_subset() {
        let releases = vec![
            Release::new("v1.2.0", "2020-03-23T00:00:00Z"),
            Release::new("v1.2.1", "2020-03-24T00:00:00Z"),
        ];
        let synthesis = build_overlay_series(&releases, &emphasis(&["v1.2.0"]), &context());

        assert!((synthesis.series[0].opacity() - 0.8).abs() < f32::EPSILON);
        assert!((synthesis.series[1].opacity() - 0.3).abs() < f32::EPSILON);

        let swapped = build_overlay_series(&releases, &emphasis(&["v1.2.1"]), &context());
        assert!((swapped.series[0].opacity() - 0.3).abs() < f32::EPSILON);
        assert!((swapped.series[1].opacity() - 0.8).abs() < f32::EPSILON);
    }

    #[test]
    fn same_timestamp_not_grouped() {
        let releases = vec![
            Release::new("web@2.0", "2020-03-23T00:00:00Z"),
            Release::new("api@2.0", "2020-03-23T00:00:00Z"),
        ];
        let synthesis = build_overlay_series(&releases, &EmphasisSet::new(), &context());
        assert_eq!(synthesis.series.len(), 2);
        assert_eq!(synthesis.series[0].position, synthesis.series[1].position);
    }

    #[test]
    fn malformed_date_skipped() {
        let releases = vec![
            Release::new("good@1", "2020-03-23T00:00:00Z"),
            Release::new("bad@1", "???"),
            Release::new("good@2", "2020-03-24T00:00:00Z"),
        ];
        let synthesis = build_overlay_series(&releases, &EmphasisSet::new(), &context());

        let versions: Vec<_> = synthesis.series.iter().map(|s| s.version.as_str()).collect();
        assert_eq!(versions, vec!["good@1", "good@2"]);
        assert_eq!(synthesis.skipped, vec!["bad@1".to_string()]);
    }

    #[test]
    fn tooltip_time_utc_and_offset() {
        let releases = vec![Release::new("v1", "2020-03-23T15:04:00Z")];

        let utc = build_overlay_series(&releases, &EmphasisSet::new(), &context());
        assert_eq!(utc.series[0].tooltip.time, "Mar 23, 2020 3:04 PM");

        let shifted = SeriesContext::new("acme").with_zone(DisplayZone::Offset(-4 * 3_600));
        let local = build_overlay_series(&releases, &EmphasisSet::new(), &shifted);
        assert_eq!(local.series[0].tooltip.time, "Mar 23, 2020 11:04 AM");
    }

    #[test]
    fn detail_path_preserves_filters() {
        let ctx = SeriesContext::new("acme")
            .with_filters(&[ProjectId(1), ProjectId(2)], &["prod env".to_string()]);
        assert_eq!(
            ctx.detail_path("app@1.0+build"),
            "/organizations/acme/releases/app%401.0%2Bbuild/?project=1&project=2&environment=prod%20env"
        );
        assert_eq!(
            SeriesContext::new("acme").detail_path("v1"),
            "/organizations/acme/releases/v1/"
        );
    }

    proptest! {
        #[test]
        fn prop_order_preserved(days in proptest::collection::vec(1u32..28, 0..20)) {
            let releases: Vec<Release> = days
                .iter()
                .enumerate()
                .map(|(i, day)| Release::new(format!("app@{i}"), format!("2020-03-{day:02}T00:00:00Z")))
                .collect();

            let synthesis = build_overlay_series(&releases, &EmphasisSet::new(), &context());
            prop_assert_eq!(synthesis.series.len(), releases.len());
            for (marker, release) in synthesis.series.iter().zip(&releases) {
                prop_assert_eq!(&marker.version, &release.version);
            }
        }
    }
}
