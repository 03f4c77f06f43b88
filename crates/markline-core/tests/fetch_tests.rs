//! Fetch and memoization tests
//!
//! Request shapes and fetch counts observed through a recording fetcher.

use chrono::{TimeZone, Utc};
use markline_core::{
    ReleaseOrigin, ReleaseSeriesBuilder, SeriesConfig, SeriesError, SeriesProps,
    FETCH_FAILED_MESSAGE,
};
use markline_fetch::ReleaseFetcher;
use markline_model::{DisplayZone, FilterSet};
use markline_test_utils::{fixtures, query_for, RecordingFetcher};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::sync::Arc;

fn setup() -> (Arc<RecordingFetcher>, ReleaseSeriesBuilder) {
    let fetcher = Arc::new(RecordingFetcher::new(fixtures::releases()));
    let shared: Arc<dyn ReleaseFetcher> = fetcher.clone();
    let builder = ReleaseSeriesBuilder::new(shared, SeriesConfig::new().with_zone(DisplayZone::Utc));
    (fetcher, builder)
}

fn props() -> SeriesProps {
    SeriesProps::new(fixtures::ORGANIZATION)
}

fn last_query_json(fetcher: &RecordingFetcher) -> serde_json::Value {
    serde_json::to_value(fetcher.last_query().unwrap()).unwrap()
}

#[tokio::test]
async fn test_override_never_fetches() {
    let (fetcher, builder) = setup();

    let outcome = builder
        .update(props().with_releases(fixtures::releases()).with_period("14d"))
        .await
        .unwrap();
    builder
        .update(props().with_releases(fixtures::releases()).with_projects([1, 2]))
        .await
        .unwrap();

    assert_eq!(fetcher.fetch_count(), 0);
    assert_eq!(outcome.result().origin, ReleaseOrigin::Override);
    assert_eq!(outcome.result().release_series.len(), 1);
}

#[tokio::test]
async fn test_override_needs_no_organization() {
    let (fetcher, builder) = setup();

    let outcome = builder
        .update(SeriesProps::default().with_releases(fixtures::releases()))
        .await
        .unwrap();

    assert!(outcome.is_applied());
    assert_eq!(fetcher.fetch_count(), 0);
}

#[tokio::test]
async fn test_empty_override_fetches() {
    let (fetcher, builder) = setup();

    let outcome = builder.update(props().with_releases(Vec::new())).await.unwrap();

    assert_eq!(fetcher.fetch_count(), 1);
    assert_eq!(outcome.result().origin, ReleaseOrigin::Network);
}

#[tokio::test]
async fn test_initial_build_fetches_once() {
    let (fetcher, builder) = setup();

    let outcome = builder.update(props()).await.unwrap();

    assert_eq!(fetcher.fetch_count(), 1);
    assert_eq!(fetcher.calls()[0].organization, fixtures::ORGANIZATION);
    assert_eq!(last_query_json(&fetcher), json!({}));
    assert_eq!(&*outcome.result().releases, fixtures::releases().as_slice());
}

#[tokio::test]
async fn test_project_query() {
    let (fetcher, builder) = setup();
    builder.update(props().with_projects([1, 2])).await.unwrap();

    assert_eq!(last_query_json(&fetcher), json!({"project": [1, 2]}));
}

#[tokio::test]
async fn test_environment_query() {
    let (fetcher, builder) = setup();
    builder.update(props().with_environments(["dev", "test"])).await.unwrap();

    assert_eq!(last_query_json(&fetcher), json!({"environment": ["dev", "test"]}));
}

#[tokio::test]
async fn test_date_string_query() {
    let (fetcher, builder) = setup();
    builder
        .update(props().with_range("2020-01-01", "2020-01-31"))
        .await
        .unwrap();

    assert_eq!(
        last_query_json(&fetcher),
        json!({"start": "2020-01-01T00:00:00", "end": "2020-01-31T00:00:00"})
    );
}

#[tokio::test]
async fn test_date_instant_query() {
    let (fetcher, builder) = setup();
    let start = Utc.with_ymd_and_hms(2020, 1, 1, 12, 13, 14).unwrap();
    let end = Utc.with_ymd_and_hms(2020, 1, 31, 14, 15, 16).unwrap();
    builder.update(props().with_range(start, end)).await.unwrap();

    assert_eq!(
        last_query_json(&fetcher),
        json!({"start": "2020-01-01T12:13:14", "end": "2020-01-31T14:15:16"})
    );
}

#[tokio::test]
async fn test_period_query() {
    let (fetcher, builder) = setup();
    builder.update(props().with_period("14d")).await.unwrap();

    assert_eq!(last_query_json(&fetcher), json!({"statsPeriod": "14d"}));
}

#[tokio::test]
async fn test_range_wins_over_period() {
    let (fetcher, builder) = setup();
    builder
        .update(
            props()
                .with_period("14d")
                .with_range("2020-01-01", "2020-01-31"),
        )
        .await
        .unwrap();

    let query = last_query_json(&fetcher);
    assert!(query.get("statsPeriod").is_none());
    assert_eq!(query["start"], "2020-01-01T00:00:00");
}

#[tokio::test]
async fn test_invalid_date_never_fetches() {
    let (fetcher, builder) = setup();

    let err = builder
        .update(props().with_range("not a date", "2020-01-31"))
        .await
        .unwrap_err();

    assert!(matches!(err, SeriesError::Query(_)));
    assert_eq!(fetcher.fetch_count(), 0);
    assert!(builder.subscribe().borrow().has_error());
}

#[tokio::test]
async fn test_each_filter_change_fetches_once() {
    let (fetcher, builder) = setup();

    builder.update(props().with_period("14d")).await.unwrap();
    assert_eq!(fetcher.fetch_count(), 1);

    builder.update(props().with_period("7d")).await.unwrap();
    assert_eq!(fetcher.fetch_count(), 2);

    builder
        .update(props().with_range("2020-01-01", "2020-01-31"))
        .await
        .unwrap();
    assert_eq!(fetcher.fetch_count(), 3);

    builder
        .update(props().with_range("2020-01-01", "2020-01-31").with_projects([2]))
        .await
        .unwrap();
    assert_eq!(fetcher.fetch_count(), 4);

    // unchanged filters
    builder
        .update(props().with_range("2020-01-01", "2020-01-31").with_projects([2]))
        .await
        .unwrap();
    assert_eq!(fetcher.fetch_count(), 4);
}

#[tokio::test]
async fn test_memoized_revisit_uses_cache() {
    let (fetcher, builder) = setup();
    let a = props().with_period("14d").with_memoized(true);
    let b = props().with_period("7d").with_memoized(true);

    builder.update(a.clone()).await.unwrap();
    builder.update(b).await.unwrap();
    let revisit = builder.update(a).await.unwrap();

    assert_eq!(fetcher.fetch_count(), 2);
    assert_eq!(revisit.result().origin, ReleaseOrigin::Cache);
    assert_eq!(builder.cache_stats().await.entry_count, 2);
}

#[tokio::test]
async fn test_unmemoized_revisit_refetches() {
    let (fetcher, builder) = setup();
    let a = props().with_period("14d");
    let b = props().with_period("7d");

    builder.update(a.clone()).await.unwrap();
    builder.update(b).await.unwrap();
    let revisit = builder.update(a).await.unwrap();

    assert_eq!(fetcher.fetch_count(), 3);
    assert_eq!(revisit.result().origin, ReleaseOrigin::Network);
    assert_eq!(builder.cache_stats().await.entry_count, 0);
}

#[tokio::test]
async fn test_cache_keyed_by_organization() {
    let (fetcher, builder) = setup();

    builder
        .update(SeriesProps::new("acme").with_period("14d").with_memoized(true))
        .await
        .unwrap();
    builder
        .update(SeriesProps::new("globex").with_period("14d").with_memoized(true))
        .await
        .unwrap();

    assert_eq!(fetcher.fetch_count(), 2);
}

#[tokio::test]
async fn test_failure_leaves_cache_empty() {
    let (fetcher, builder) = setup();
    let memoized = props().with_period("14d").with_memoized(true);
    let mut rx = builder.subscribe();

    fetcher.fail_next(1);
    let err = builder.update(memoized.clone()).await.unwrap_err();

    assert!(matches!(err, SeriesError::Fetch(_)));
    assert!(err.is_retryable());
    assert_eq!(builder.cache_stats().await.entry_count, 0);
    assert!(builder.latest().is_none());

    let snapshot = rx.borrow_and_update().clone();
    assert!(snapshot.error.unwrap().starts_with(FETCH_FAILED_MESSAGE));

    let outcome = builder.update(memoized).await.unwrap();
    assert_eq!(fetcher.fetch_count(), 2);
    assert_eq!(outcome.result().origin, ReleaseOrigin::Network);
    assert_eq!(builder.cache_stats().await.entry_count, 1);
    assert!(rx.borrow_and_update().error.is_none());
}

#[tokio::test]
async fn test_failure_keeps_previous_result() {
    let (fetcher, builder) = setup();

    let first = builder.update(props().with_period("14d")).await.unwrap();
    fetcher.fail_next(1);
    builder.update(props().with_period("7d")).await.unwrap_err();

    let latest = builder.latest().unwrap();
    assert_eq!(latest.cycle, first.result().cycle);
    assert!(builder.subscribe().borrow().has_error());
}

#[tokio::test]
async fn test_reemphasis_keeps_pending_error() {
    let (fetcher, builder) = setup();

    builder.update(props().with_period("14d")).await.unwrap();
    fetcher.fail_next(1);
    builder.update(props().with_period("7d")).await.unwrap_err();

    let result = builder
        .set_emphasized(["sentry-android-shop@1.2.0".to_string()].into())
        .unwrap();

    let snapshot = builder.subscribe().borrow().clone();
    assert!(snapshot.error.unwrap().starts_with(FETCH_FAILED_MESSAGE));
    assert_eq!(snapshot.result.unwrap().cycle, result.cycle);
    assert!(result.release_series[0].emphasized);
    assert_eq!(fetcher.fetch_count(), 2);
}

#[tokio::test]
async fn test_missing_organization() {
    let (fetcher, builder) = setup();

    let err = builder
        .update(SeriesProps::default().with_period("14d"))
        .await
        .unwrap_err();

    assert!(matches!(err, SeriesError::MissingOrganization));
    assert!(!err.is_retryable());
    assert_eq!(fetcher.fetch_count(), 0);
}

#[tokio::test]
async fn test_pages_concatenated_in_order() {
    let (fetcher, builder) = setup();
    fetcher.set_pages(vec![
        vec![fixtures::release()],
        vec![fixtures::next_release()],
    ]);

    let outcome = builder.update(props()).await.unwrap();

    assert_eq!(&*outcome.result().releases, fixtures::two_releases().as_slice());
    assert_eq!(fetcher.fetch_count(), 1);
    assert_eq!(fetcher.page_count(), 2);
    assert_eq!(fetcher.calls()[1].cursor.as_deref(), Some("page-1"));
}

#[tokio::test]
async fn test_page_limit_truncates() {
    let fetcher = Arc::new(RecordingFetcher::new(Vec::new()));
    fetcher.set_pages(vec![
        vec![fixtures::release()],
        vec![fixtures::next_release()],
        vec![fixtures::release()],
    ]);
    let shared: Arc<dyn ReleaseFetcher> = fetcher.clone();
    let builder = ReleaseSeriesBuilder::new(
        shared,
        SeriesConfig::new().with_zone(DisplayZone::Utc).with_max_pages(2),
    );

    let outcome = builder.update(props()).await.unwrap();

    assert_eq!(outcome.result().releases.len(), 2);
    assert_eq!(fetcher.page_count(), 2);
}

#[tokio::test]
async fn test_get_releases_matches_update_query() {
    let (fetcher, builder) = setup();
    let filters = FilterSet::new().with_projects([3]).with_period("24h");

    let resolved = builder
        .get_releases(&props().with_filters(filters.clone()))
        .await
        .unwrap();

    assert_eq!(resolved.origin, ReleaseOrigin::Network);
    assert_eq!(fetcher.last_query(), Some(query_for(&filters)));
}
