//! Testing utilities for markline workspace
//!
//! Shared fixtures and a scriptable fetcher that records every request.

#![allow(missing_docs)]

use async_trait::async_trait;
use markline_fetch::{FetchError, FetchResult, ReleaseFetcher, ReleasePage};
use markline_model::{build_query, CanonicalQuery, DisplayZone, FilterSet, Release};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::time::Duration;

pub mod fixtures {
    use markline_model::Release;

    pub const ORGANIZATION: &str = "org-slug";

    pub fn release() -> Release {
        Release::new("sentry-android-shop@1.2.0", "2020-03-23T00:00:00Z")
    }

    pub fn next_release() -> Release {
        Release::new("sentry-android-shop@1.2.1", "2020-03-24T00:00:00Z")
    }

    pub fn releases() -> Vec<Release> {
        vec![release()]
    }

    pub fn two_releases() -> Vec<Release> {
        vec![release(), next_release()]
    }
}

/// Query as the builder computes it for `filters` in UTC
pub fn query_for(filters: &FilterSet) -> CanonicalQuery {
    build_query(filters, DisplayZone::Utc).unwrap()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub organization: String,
    pub query: CanonicalQuery,
    pub cursor: Option<String>,
}

#[derive(Debug, Default)]
struct Script {
    default_releases: Vec<Release>,
    responses: HashMap<CanonicalQuery, Vec<Release>>,
    delays: HashMap<CanonicalQuery, Duration>,
    pages: Vec<Vec<Release>>,
    failures_remaining: usize,
}

/// Fetcher serving scripted listings
///
/// - every query gets the default releases unless scripted otherwise
/// - per-query delays sleep on the tokio clock, so paused-time tests can
///   order completions
/// - `fail_next(n)` makes the next `n` requests fail with a transport error
/// - `set_pages` serves a multi-page listing linked by `page-N` cursors
#[derive(Debug, Default)]
pub struct RecordingFetcher {
    script: Mutex<Script>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl RecordingFetcher {
    pub fn new(releases: Vec<Release>) -> Self {
        Self {
            script: Mutex::new(Script {
                default_releases: releases,
                ..Script::default()
            }),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn set_response(&self, query: CanonicalQuery, releases: Vec<Release>) {
        self.script.lock().responses.insert(query, releases);
    }

    pub fn set_delay(&self, query: CanonicalQuery, delay: Duration) {
        self.script.lock().delays.insert(query, delay);
    }

    pub fn set_pages(&self, pages: Vec<Vec<Release>>) {
        self.script.lock().pages = pages;
    }

    pub fn fail_next(&self, count: usize) {
        self.script.lock().failures_remaining = count;
    }

    /// Listing fetches (first-page requests)
    pub fn fetch_count(&self) -> usize {
        self.calls.lock().iter().filter(|call| call.cursor.is_none()).count()
    }

    /// Every page request
    pub fn page_count(&self) -> usize {
        self.calls.lock().len()
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().clone()
    }

    /// Queries of listing fetches, in request order
    pub fn queries(&self) -> Vec<CanonicalQuery> {
        self.calls
            .lock()
            .iter()
            .filter(|call| call.cursor.is_none())
            .map(|call| call.query.clone())
            .collect()
    }

    pub fn last_query(&self) -> Option<CanonicalQuery> {
        self.queries().pop()
    }
}

#[async_trait]
impl ReleaseFetcher for RecordingFetcher {
    async fn fetch_page(
        &self,
        organization: &str,
        query: &CanonicalQuery,
        cursor: Option<String>,
    ) -> FetchResult<ReleasePage> {
        self.calls.lock().push(RecordedCall {
            organization: organization.to_string(),
            query: query.clone(),
            cursor: cursor.clone(),
        });

        let (delay, fail, page) = {
            let mut script = self.script.lock();
            let delay = script.delays.get(query).copied();
            let fail = script.failures_remaining > 0;
            if fail {
                script.failures_remaining -= 1;
            }

            let page = if script.pages.is_empty() {
                let releases = script
                    .responses
                    .get(query)
                    .unwrap_or(&script.default_releases)
                    .clone();
                ReleasePage::last(releases)
            } else {
                let index = cursor
                    .as_deref()
                    .and_then(|c| c.strip_prefix("page-"))
                    .and_then(|n| n.parse::<usize>().ok())
                    .unwrap_or(0);
                let releases = script.pages.get(index).cloned().unwrap_or_default();
                if index + 1 < script.pages.len() {
                    ReleasePage::with_next(releases, format!("page-{}", index + 1))
                } else {
                    ReleasePage::last(releases)
                }
            };
            (delay, fail, page)
        };

        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if fail {
            return Err(FetchError::Transport("injected failure".to_string()));
        }
        Ok(page)
    }
}
