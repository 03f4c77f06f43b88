//! Release fetcher seam
//!
//! [`ReleaseFetcher`] is the boundary to the release-listing endpoint. The
//! builder only ever talks to this trait, so tests inject their own.

use crate::error::FetchResult;
use async_trait::async_trait;
use markline_model::{CanonicalQuery, Release};

/// One page of a release listing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReleasePage {
    /// Releases on this page, in response order
    pub releases: Vec<Release>,
    /// Cursor for the following page, when there is one
    pub next_cursor: Option<String>,
}

impl ReleasePage {
    /// Final page
    #[inline]
    #[must_use]
    pub fn last(releases: Vec<Release>) -> Self {
        Self {
            releases,
            next_cursor: None,
        }
    }

    /// Page followed by `cursor`
    #[inline]
    #[must_use]
    pub fn with_next(releases: Vec<Release>, cursor: impl Into<String>) -> Self {
        Self {
            releases,
            next_cursor: Some(cursor.into()),
        }
    }
}

/// Source of release pages
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReleaseFetcher: Send + Sync {
    /// Fetch one page of releases matching `query`
    ///
    /// `cursor` is `None` for the first page.
    async fn fetch_page(
        &self,
        organization: &str,
        query: &CanonicalQuery,
        cursor: Option<String>,
    ) -> FetchResult<ReleasePage>;
}

/// Fetch every page of a listing, concatenated in page order
///
/// Stops after `max_pages` requests even if more pages remain.
///
/// # Errors
/// The first page failure; pages fetched before it are discarded
pub async fn fetch_all_pages<F>(
    fetcher: &F,
    organization: &str,
    query: &CanonicalQuery,
    max_pages: usize,
) -> FetchResult<Vec<Release>>
where
    F: ReleaseFetcher + ?Sized,
{
    let mut releases = Vec::new();
    let mut cursor = None;

    for page_number in 1..=max_pages.max(1) {
        let page = fetcher.fetch_page(organization, query, cursor.take()).await?;
        tracing::debug!(page = page_number, count = page.releases.len(), "fetched release page");
        releases.extend(page.releases);

        match page.next_cursor {
            Some(next) if page_number < max_pages => cursor = Some(next),
            Some(_) => {
                tracing::warn!(max_pages, organization, "release listing truncated at page limit");
                break;
            }
            None => break,
        }
    }

    Ok(releases)
}
