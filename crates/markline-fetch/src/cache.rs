//! Per-query release cache using moka
//!
//! Memoizes release listings by organization and canonical query so that
//! returning to a previously seen filter state does not hit the network.

use crate::error::{FetchError, FetchResult};
use markline_model::{CanonicalQuery, Release};
use moka::future::Cache;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// Statistics for cache monitoring
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Number of entries in cache
    pub entry_count: u64,
}

/// Cache key: the query alone is ambiguous across organizations
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    /// Organization slug
    pub organization: String,
    /// Canonical request parameters
    pub query: CanonicalQuery,
}

impl CacheKey {
    /// Create key
    #[inline]
    #[must_use]
    pub fn new(organization: impl Into<String>, query: CanonicalQuery) -> Self {
        Self {
            organization: organization.into(),
            query,
        }
    }
}

/// Listing served by [`ReleaseCache::try_get_or_insert_with`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedListing {
    /// Releases in listing order
    pub releases: Arc<[Release]>,
    /// `true` when this call ran the loader; `false` for a hit, or for a
    /// caller that waited on another caller's load
    pub loaded: bool,
}

/// Release listings keyed by [`CacheKey`]
///
/// Stores:
/// - one listing per distinct key, from its first successful load
/// - LRU-style eviction past `max_capacity`
/// - optional time-based expiration (TTL)
#[derive(Debug, Clone)]
pub struct ReleaseCache {
    inner: Cache<CacheKey, Arc<[Release]>>,
}

impl ReleaseCache {
    /// Create new cache with max capacity
    #[inline]
    #[must_use]
    pub fn new(max_capacity: u64) -> Self {
        Self {
            inner: Cache::new(max_capacity),
        }
    }

    /// Create cache with time-based expiration
    #[inline]
    #[must_use]
    pub fn with_ttl(max_capacity: u64, ttl: Duration) -> Self {
        Self {
            inner: Cache::builder()
                .max_capacity(max_capacity)
                .time_to_live(ttl)
                .build(),
        }
    }

    /// Get a listing, or load and store it
    ///
    /// Concurrent calls for the same key share one load. A failed load is
    /// not stored, so the next call loads again.
    ///
    /// # Errors
    /// The loader's error; callers that waited on another caller's failed
    /// load receive it as [`FetchError::Shared`]
    pub async fn try_get_or_insert_with<F, Fut>(
        &self,
        key: CacheKey,
        load: F,
    ) -> FetchResult<CachedListing>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = FetchResult<Arc<[Release]>>>,
    {
        let entry = self
            .inner
            .entry(key)
            .or_try_insert_with(load())
            .await
            .map_err(FetchError::from)?;

        Ok(CachedListing {
            loaded: entry.is_fresh(),
            releases: entry.into_value(),
        })
    }

    /// Invalidate all listings
    #[inline]
    pub fn invalidate_all(&self) {
        self.inner.invalidate_all();
    }

    /// Get cache statistics, after applying pending maintenance
    pub async fn stats(&self) -> CacheStats {
        self.inner.run_pending_tasks().await;
        CacheStats {
            entry_count: self.inner.entry_count(),
        }
    }
}

impl Default for ReleaseCache {
    /// Create cache with default capacity (256 listings)
    fn default() -> Self {
        Self::new(256)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use markline_model::{build_query, DisplayZone, FilterSet};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn key(org: &str, period: &str) -> CacheKey {
        let query = build_query(&FilterSet::new().with_period(period), DisplayZone::Utc).unwrap();
        CacheKey::new(org, query)
    }

    fn listing(version: &str) -> Arc<[Release]> {
        vec![Release::new(version, "2020-03-23T00:00:00Z")].into()
    }

    async fn load(cache: &ReleaseCache, key: CacheKey, version: &str) -> CachedListing {
        let releases = listing(version);
        cache
            .try_get_or_insert_with(key, || async move { Ok(releases) })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn loads_once_per_key() {
        let cache = ReleaseCache::new(10);

        let first = load(&cache, key("acme", "14d"), "a@1").await;
        let second = load(&cache, key("acme", "14d"), "a@2").await;
        let other = load(&cache, key("acme", "7d"), "a@3").await;

        assert!(first.loaded);
        assert!(!second.loaded);
        assert_eq!(second.releases, first.releases);
        assert!(other.loaded);
        assert_eq!(cache.stats().await.entry_count, 2);
    }

    #[tokio::test]
    async fn organization_is_part_of_key() {
        let cache = ReleaseCache::new(10);
        load(&cache, key("acme", "14d"), "a@1").await;

        assert!(load(&cache, key("globex", "14d"), "g@1").await.loaded);
    }

    #[tokio::test]
    async fn invalidate_all_forces_reload() {
        let cache = ReleaseCache::default();
        load(&cache, key("acme", "14d"), "a@1").await;

        cache.invalidate_all();
        let reloaded = load(&cache, key("acme", "14d"), "a@2").await;
        assert!(reloaded.loaded);
        assert_eq!(reloaded.releases[0].version, "a@2");
    }

    #[tokio::test]
    async fn concurrent_loads_share_one_call() {
        let cache = ReleaseCache::new(10);
        let calls = AtomicUsize::new(0);
        let calls = &calls;
        let loader = move || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            tokio::task::yield_now().await;
            Ok(listing("a@1"))
        };

        let (a, b) = tokio::join!(
            cache.try_get_or_insert_with(key("acme", "14d"), loader),
            cache.try_get_or_insert_with(key("acme", "14d"), loader),
        );

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_ne!(a.unwrap().loaded, b.unwrap().loaded);
    }

    #[tokio::test]
    async fn failed_load_not_cached() {
        let cache = ReleaseCache::new(10);

        let err = cache
            .try_get_or_insert_with(key("acme", "14d"), || async {
                Err(FetchError::status(500, "boom"))
            })
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Status { status: 500, .. }));
        assert_eq!(cache.stats().await.entry_count, 0);

        assert!(load(&cache, key("acme", "14d"), "a@1").await.loaded);
    }
}
