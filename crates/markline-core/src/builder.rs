//! Release series builder
//!
//! Owns the fetch/cache coordination and the build cycle:
//!
//! ```text
//! update(props) → resolve source ─override──────────────→ synthesize → publish
//!                      │ query
//!                      ↓
//!              same as applied? ─yes→ retained releases ──↑
//!                      │ no
//!                      ↓
//!              cache (memoized) ─hit─────────────────────↑
//!                      │ miss
//!                      ↓
//!              fetch_all_pages → cache insert (memoized) ─↑
//! ```
//!
//! Concurrent memoized loads of one query share a single fetch.
//! Overlapping `update` calls are allowed. A cycle is published only if the
//! props' release source at completion is still the one it loaded, so a slow
//! stale fetch never replaces a newer result.

use crate::config::SeriesConfig;
use crate::error::{SeriesError, SeriesResult};
use crate::props::SeriesProps;
use crate::types::{
    BuildOutcome, BuildResult, CycleId, ReleaseOrigin, ResolvedReleases, SeriesSnapshot,
};
use markline_fetch::{fetch_all_pages, CacheKey, CacheStats, FetchResult, ReleaseCache, ReleaseFetcher};
use markline_model::{build_query, Release};
use markline_series::{build_overlay_series, EmphasisSet, SeriesContext, Synthesis};
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;
use tokio::sync::watch;

/// What a cycle's releases are loaded from
#[derive(Debug, Clone, PartialEq)]
enum ReleaseSource {
    Override(Arc<[Release]>),
    Query(CacheKey),
}

/// Releases of the last published cycle and where they came from
#[derive(Debug)]
struct AppliedReleases {
    source: ReleaseSource,
    releases: Arc<[Release]>,
}

#[derive(Debug, Default)]
struct BuilderState {
    props: SeriesProps,
    /// Source of `props`; `None` when the props could not be resolved
    current_source: Option<ReleaseSource>,
    applied: Option<AppliedReleases>,
}

/// Builds overlay release series from props
pub struct ReleaseSeriesBuilder {
    fetcher: Arc<dyn ReleaseFetcher>,
    cache: ReleaseCache,
    config: SeriesConfig,
    state: Mutex<BuilderState>,
    snapshot: watch::Sender<SeriesSnapshot>,
}

impl ReleaseSeriesBuilder {
    /// Create builder with an injected fetcher and its own empty cache
    #[must_use]
    pub fn new(fetcher: Arc<dyn ReleaseFetcher>, config: SeriesConfig) -> Self {
        let (snapshot, _) = watch::channel(SeriesSnapshot::default());
        Self {
            fetcher,
            cache: config.build_cache(),
            config,
            state: Mutex::new(BuilderState::default()),
            snapshot,
        }
    }

    /// Create builder talking HTTP to `config.api_base`
    ///
    /// # Errors
    /// `FetchError::Request` if the HTTP client cannot be built
    pub fn with_http(config: SeriesConfig) -> FetchResult<Self> {
        let fetcher = Arc::new(config.http_fetcher()?);
        Ok(Self::new(fetcher, config))
    }

    /// Builder configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &SeriesConfig {
        &self.config
    }

    /// Resolve the releases `props` describe
    ///
    /// A non-empty override is returned as is. Otherwise the filters are
    /// turned into a query, served from the cache when `props.memoized` and
    /// the listing is known, or fetched (and cached when memoized).
    ///
    /// # Errors
    /// - `SeriesError::MissingOrganization` when a fetch is needed without one
    /// - `SeriesError::Query` when the filters are invalid
    /// - `SeriesError::Fetch` when the fetch fails; the cache is untouched
    pub async fn get_releases(&self, props: &SeriesProps) -> SeriesResult<ResolvedReleases> {
        let source = self.resolve_source(props)?;
        self.load(&source, props.memoized).await
    }

    /// Run one build cycle for `props`
    ///
    /// `props` become current immediately. Releases are reloaded only when
    /// their source differs from the last applied cycle; emphasis and UTC
    /// changes just re-synthesize.
    ///
    /// # Errors
    /// As [`ReleaseSeriesBuilder::get_releases`]; the error message is also
    /// published to subscribers unless the props moved on meanwhile
    pub async fn update(&self, props: SeriesProps) -> SeriesResult<BuildOutcome> {
        let cycle = CycleId::new();
        let resolved_source = self.resolve_source(&props);

        let retained = {
            let mut state = self.state.lock();
            state.props = props.clone();
            state.current_source = resolved_source.as_ref().ok().cloned();
            match (&resolved_source, &state.applied) {
                (Ok(source), Some(applied)) if applied.source == *source => {
                    Some(Arc::clone(&applied.releases))
                }
                _ => None,
            }
        };

        let source = match resolved_source {
            Ok(source) => source,
            Err(e) => {
                self.publish_error(cycle, &e);
                return Err(e);
            }
        };

        let resolved = match retained {
            Some(releases) => ResolvedReleases {
                releases,
                origin: ReleaseOrigin::Retained,
            },
            None => match self.load(&source, props.memoized).await {
                Ok(resolved) => resolved,
                Err(e) => {
                    if self.state.lock().current_source.as_ref() == Some(&source) {
                        self.publish_error(cycle, &e);
                    }
                    return Err(e);
                }
            },
        };

        let mut state = self.state.lock();
        if state.current_source.as_ref() != Some(&source) {
            tracing::warn!(%cycle, origin = %resolved.origin, "discarding superseded release cycle");
            return Ok(BuildOutcome::Superseded(self.synthesize(cycle, &props, resolved)));
        }

        let result = Arc::new(self.synthesize(cycle, &state.props, resolved));
        state.applied = Some(AppliedReleases {
            source,
            releases: Arc::clone(&result.releases),
        });
        self.snapshot.send_replace(SeriesSnapshot {
            result: Some(Arc::clone(&result)),
            error: None,
        });
        drop(state);

        tracing::info!(
            %cycle,
            origin = %result.origin,
            releases = result.releases.len(),
            markers = result.release_series.len(),
            "applied release cycle"
        );
        Ok(BuildOutcome::Applied(result))
    }

    /// Change the emphasized versions without reloading releases
    ///
    /// Returns the re-synthesized result, or `None` if nothing has been
    /// applied yet (the set still takes effect on the next cycle). A pending
    /// error stays on the snapshot until a cycle is applied.
    pub fn set_emphasized(&self, emphasized: EmphasisSet) -> Option<Arc<BuildResult>> {
        let cycle = CycleId::new();
        let mut state = self.state.lock();
        state.props.emphasize_releases = emphasized;

        let releases = Arc::clone(&state.applied.as_ref()?.releases);
        let resolved = ResolvedReleases {
            releases,
            origin: ReleaseOrigin::Retained,
        };
        let result = Arc::new(self.synthesize(cycle, &state.props, resolved));
        let published = Arc::clone(&result);
        self.snapshot
            .send_modify(|snapshot| snapshot.result = Some(published));
        drop(state);

        tracing::debug!(%cycle, "re-synthesized release series for new emphasis");
        Some(result)
    }

    /// Last applied result
    #[must_use]
    pub fn latest(&self) -> Option<Arc<BuildResult>> {
        self.snapshot.borrow().result.clone()
    }

    /// Receive every applied result and error
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SeriesSnapshot> {
        self.snapshot.subscribe()
    }

    /// Current props
    #[must_use]
    pub fn props(&self) -> SeriesProps {
        self.state.lock().props.clone()
    }

    /// Memoized listing statistics
    pub async fn cache_stats(&self) -> CacheStats {
        self.cache.stats().await
    }

    /// Forget every memoized listing
    pub fn clear_cache(&self) {
        self.cache.invalidate_all();
    }

    fn resolve_source(&self, props: &SeriesProps) -> SeriesResult<ReleaseSource> {
        if let Some(releases) = props.override_releases() {
            return Ok(ReleaseSource::Override(Arc::from(releases)));
        }

        let organization = props
            .organization
            .as_deref()
            .filter(|org| !org.trim().is_empty())
            .ok_or(SeriesError::MissingOrganization)?;
        let query = build_query(&props.filters, self.config.zone)?;
        tracing::debug!(organization, ?query, "resolved release query");

        Ok(ReleaseSource::Query(CacheKey::new(organization, query)))
    }

    async fn load(&self, source: &ReleaseSource, memoize: bool) -> SeriesResult<ResolvedReleases> {
        let key = match source {
            ReleaseSource::Override(releases) => {
                return Ok(ResolvedReleases {
                    releases: Arc::clone(releases),
                    origin: ReleaseOrigin::Override,
                });
            }
            ReleaseSource::Query(key) => key,
        };

        if memoize {
            let listing = self
                .cache
                .try_get_or_insert_with(key.clone(), || self.fetch(key))
                .await?;
            let origin = if listing.loaded {
                ReleaseOrigin::Network
            } else {
                tracing::debug!(organization = %key.organization, "release cache hit");
                ReleaseOrigin::Cache
            };
            return Ok(ResolvedReleases {
                releases: listing.releases,
                origin,
            });
        }

        Ok(ResolvedReleases {
            releases: self.fetch(key).await?,
            origin: ReleaseOrigin::Network,
        })
    }

    async fn fetch(&self, key: &CacheKey) -> FetchResult<Arc<[Release]>> {
        let releases = fetch_all_pages(
            self.fetcher.as_ref(),
            &key.organization,
            &key.query,
            self.config.max_pages,
        )
        .await
        .map_err(|e| {
            tracing::error!(organization = %key.organization, "release fetch failed: {}", e);
            e
        })?;
        Ok(releases.into())
    }

    fn synthesize(&self, cycle: CycleId, props: &SeriesProps, resolved: ResolvedReleases) -> BuildResult {
        let context = SeriesContext::new(props.organization.clone().unwrap_or_default())
            .with_utc(props.utc)
            .with_zone(self.config.zone)
            .with_filters(&props.filters.projects, &props.filters.environments);

        let Synthesis { series, skipped } =
            build_overlay_series(&resolved.releases, &props.emphasize_releases, &context);

        BuildResult {
            cycle,
            origin: resolved.origin,
            releases: resolved.releases,
            release_series: series,
            skipped,
        }
    }

    fn publish_error(&self, cycle: CycleId, error: &SeriesError) {
        tracing::warn!(%cycle, "release cycle failed: {}", error);
        let message = error.to_string();
        self.snapshot.send_modify(|snapshot| snapshot.error = Some(message));
    }
}

impl fmt::Debug for ReleaseSeriesBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReleaseSeriesBuilder")
            .field("cache", &self.cache)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
