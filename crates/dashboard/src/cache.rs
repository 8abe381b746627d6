//! Rendered-view cache.
//!
//! Pages are cached by logical path (e.g. `/dashboard/invoices`). Mutations
//! call [`ViewCache::revalidate`] so the next request renders fresh data.
//! Entries also expire after a TTL, which bounds staleness for writes that
//! bypass this process (such as the CLI).
//!
//! Renders that started before a revalidation must not repopulate the cache.
//! Readers take a [`ViewCache::generation`] before loading data and store
//! through [`ViewCache::insert_if_current`], which drops the view if any
//! revalidation happened in between.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use moka::future::Cache;

/// In-memory cache of rendered HTML, keyed by path.
#[derive(Clone)]
pub struct ViewCache {
    inner: Cache<String, Arc<str>>,
    generation: Arc<AtomicU64>,
}

impl ViewCache {
    /// Create a cache holding at most `capacity` views for `ttl` each.
    #[must_use]
    pub fn new(capacity: u64, ttl: Duration) -> Self {
        let inner = Cache::builder()
            .max_capacity(capacity)
            .time_to_live(ttl)
            .build();
        Self {
            inner,
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    /// The cached view for `path`, if present.
    pub async fn get(&self, path: &str) -> Option<Arc<str>> {
        self.inner.get(path).await
    }

    /// Store a rendered view for `path`.
    pub async fn insert(&self, path: &str, html: impl Into<Arc<str>>) {
        self.inner.insert(path.to_string(), html.into()).await;
    }

    /// Current revalidation generation. Take it before loading the data a
    /// view is rendered from.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Store a rendered view only if no revalidation happened since
    /// `generation` was read. Returns whether the view was kept.
    pub async fn insert_if_current(
        &self,
        path: &str,
        generation: u64,
        html: impl Into<Arc<str>>,
    ) -> bool {
        if self.generation() != generation {
            tracing::debug!(path, "View went stale while rendering, not cached");
            return false;
        }
        self.inner.insert(path.to_string(), html.into()).await;

        // A revalidation may have bumped the generation between the check and
        // the insert. Its own eviction can run before ours lands, so undo it.
        if self.generation() != generation {
            self.inner.invalidate(path).await;
            return false;
        }
        true
    }

    /// Evict the cached view for `path` so the next read re-renders it.
    pub async fn revalidate(&self, path: &str) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.inner.invalidate(path).await;
        tracing::debug!(path, "View cache revalidated");
    }

    /// Whether a view is cached for `path`.
    #[must_use]
    pub fn contains(&self, path: &str) -> bool {
        self.inner.contains_key(path)
    }
}

impl std::fmt::Debug for ViewCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ViewCache")
            .field("entries", &self.inner.entry_count())
            .field("generation", &self.generation())
            .finish()
    }
}
