//! Caller-side TTL cache for repository reads.
//!
//! The planner itself never caches; this wrapper lets a long-running
//! service reuse line and stop reads for a bounded time. Entries may be
//! stale by up to the TTL.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache as MokaCache;

use crate::domain::{AreaContext, Category, Line, LineCode, Stop};

use super::StopRepository;
use super::error::RepositoryError;

/// Cache key for line listings.
type LinesKey = (Category, AreaContext);

/// Configuration for the cache.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// TTL for cached entries.
    pub ttl: Duration,

    /// Maximum number of cached entries per collection.
    pub max_capacity: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(300),
            max_capacity: 1000,
        }
    }
}

/// Repository wrapper caching line listings and stop sets.
///
/// Errors are not cached.
pub struct CachedRepository<R> {
    inner: R,
    lines: MokaCache<LinesKey, Arc<Vec<Line>>>,
    stops: MokaCache<LineCode, Arc<Vec<Stop>>>,
}

impl<R: StopRepository> CachedRepository<R> {
    /// Create a new cached repository.
    pub fn new(inner: R, config: &CacheConfig) -> Self {
        let lines = MokaCache::builder()
            .time_to_live(config.ttl)
            .max_capacity(config.max_capacity)
            .build();
        let stops = MokaCache::builder()
            .time_to_live(config.ttl)
            .max_capacity(config.max_capacity)
            .build();

        Self {
            inner,
            lines,
            stops,
        }
    }

    /// The wrapped repository.
    pub fn inner(&self) -> &R {
        &self.inner
    }

    /// Number of cached stop sets (for monitoring).
    pub fn stop_entry_count(&self) -> u64 {
        self.stops.entry_count()
    }

    /// Invalidate all cached entries.
    pub fn invalidate_all(&self) {
        self.lines.invalidate_all();
        self.stops.invalidate_all();
    }
}

impl<R: StopRepository> StopRepository for CachedRepository<R> {
    async fn fetch_lines(
        &self,
        category: Category,
        area: &AreaContext,
    ) -> Result<Vec<Line>, RepositoryError> {
        let key = (category, area.clone());
        if let Some(cached) = self.lines.get(&key).await {
            return Ok(cached.as_ref().clone());
        }

        let lines = self.inner.fetch_lines(category, area).await?;
        self.lines.insert(key, Arc::new(lines.clone())).await;
        Ok(lines)
    }

    async fn fetch_stops(&self, line: &LineCode) -> Result<Vec<Stop>, RepositoryError> {
        if let Some(cached) = self.stops.get(line).await {
            return Ok(cached.as_ref().clone());
        }

        let stops = self.inner.fetch_stops(line).await?;
        self.stops.insert(line.clone(), Arc::new(stops.clone())).await;
        Ok(stops)
    }

    async fn fetch_line(&self, line: &LineCode) -> Result<Option<Line>, RepositoryError> {
        // Single-line lookups are rare; serve them from the underlying store
        self.inner.fetch_line(line).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::StopCode;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct CountingRepository {
        line_calls: AtomicUsize,
        stop_calls: AtomicUsize,
        fail: bool,
    }

    impl StopRepository for CountingRepository {
        async fn fetch_lines(
            &self,
            category: Category,
            _area: &AreaContext,
        ) -> Result<Vec<Line>, RepositoryError> {
            self.line_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(RepositoryError::Api {
                    status: 503,
                    message: "down".into(),
                });
            }
            Ok(vec![Line::new(LineCode::parse("1").unwrap(), category, "Uno")])
        }

        async fn fetch_stops(&self, line: &LineCode) -> Result<Vec<Stop>, RepositoryError> {
            self.stop_calls.fetch_add(1, Ordering::SeqCst);
            Ok(vec![Stop::new(
                StopCode::parse("a").unwrap(),
                line.clone(),
                None,
                1,
            )])
        }

        async fn fetch_line(&self, _line: &LineCode) -> Result<Option<Line>, RepositoryError> {
            Ok(None)
        }
    }

    #[tokio::test]
    async fn repeated_reads_hit_cache() {
        let repo = CachedRepository::new(CountingRepository::default(), &CacheConfig::default());
        let area = AreaContext::anywhere();
        let code = LineCode::parse("1").unwrap();

        for _ in 0..3 {
            assert_eq!(repo.fetch_lines(Category::Urban, &area).await.unwrap().len(), 1);
            assert_eq!(repo.fetch_stops(&code).await.unwrap().len(), 1);
        }
        assert_eq!(repo.inner().line_calls.load(Ordering::SeqCst), 1);
        assert_eq!(repo.inner().stop_calls.load(Ordering::SeqCst), 1);

        // Different key, new fetch
        repo.fetch_lines(Category::Rural, &area).await.unwrap();
        assert_eq!(repo.inner().line_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn errors_are_not_cached() {
        let inner = CountingRepository {
            fail: true,
            ..Default::default()
        };
        let repo = CachedRepository::new(inner, &CacheConfig::default());
        let area = AreaContext::anywhere();

        assert!(repo.fetch_lines(Category::Urban, &area).await.is_err());
        assert!(repo.fetch_lines(Category::Urban, &area).await.is_err());
        assert_eq!(repo.inner().line_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn invalidate_forces_refetch() {
        let repo = CachedRepository::new(CountingRepository::default(), &CacheConfig::default());
        let code = LineCode::parse("1").unwrap();

        repo.fetch_stops(&code).await.unwrap();
        repo.invalidate_all();
        repo.fetch_stops(&code).await.unwrap();
        assert_eq!(repo.inner().stop_calls.load(Ordering::SeqCst), 2);
    }
}
