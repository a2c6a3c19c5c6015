//! Bounded in-memory cache for movie detail records
//!
//! Least-recently-used eviction where both reads and writes count as use.
//! All access goes through a single lock, so concurrent lookups for different
//! ids can neither lose updates nor push the cache past its capacity.

use std::num::NonZeroUsize;

use lru::LruCache;
use parking_lot::Mutex;

use crate::catalog::MovieDetails;
use crate::config::CacheConfig;

/// Cache statistics for monitoring
#[derive(Debug, Clone, PartialEq)]
pub struct CacheStatistics {
    pub entries: usize,
    pub capacity: usize,
    pub hit_count: u64,
    pub miss_count: u64,
    pub eviction_count: u64,
    pub hit_rate: f64,
}

impl CacheStatistics {
    /// Calculate hit rate as a fraction of all lookups
    pub fn calculate_hit_rate(hit_count: u64, miss_count: u64) -> f64 {
        if hit_count + miss_count == 0 {
            0.0
        } else {
            (hit_count as f64) / ((hit_count + miss_count) as f64)
        }
    }
}

struct CacheInner {
    entries: LruCache<u32, MovieDetails>,
    hit_count: u64,
    miss_count: u64,
    eviction_count: u64,
}

/// LRU cache of movie details keyed by movie id.
pub struct DetailCache {
    inner: Mutex<CacheInner>,
}

impl DetailCache {
    /// Creates a cache holding at most `capacity` entries.
    ///
    /// A zero capacity is raised to one.
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);

        Self {
            inner: Mutex::new(CacheInner {
                entries: LruCache::new(capacity),
                hit_count: 0,
                miss_count: 0,
                eviction_count: 0,
            }),
        }
    }

    pub fn from_config(config: &CacheConfig) -> Self {
        Self::new(config.details_capacity)
    }

    /// Returns the cached record and marks it most recently used.
    ///
    /// A miss has no effect on recency.
    pub fn get(&self, id: u32) -> Option<MovieDetails> {
        let mut inner = self.inner.lock();

        match inner.entries.get(&id).cloned() {
            Some(details) => {
                inner.hit_count += 1;
                tracing::debug!("Detail cache hit for movie {id}");
                Some(details)
            }
            None => {
                inner.miss_count += 1;
                tracing::debug!("Detail cache miss for movie {id}");
                None
            }
        }
    }

    /// Inserts or overwrites a record, evicting the least recently used entry
    /// when the cache is full.
    pub fn put(&self, id: u32, details: MovieDetails) {
        let mut inner = self.inner.lock();

        if let Some((evicted_id, _)) = inner.entries.push(id, details) {
            if evicted_id != id {
                inner.eviction_count += 1;
                tracing::debug!("Evicted movie {evicted_id} from detail cache");
            }
        }
    }

    /// Removes every entry. Statistics are kept.
    pub fn clear(&self) {
        let mut inner = self.inner.lock();
        let cleared = inner.entries.len();
        inner.entries.clear();
        tracing::debug!("Cleared {cleared} entries from detail cache");
    }

    /// Whether `id` is cached, without touching recency or statistics.
    pub fn contains(&self, id: u32) -> bool {
        self.inner.lock().entries.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.inner.lock().entries.cap().get()
    }

    pub fn statistics(&self) -> CacheStatistics {
        let inner = self.inner.lock();

        CacheStatistics {
            entries: inner.entries.len(),
            capacity: inner.entries.cap().get(),
            hit_count: inner.hit_count,
            miss_count: inner.miss_count,
            eviction_count: inner.eviction_count,
            hit_rate: CacheStatistics::calculate_hit_rate(inner.hit_count, inner.miss_count),
        }
    }
}

impl Default for DetailCache {
    fn default() -> Self {
        Self::from_config(&CacheConfig::default())
    }
}

impl std::fmt::Debug for DetailCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.lock();
        f.debug_struct("DetailCache")
            .field("entries", &inner.entries.len())
            .field("capacity", &inner.entries.cap())
            .finish()
    }
}
