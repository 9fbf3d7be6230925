//! Aggregate result cache
//!
//! TTL + generation-based cache for aggregator output. Invalidation is
//! deliberately coarse: one atomic generation bump stales every entry at
//! once, so a visibility toggle can never under-invalidate. The source
//! system tracked dozens of fine-grained invalidation keys by hand and
//! that bookkeeping was itself a source of stale-read bugs.
//!
//! Keys embed the principal's role: a result computed for a member must
//! never be served to an anonymous requester or vice versa.

use crate::config::VisibilityConfig;
use crate::principal::Role;
use dashmap::DashMap;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Cache key for an aggregator call
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    /// Operation name (e.g. "get_popular_items")
    pub op: String,
    /// Requesting principal's role - results are role-scoped
    pub role: Role,
    /// Digest of the serialized call arguments
    pub args_hash: String,
}

impl CacheKey {
    /// Create a key from operation, role and serialized arguments
    pub fn new(op: &str, role: Role, args: &str) -> Self {
        let args_hash = if args.is_empty() {
            "empty".to_string()
        } else {
            use sha2::{Digest, Sha256};
            let mut hasher = Sha256::new();
            hasher.update(args.as_bytes());
            let hash = hasher.finalize();
            hex::encode(&hash[..8])
        };

        Self {
            op: op.to_string(),
            role,
            args_hash,
        }
    }

    /// Convert to storage key string, format: op:role:args_hash
    pub fn to_storage_key(&self) -> String {
        format!("{}:{}:{}", self.op, self.role, self.args_hash)
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}({})", self.op, self.role, self.args_hash)
    }
}

/// Cached entry: serialized result plus the generation it was computed in
struct CacheEntry {
    value: serde_json::Value,
    cached_at: Instant,
    expires_at: Instant,
    generation: u64,
}

/// Statistics snapshot
#[derive(Debug, Clone, Default)]
pub struct CacheStats {
    /// Live entries (including stale ones not yet swept)
    pub entry_count: usize,
    /// Cache hits
    pub hits: u64,
    /// Cache misses (absent, expired, or stale generation)
    pub misses: u64,
    /// Coarse invalidations performed
    pub invalidations: u64,
    /// Evictions due to the entry bound
    pub evictions: u64,
    /// Current generation
    pub generation: u64,
}

impl CacheStats {
    /// Hit rate as percentage
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            (self.hits as f64 / total as f64) * 100.0
        }
    }
}

/// Thread-safe aggregate cache with O(1) coarse invalidation
pub struct AggregateCache {
    entries: DashMap<String, CacheEntry>,
    generation: AtomicU64,
    hits: AtomicU64,
    misses: AtomicU64,
    invalidations: AtomicU64,
    evictions: AtomicU64,
    ttl: Duration,
    max_entries: usize,
}

impl AggregateCache {
    /// Create a cache from configuration
    pub fn new(config: &VisibilityConfig) -> Self {
        Self {
            entries: DashMap::new(),
            generation: AtomicU64::new(0),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            invalidations: AtomicU64::new(0),
            evictions: AtomicU64::new(0),
            ttl: config.cache_ttl,
            max_entries: config.cache_max_entries,
        }
    }

    /// Create with default configuration
    pub fn with_defaults() -> Self {
        Self::new(&VisibilityConfig::default())
    }

    /// Get a cached result. O(1).
    ///
    /// Misses on absence, TTL expiry, or a stale generation.
    pub fn get<T: DeserializeOwned>(&self, key: &CacheKey) -> Option<T> {
        let storage_key = key.to_storage_key();
        let current_gen = self.generation.load(Ordering::Acquire);

        if let Some(entry) = self.entries.get(&storage_key) {
            if entry.generation == current_gen && Instant::now() < entry.expires_at {
                match serde_json::from_value(entry.value.clone()) {
                    Ok(value) => {
                        self.hits.fetch_add(1, Ordering::Relaxed);
                        debug!(key = %storage_key, "Aggregate cache hit");
                        return Some(value);
                    }
                    Err(e) => {
                        warn!(key = %storage_key, error = %e, "Cached payload failed to decode");
                    }
                }
            }
            // Expired, stale generation, or undecodable
            drop(entry);
            self.entries.remove(&storage_key);
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        debug!(key = %storage_key, "Aggregate cache miss");
        None
    }

    /// The current generation. Read paths capture this before touching the
    /// backing store and pass it to `insert`, so a result computed from
    /// pre-invalidation state can never be stamped as fresh.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    /// Store a result computed in `generation`. O(1) amortized.
    ///
    /// `generation` must be the value of `generation()` observed before the
    /// backing reads began. If an invalidation landed while the result was
    /// being computed, the entry is stored already stale and the next `get`
    /// misses - stamping the generation at insert time instead would cache
    /// pre-invalidation data as fresh for a full TTL.
    pub fn insert<T: Serialize>(&self, key: &CacheKey, value: &T, generation: u64) {
        // max_entries == 0 means caching is disabled
        if self.max_entries == 0 {
            return;
        }

        let payload = match serde_json::to_value(value) {
            Ok(payload) => payload,
            Err(e) => {
                warn!(key = %key.to_storage_key(), error = %e, "Result not cacheable");
                return;
            }
        };

        self.evict_until_fits();

        let now = Instant::now();
        let entry = CacheEntry {
            value: payload,
            cached_at: now,
            expires_at: now + self.ttl,
            generation,
        };
        self.entries.insert(key.to_storage_key(), entry);
    }

    /// Invalidate every cached aggregate. O(1).
    ///
    /// Called synchronously on the mutation success path, so a caller that
    /// observed a successful toggle is guaranteed the next aggregator call
    /// recomputes from current state.
    pub fn invalidate_all(&self) -> u64 {
        let generation = self.generation.fetch_add(1, Ordering::AcqRel) + 1;
        self.invalidations.fetch_add(1, Ordering::Relaxed);
        info!(generation = generation, "Aggregate cache invalidated");
        generation
    }

    /// Remove expired and stale-generation entries. Returns removed count.
    pub fn cleanup_expired(&self) -> usize {
        let now = Instant::now();
        let current_gen = self.generation.load(Ordering::Acquire);

        let stale_keys: Vec<String> = self
            .entries
            .iter()
            .filter(|entry| now >= entry.expires_at || entry.generation != current_gen)
            .map(|entry| entry.key().clone())
            .collect();

        let mut removed = 0;
        for key in &stale_keys {
            if self.entries.remove(key).is_some() {
                removed += 1;
            }
        }

        if removed > 0 {
            debug!(removed = removed, "Cleaned up stale cache entries");
        }
        removed
    }

    /// Get a statistics snapshot
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entry_count: self.entries.len(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            invalidations: self.invalidations.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
            generation: self.generation.load(Ordering::Acquire),
        }
    }

    /// Evict oldest entries until one more fits under the bound.
    /// Callers guarantee max_entries > 0.
    fn evict_until_fits(&self) {
        if self.entries.len() < self.max_entries {
            return;
        }

        let mut by_age: Vec<(String, Instant)> = self
            .entries
            .iter()
            .map(|entry| (entry.key().clone(), entry.cached_at))
            .collect();
        by_age.sort_by_key(|(_, cached_at)| *cached_at);

        let to_remove = by_age.len().saturating_sub(self.max_entries - 1);
        for (key, _) in by_age.into_iter().take(to_remove) {
            if self.entries.remove(&key).is_some() {
                self.evictions.fetch_add(1, Ordering::Relaxed);
            }
        }
    }
}

impl Default for AggregateCache {
    fn default() -> Self {
        Self::with_defaults()
    }
}

/// Spawn a background task to periodically sweep stale entries
pub fn spawn_cleanup_task(cache: Arc<AggregateCache>, interval: Duration) {
    tokio::spawn(async move {
        loop {
            tokio::time::sleep(interval).await;
            let removed = cache.cleanup_expired();
            let stats = cache.stats();
            debug!(
                removed = removed,
                entries = stats.entry_count,
                hit_rate = format!("{:.1}%", stats.hit_rate()),
                "Cache cleanup completed"
            );
        }
    });

    info!(
        interval_secs = interval.as_secs(),
        "Cache cleanup task started"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tiny_ttl_cache(ttl_ms: u64) -> AggregateCache {
        AggregateCache::new(&VisibilityConfig {
            cache_ttl: Duration::from_millis(ttl_ms),
            cache_max_entries: 4,
        })
    }

    #[test]
    fn test_key_deterministic_and_role_scoped() {
        let a = CacheKey::new("get_popular_items", Role::Member, r#"{"limit":10}"#);
        let b = CacheKey::new("get_popular_items", Role::Member, r#"{"limit":10}"#);
        let c = CacheKey::new("get_popular_items", Role::Anonymous, r#"{"limit":10}"#);
        let d = CacheKey::new("get_popular_items", Role::Member, r#"{"limit":25}"#);

        assert_eq!(a.to_storage_key(), b.to_storage_key());
        assert_ne!(a.to_storage_key(), c.to_storage_key());
        assert_ne!(a.to_storage_key(), d.to_storage_key());
        assert!(a.to_storage_key().contains("member"));
    }

    #[test]
    fn test_get_set_roundtrip() {
        let cache = AggregateCache::with_defaults();
        let key = CacheKey::new("get_recent_items", Role::Member, r#"{"limit":5}"#);

        assert!(cache.get::<Vec<String>>(&key).is_none());

        cache.insert(
            &key,
            &vec!["intro".to_string(), "guide".to_string()],
            cache.generation(),
        );
        let cached: Vec<String> = cache.get(&key).expect("should hit");
        assert_eq!(cached, vec!["intro", "guide"]);

        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
    }

    #[test]
    fn test_invalidate_all_stales_everything() {
        let cache = AggregateCache::with_defaults();
        let key = CacheKey::new("get_popular_items", Role::Member, "{}");
        cache.insert(&key, &vec![1u32, 2, 3], cache.generation());
        assert!(cache.get::<Vec<u32>>(&key).is_some());

        cache.invalidate_all();
        assert!(cache.get::<Vec<u32>>(&key).is_none(), "stale generation must miss");
    }

    #[test]
    fn test_insert_after_invalidation_is_already_stale() {
        // The read-path interleave: a reader misses, captures the generation
        // and goes to the store; a visibility toggle invalidates while that
        // read is in flight; the reader then caches its pre-toggle result.
        // The entry carries the captured generation, so it must never be
        // served as fresh.
        let cache = AggregateCache::with_defaults();
        let key = CacheKey::new("get_recent_items", Role::Member, r#"{"limit":10}"#);

        let observed = cache.generation();
        assert!(cache.get::<Vec<String>>(&key).is_none());

        cache.invalidate_all();
        cache.insert(&key, &vec!["old-notes".to_string()], observed);

        assert!(
            cache.get::<Vec<String>>(&key).is_none(),
            "pre-toggle result cached across an invalidation must miss"
        );
    }

    #[test]
    fn test_ttl_expiry() {
        let cache = tiny_ttl_cache(20);
        let key = CacheKey::new("get_recent_activity", Role::Admin, "{}");
        cache.insert(&key, &"payload".to_string(), cache.generation());
        assert!(cache.get::<String>(&key).is_some());

        std::thread::sleep(Duration::from_millis(40));
        assert!(cache.get::<String>(&key).is_none(), "expired entry must miss");
    }

    #[test]
    fn test_eviction_bound() {
        let cache = tiny_ttl_cache(60_000);
        for i in 0..10 {
            let key = CacheKey::new("op", Role::Member, &format!("{{\"limit\":{i}}}"));
            cache.insert(&key, &i, cache.generation());
        }
        assert!(cache.stats().entry_count <= 4);
        assert!(cache.stats().evictions > 0);
    }

    #[test]
    fn test_zero_max_entries_disables_caching() {
        let cache = AggregateCache::new(&VisibilityConfig {
            cache_ttl: Duration::from_secs(60),
            cache_max_entries: 0,
        });
        let key = CacheKey::new("get_popular_items", Role::Member, "{}");

        cache.insert(&key, &1u32, cache.generation());

        assert_eq!(cache.stats().entry_count, 0, "nothing may be stored");
        assert!(cache.get::<u32>(&key).is_none());
    }

    #[test]
    fn test_cleanup_task_sweeps_expired_entries() {
        tokio_test::block_on(async {
            let cache = Arc::new(tiny_ttl_cache(10));
            let key = CacheKey::new("get_popular_items", Role::Member, "{}");
            cache.insert(&key, &1u32, cache.generation());

            spawn_cleanup_task(cache.clone(), Duration::from_millis(20));
            tokio::time::sleep(Duration::from_millis(80)).await;

            assert_eq!(cache.stats().entry_count, 0);
        });
    }

    #[test]
    fn test_cleanup_removes_stale_generations() {
        let cache = AggregateCache::with_defaults();
        let key = CacheKey::new("op", Role::Member, "{}");
        cache.insert(&key, &1u32, cache.generation());
        cache.invalidate_all();

        let removed = cache.cleanup_expired();
        assert_eq!(removed, 1);
        assert_eq!(cache.stats().entry_count, 0);
    }
}
