//! Configuration for the visibility core
//!
//! Defaults with environment overrides, no required settings.

use std::time::Duration;

/// Configuration for the aggregate result cache
#[derive(Debug, Clone)]
pub struct VisibilityConfig {
    /// TTL for cached aggregator output (default: 60 seconds).
    /// The cache is a performance layer, not a correctness layer -
    /// visibility toggles invalidate synchronously regardless of TTL.
    pub cache_ttl: Duration,
    /// Maximum cached result sets before oldest-first eviction (default:
    /// 1024). Zero disables caching entirely - every read recomputes.
    pub cache_max_entries: usize,
}

impl Default for VisibilityConfig {
    fn default() -> Self {
        Self {
            cache_ttl: Duration::from_secs(60),
            cache_max_entries: 1024,
        }
    }
}

impl VisibilityConfig {
    /// Create config from environment variables
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("LATTICE_CACHE_TTL_SECS") {
            if let Ok(secs) = val.parse::<u64>() {
                config.cache_ttl = Duration::from_secs(secs);
            }
        }

        if let Ok(val) = std::env::var("LATTICE_CACHE_MAX_ENTRIES") {
            if let Ok(max) = val.parse::<usize>() {
                config.cache_max_entries = max;
            }
        }

        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = VisibilityConfig::default();
        assert_eq!(config.cache_ttl, Duration::from_secs(60));
        assert_eq!(config.cache_max_entries, 1024);
    }
}
