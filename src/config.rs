//! Resolver configuration.
//!
//! Defaults match a small deployment: caching on with a five-minute TTL,
//! eight batch workers, paths of up to four hops.

use std::str::FromStr;
use std::time::Duration;
use serde::{Deserialize, Serialize};

use crate::pathfinding::cache::DEFAULT_CACHE_CAPACITY;
use crate::pathfinding::parallel::DEFAULT_MAX_WORKERS;
use crate::service::{DEFAULT_PATH_DEPTH, MAX_PATH_DEPTH};
use crate::{Error, Result};

pub const ENV_CACHE_ENABLED: &str = "KINSHIP_CACHE_ENABLED";
pub const ENV_CACHE_TTL_SECS: &str = "KINSHIP_CACHE_TTL_SECS";
pub const ENV_MAX_WORKERS: &str = "KINSHIP_MAX_WORKERS";
pub const ENV_MAX_PATH_DEPTH: &str = "KINSHIP_MAX_PATH_DEPTH";

/// How the resolution service is wired.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Wrap the path finder in a TTL cache.
    pub cache_enabled: bool,
    pub cache_ttl_secs: u64,
    pub cache_capacity: usize,
    /// Concurrency bound for batch resolution.
    pub max_workers: usize,
    /// Depth used when a caller does not pass one.
    pub default_max_depth: usize,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            cache_enabled: true,
            cache_ttl_secs: 300,
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            max_workers: DEFAULT_MAX_WORKERS,
            default_max_depth: DEFAULT_PATH_DEPTH,
        }
    }
}

impl ResolverConfig {
    /// Read overrides from `KINSHIP_*` environment variables.
    ///
    /// Unset or unparsable variables keep their default.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`ResolverConfig::from_env`] with an injectable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let lookup = &lookup;

        Self {
            cache_enabled: parsed(lookup, ENV_CACHE_ENABLED).unwrap_or(defaults.cache_enabled),
            cache_ttl_secs: parsed(lookup, ENV_CACHE_TTL_SECS).unwrap_or(defaults.cache_ttl_secs),
            cache_capacity: defaults.cache_capacity,
            max_workers: parsed(lookup, ENV_MAX_WORKERS).unwrap_or(defaults.max_workers),
            default_max_depth: parsed(lookup, ENV_MAX_PATH_DEPTH).unwrap_or(defaults.default_max_depth),
        }
        .normalized()
    }

    /// Parse a JSON document; missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| Error::Config(format!("invalid resolver config: {e}")))?;
        Ok(config.normalized())
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn with_cache(mut self, enabled: bool) -> Self {
        self.cache_enabled = enabled;
        self
    }

    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl_secs = ttl.as_secs();
        self
    }

    pub fn with_max_workers(mut self, workers: usize) -> Self {
        self.max_workers = workers.max(1);
        self
    }

    /// Keep worker count and depth inside the ranges the service accepts.
    fn normalized(mut self) -> Self {
        self.max_workers = self.max_workers.max(1);
        self.cache_capacity = self.cache_capacity.max(1);
        self.default_max_depth = self.default_max_depth.clamp(1, MAX_PATH_DEPTH);
        self
    }
}

fn parsed<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    lookup(key).and_then(|v| v.trim().parse().ok())
}
