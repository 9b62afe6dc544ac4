//! TTL path cache and the cache-aside finder built on it.
//!
//! Entries expire lazily: a read past `expires_at` is a miss, but nothing
//! walks the map in the background. The only eviction is the capacity
//! limit, applied on insert.

use std::time::Duration;
use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use hashbrown::HashMap;
use parking_lot::RwLock;
use tracing::debug;

use crate::model::{ConnectionPath, FamilyId};
use crate::Result;
use super::PathFinder;

/// Default number of entries a cache holds before evicting.
pub const DEFAULT_CACHE_CAPACITY: usize = 10_000;

/// A cached path with its lifetime.
#[derive(Debug, Clone, PartialEq)]
pub struct CachedPathEntry {
    pub path: ConnectionPath,
    pub cached_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl CachedPathEntry {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}

/// Ordered (from, to): A→B and B→A are separate entries.
type CacheKey = (FamilyId, FamilyId);

// ============================================================================
// PathCache
// ============================================================================

/// Keyed, TTL-bounded store of resolved paths.
///
/// One reader/writer lock guards the map; critical sections are a single
/// lookup or insert.
pub struct PathCache {
    entries: RwLock<HashMap<CacheKey, CachedPathEntry>>,
    ttl: TimeDelta,
    capacity: usize,
}

impl PathCache {
    pub fn new(ttl: Duration) -> Self {
        Self::with_capacity(ttl, DEFAULT_CACHE_CAPACITY)
    }

    pub fn with_capacity(ttl: Duration, capacity: usize) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl: TimeDelta::from_std(ttl).unwrap_or(TimeDelta::MAX),
            capacity: capacity.max(1),
        }
    }

    pub fn ttl(&self) -> TimeDelta {
        self.ttl
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// The cached path for `from → to`, if present and not expired.
    pub fn get(&self, from: &FamilyId, to: &FamilyId) -> Option<ConnectionPath> {
        self.get_at(from, to, Utc::now())
    }

    /// [`PathCache::get`] evaluated at an explicit instant.
    pub fn get_at(&self, from: &FamilyId, to: &FamilyId, now: DateTime<Utc>) -> Option<ConnectionPath> {
        let key = (from.clone(), to.clone());
        let entries = self.entries.read();
        entries
            .get(&key)
            .filter(|entry| !entry.is_expired_at(now))
            .map(|entry| entry.path.clone())
    }

    /// The raw entry, expired or not.
    pub fn entry(&self, from: &FamilyId, to: &FamilyId) -> Option<CachedPathEntry> {
        self.entries.read().get(&(from.clone(), to.clone())).cloned()
    }

    /// Store `path` for `from → to`, replacing any previous entry.
    pub fn set(&self, from: &FamilyId, to: &FamilyId, path: ConnectionPath) {
        self.set_at(from, to, path, Utc::now());
    }

    /// [`PathCache::set`] with an explicit insertion instant.
    pub fn set_at(&self, from: &FamilyId, to: &FamilyId, path: ConnectionPath, now: DateTime<Utc>) {
        let key = (from.clone(), to.clone());
        let entry = CachedPathEntry {
            path,
            cached_at: now,
            expires_at: now.checked_add_signed(self.ttl).unwrap_or(DateTime::<Utc>::MAX_UTC),
        };

        let mut entries = self.entries.write();
        if !entries.contains_key(&key) && entries.len() >= self.capacity {
            entries.retain(|_, e| !e.is_expired_at(now));
            if entries.len() >= self.capacity {
                let oldest = entries
                    .iter()
                    .min_by_key(|(_, e)| e.cached_at)
                    .map(|(k, _)| k.clone());
                if let Some(oldest) = oldest {
                    entries.remove(&oldest);
                }
            }
        }
        entries.insert(key, entry);
    }

    pub fn clear(&self) {
        self.entries.write().clear();
    }
}

// ============================================================================
// CachedPathFinder
// ============================================================================

/// Cache-aside wrapper around another [`PathFinder`].
///
/// Only found paths are cached; a miss that resolves to "no path" is
/// recomputed next time. A hit longer than the requested depth answers
/// "no path". Multi-path queries go straight through.
pub struct CachedPathFinder<F: PathFinder> {
    inner: F,
    cache: PathCache,
}

impl<F: PathFinder> CachedPathFinder<F> {
    pub fn new(inner: F, ttl: Duration) -> Self {
        Self::with_cache(inner, PathCache::new(ttl))
    }

    pub fn with_cache(inner: F, cache: PathCache) -> Self {
        Self { inner, cache }
    }

    pub fn cache(&self) -> &PathCache {
        &self.cache
    }

    pub fn inner(&self) -> &F {
        &self.inner
    }
}

#[async_trait]
impl<F: PathFinder> PathFinder for CachedPathFinder<F> {
    async fn find_path(
        &self,
        from: &FamilyId,
        to: &FamilyId,
        max_depth: usize,
    ) -> Result<Option<ConnectionPath>> {
        if let Some(path) = self.cache.get(from, to) {
            debug!(%from, %to, degree = path.degree, "path cache hit");
            // a cached path is already the shortest; too long means none fits
            return Ok(Some(path).filter(|p| p.degree <= max_depth));
        }

        let path = self.inner.find_path(from, to, max_depth).await?;
        if let Some(path) = &path {
            self.cache.set(from, to, path.clone());
        }
        Ok(path)
    }

    async fn find_multiple_paths(
        &self,
        from: &FamilyId,
        to: &FamilyId,
        max_depth: usize,
        max_paths: usize,
    ) -> Result<Vec<ConnectionPath>> {
        self.inner.find_multiple_paths(from, to, max_depth, max_paths).await
    }
}

// ============================================================================
// Tests
// ============================================================================
