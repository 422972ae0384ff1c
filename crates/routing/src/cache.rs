//! Short-TTL route cache.
//!
//! Remembers which pool won the last full fan-out for a pair. Only the choice
//! of pool is reused; amounts are always recomputed from live state.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use swap_router_domain::{PoolSnapshot, Route, TokenPair};
use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::debug;

/// A remembered winning route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteCacheEntry {
    pub route: Route,
    /// Pool state the route was selected from.
    pub snapshot: PoolSnapshot,
    pub created_at: Instant,
}

impl RouteCacheEntry {
    pub fn age(&self) -> Duration {
        self.created_at.elapsed()
    }
}

/// Outcome of a cache read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheLookup {
    /// Entry within the TTL.
    Fresh(RouteCacheEntry),
    /// Entry past the TTL; it must not be used to skip probing.
    Stale { age: Duration },
    Miss,
}

/// Route cache keyed by unordered token pair. Writes are last-writer-wins.
#[derive(Debug, Clone)]
pub struct RouteCache {
    entries: Arc<RwLock<HashMap<TokenPair, RouteCacheEntry>>>,
    ttl: Duration,
}

impl RouteCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub async fn lookup(&self, pair: &TokenPair) -> CacheLookup {
        match self.entries.read().await.get(pair) {
            Some(entry) => {
                let age = entry.age();
                if age < self.ttl {
                    CacheLookup::Fresh(entry.clone())
                } else {
                    CacheLookup::Stale { age }
                }
            }
            None => CacheLookup::Miss,
        }
    }

    /// Stores the winner of a full fan-out, replacing any previous entry.
    ///
    /// Expired entries of other pairs are evicted under the same write lock.
    pub async fn insert(&self, pair: TokenPair, route: Route, snapshot: PoolSnapshot) {
        debug!(pair = %pair, route = %route, "caching route");
        let entry = RouteCacheEntry {
            route,
            snapshot,
            created_at: Instant::now(),
        };
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, existing| existing.age() < self.ttl);
        let evicted = before - entries.len();
        if evicted > 0 {
            debug!(evicted, "evicted expired routes");
        }
        entries.insert(pair, entry);
    }

    /// Drops the entry for a pair. Returns whether one existed.
    pub async fn invalidate(&self, pair: &TokenPair) -> bool {
        self.entries.write().await.remove(pair).is_some()
    }

    /// Removes entries past the TTL and returns how many were dropped.
    pub async fn purge_expired(&self) -> usize {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| entry.age() < self.ttl);
        let purged = before - entries.len();
        if purged > 0 {
            debug!(purged, "purged expired routes");
        }
        purged
    }

    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}
