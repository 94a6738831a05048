//! Per-agent path cache and replanning throttle

use serde::{Deserialize, Serialize};

use crate::core::types::Vec2;
use crate::spatial::grid::GridCell;

/// Cache key: (start cell, goal cell)
pub type PathKey = (GridCell, GridCell);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    pub hits: u32,
    pub searches: u32,
    pub failures: u32,
    pub throttled: u32,
}

/// Holds the last successful plan for one agent.
///
/// Failed searches only update the throttle timestamp; they never replace
/// the cached path.
#[derive(Debug, Clone, Default)]
pub struct PathCache {
    key: Option<PathKey>,
    path: Vec<Vec2>,
    last_search: Option<f64>,
    pub stats: CacheStats,
}

impl PathCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lookup(&mut self, key: PathKey) -> Option<&[Vec2]> {
        if self.key == Some(key) {
            self.stats.hits += 1;
            Some(&self.path)
        } else {
            None
        }
    }

    /// True while the minimum interval since the last search has not passed
    pub fn throttled(&mut self, now: f64, interval: f32) -> bool {
        let blocked = self
            .last_search
            .is_some_and(|t| now - t < interval as f64);
        if blocked {
            self.stats.throttled += 1;
        }
        blocked
    }

    pub fn record_search(&mut self, now: f64) {
        self.last_search = Some(now);
        self.stats.searches += 1;
    }

    pub fn record_failure(&mut self) {
        self.stats.failures += 1;
    }

    pub fn store(&mut self, key: PathKey, path: Vec<Vec2>) {
        self.key = Some(key);
        self.path = path;
    }

    pub fn cached_key(&self) -> Option<PathKey> {
        self.key
    }

    pub fn clear(&mut self) {
        self.key = None;
        self.path.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(a: i32, b: i32) -> PathKey {
        (GridCell::new(a, a), GridCell::new(b, b))
    }

    #[test]
    fn test_lookup_requires_same_key() {
        let mut cache = PathCache::new();
        cache.store(key(0, 3), vec![Vec2::new(1.0, 1.0)]);
        assert!(cache.lookup(key(0, 3)).is_some());
        assert!(cache.lookup(key(1, 3)).is_none());
        assert_eq!(cache.stats.hits, 1);
    }

    #[test]
    fn test_throttle_window() {
        let mut cache = PathCache::new();
        assert!(!cache.throttled(0.0, 0.5));
        cache.record_search(0.0);
        assert!(cache.throttled(0.2, 0.5));
        assert!(!cache.throttled(0.5, 0.5));
        assert_eq!(cache.stats.throttled, 1);
    }
}
