//! Encoded tile cache with invalidation
//!
//! Invalidated tiles are not dropped; they move to a stale set and serve as
//! the fallback when re-rendering the tile fails.

use std::collections::HashMap;
use std::sync::Arc;

use crate::render::TileRequest;

/// Encoded PNG bytes shared between the cache and responses
pub type TilePng = Arc<[u8]>;

#[derive(Debug, Default)]
pub struct TileCache {
    fresh: HashMap<TileRequest, TilePng>,
    stale: HashMap<TileRequest, TilePng>,
}

impl TileCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Up-to-date tile, if cached
    pub fn get(&self, request: TileRequest) -> Option<TilePng> {
        self.fresh.get(&request).cloned()
    }

    /// Last image of a tile that has since been invalidated
    pub fn stale(&self, request: TileRequest) -> Option<TilePng> {
        self.stale.get(&request).cloned()
    }

    pub fn insert(&mut self, request: TileRequest, png: TilePng) {
        self.stale.remove(&request);
        self.fresh.insert(request, png);
    }

    /// Mark tiles out of date; returns how many cached tiles were affected
    pub fn invalidate<I>(&mut self, tiles: I) -> usize
    where
        I: IntoIterator<Item = TileRequest>,
    {
        let mut count = 0;
        for request in tiles {
            if let Some(png) = self.fresh.remove(&request) {
                self.stale.insert(request, png);
                count += 1;
            }
        }
        count
    }

    /// Forget everything, including stale fallbacks
    pub fn clear(&mut self) {
        self.fresh.clear();
        self.stale.clear();
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.fresh.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.fresh.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png(byte: u8) -> TilePng {
        Arc::from(vec![byte; 4])
    }

    #[test]
    fn test_insert_and_get() {
        let mut cache = TileCache::new();
        let request = TileRequest::new(3, 0, 1);
        assert!(cache.get(request).is_none());
        cache.insert(request, png(1));
        assert_eq!(cache.get(request).as_deref(), Some(&[1u8, 1, 1, 1][..]));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_invalidate_moves_to_stale() {
        let mut cache = TileCache::new();
        let a = TileRequest::new(1, 0, 0);
        let b = TileRequest::new(1, 1, 0);
        cache.insert(a, png(1));
        cache.insert(b, png(2));

        // Uncached tiles are ignored
        assert_eq!(cache.invalidate([a, TileRequest::new(1, 5, 5)]), 1);
        assert!(cache.get(a).is_none());
        assert_eq!(cache.stale(a).as_deref(), Some(&[1u8, 1, 1, 1][..]));
        assert!(cache.get(b).is_some());

        // Re-rendering replaces the stale copy
        cache.insert(a, png(3));
        assert!(cache.stale(a).is_none());
        assert!(cache.stale.is_empty());
    }

    #[test]
    fn test_clear_drops_stale() {
        let mut cache = TileCache::new();
        cache.insert(TileRequest::new(0, 0, 0), png(1));
        cache.insert(TileRequest::new(1, 0, 0), png(2));
        assert_eq!(cache.invalidate([TileRequest::new(0, 0, 0)]), 1);
        assert_eq!(cache.len(), 1);
        assert!(cache.stale(TileRequest::new(0, 0, 0)).is_some());

        cache.clear();
        assert!(cache.is_empty());
        assert!(cache.stale(TileRequest::new(0, 0, 0)).is_none());
    }
}
