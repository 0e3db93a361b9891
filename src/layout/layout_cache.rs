use std::num::NonZeroUsize;

use lru::LruCache;
use parking_lot::Mutex;
use tracing::trace;
use xxhash_rust::xxh3::xxh3_64;

use super::rows::{compute_breaks, place_rows, LayoutConfig, RowBreak};
use crate::error::Result;
use crate::models::{ImageItem, LayoutResult};

/// Maximum number of cached break lists to keep in memory.
const MAX_CACHE_ENTRIES: usize = 8;

/// Key for the layout cache: the item list plus the settings that decide
/// where rows break. Width and gutter are deliberately absent.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
struct CacheKey {
    list_hash: u64,
    columns: usize,
    full_width_landscape_lead_in: bool,
}

impl CacheKey {
    fn new(list_hash: u64, config: &LayoutConfig) -> Self {
        Self {
            list_hash,
            columns: config.columns(),
            full_width_landscape_lead_in: config.full_width_landscape_lead_in(),
        }
    }
}

/// LRU cache of row breaks.
///
/// Resizing a gallery changes every pixel placement but never the row
/// breaks, so a resize only has to redo the cheap placement step.
pub struct LayoutCache {
    cache: Mutex<LruCache<CacheKey, Vec<RowBreak>>>,
}

impl LayoutCache {
    pub fn new() -> Self {
        let capacity = NonZeroUsize::new(MAX_CACHE_ENTRIES).unwrap_or(NonZeroUsize::MIN);
        Self {
            cache: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Computes a fast hash of the item list.
    /// Identifiers and dimensions are hashed in order, so any change to the
    /// images or their order invalidates the entry.
    pub fn compute_list_hash(items: &[ImageItem]) -> u64 {
        let mut hasher_input = Vec::with_capacity(items.len() * 32);

        for item in items {
            hasher_input.extend_from_slice(item.correlation_id.as_bytes());
            hasher_input.push(0);
            hasher_input.extend_from_slice(&item.intrinsic_width.to_le_bytes());
            hasher_input.extend_from_slice(&item.intrinsic_height.to_le_bytes());
        }

        xxh3_64(&hasher_input)
    }

    /// Returns cached breaks, marking the entry as recently used.
    pub fn get(&self, list_hash: u64, config: &LayoutConfig) -> Option<Vec<RowBreak>> {
        self.cache.lock().get(&CacheKey::new(list_hash, config)).cloned()
    }

    pub fn set(&self, list_hash: u64, config: &LayoutConfig, breaks: Vec<RowBreak>) {
        self.cache.lock().put(CacheKey::new(list_hash, config), breaks);
    }

    pub fn clear(&self) {
        self.cache.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.cache.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.lock().is_empty()
    }
}

impl Default for LayoutCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Layout computation backed by a [`LayoutCache`].
pub struct CachedLayoutComputer {
    pub cache: LayoutCache,
}

impl CachedLayoutComputer {
    pub fn new() -> Self {
        Self {
            cache: LayoutCache::new(),
        }
    }

    /// Computes the layout, reusing cached row breaks when the same items
    /// were laid out before with the same column settings.
    pub fn compute(
        &self,
        items: &[ImageItem],
        container_width_px: f32,
        config: &LayoutConfig,
    ) -> Result<LayoutResult> {
        let list_hash = LayoutCache::compute_list_hash(items);
        let covers = |breaks: &[RowBreak]| {
            breaks
                .last()
                .map_or(items.is_empty(), |b| b.end_index == items.len())
        };

        let breaks = match self.cache.get(list_hash, config) {
            Some(breaks) if covers(&breaks) => {
                trace!(list_hash, "layout cache hit");
                breaks
            }
            _ => {
                let breaks = compute_breaks(items, config);
                self.cache.set(list_hash, config, breaks.clone());
                breaks
            }
        };

        place_rows(items, &breaks, container_width_px, config)
    }

    /// Invalidates the cache, forcing recomputation on next call.
    pub fn invalidate(&self) {
        self.cache.clear();
    }
}

impl Default for CachedLayoutComputer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::compute_layout;

    fn make_items(count: usize) -> Vec<ImageItem> {
        (0..count)
            .map(|i| ImageItem::new(format!("{}.jpg", i), 1920.0 - i as f32 * 40.0, 1080.0))
            .collect()
    }

    #[test]
    fn test_list_hash_consistency() {
        let items = make_items(3);
        assert_eq!(
            LayoutCache::compute_list_hash(&items),
            LayoutCache::compute_list_hash(&items)
        );
    }

    #[test]
    fn test_list_hash_changes_on_dimensions() {
        let items1 = vec![ImageItem::new("a", 100.0, 100.0)];
        let items2 = vec![ImageItem::new("a", 100.0, 200.0)];
        assert_ne!(
            LayoutCache::compute_list_hash(&items1),
            LayoutCache::compute_list_hash(&items2)
        );
    }

    #[test]
    fn test_list_hash_changes_on_order() {
        let mut items = make_items(2);
        let hash1 = LayoutCache::compute_list_hash(&items);
        items.reverse();
        assert_ne!(hash1, LayoutCache::compute_list_hash(&items));
    }

    #[test]
    fn test_cache_miss_then_hit() {
        let cache = LayoutCache::new();
        let config = LayoutConfig::new(2, 5.0, false).unwrap();
        assert!(cache.get(42, &config).is_none());

        let breaks = vec![RowBreak {
            start_index: 0,
            end_index: 2,
            full_width: false,
        }];
        cache.set(42, &config, breaks.clone());
        assert_eq!(cache.get(42, &config), Some(breaks));

        // The landscape flag changes where rows break.
        let other = LayoutConfig::new(2, 5.0, true).unwrap();
        assert!(cache.get(42, &other).is_none());
        // The gutter does not.
        let wider_gutter = config.with_gutter(30.0).unwrap();
        assert!(cache.get(42, &wider_gutter).is_some());
    }

    #[test]
    fn test_cache_eviction() {
        let cache = LayoutCache::new();
        let config = LayoutConfig::default();
        for i in 0..(MAX_CACHE_ENTRIES + 5) {
            cache.set(i as u64, &config, Vec::new());
        }
        assert_eq!(cache.len(), MAX_CACHE_ENTRIES);
        assert!(cache.get(0, &config).is_none());
    }

    #[test]
    fn test_cached_matches_direct() {
        let computer = CachedLayoutComputer::new();
        let config = LayoutConfig::new(3, 6.0, true).unwrap();
        let items = make_items(10);

        let first = computer.compute(&items, 1400.0, &config).unwrap();
        assert_eq!(computer.cache.len(), 1);
        let resized = computer.compute(&items, 900.0, &config).unwrap();
        assert_eq!(computer.cache.len(), 1);

        assert_eq!(first, compute_layout(&items, 1400.0, &config).unwrap());
        assert_eq!(resized, compute_layout(&items, 900.0, &config).unwrap());
    }

    #[test]
    fn test_invalidate() {
        let computer = CachedLayoutComputer::new();
        let config = LayoutConfig::default();
        computer.compute(&make_items(4), 800.0, &config).unwrap();
        assert!(!computer.cache.is_empty());
        computer.invalidate();
        assert!(computer.cache.is_empty());
    }
}
