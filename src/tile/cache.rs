//! Optional LRU cache for encoded tiles.
//!
//! The service is cache-free unless an operator configures a byte capacity,
//! in which case this cache sits in front of the tile pipeline. Regions are
//! never cached.
//!
//! # Cache Key
//!
//! Tiles are cached by slide, pyramid address and JPEG quality. Two requests
//! for the same tile at different qualities are different entries.
//!
//! # Size-Based Eviction
//!
//! The cache tracks the total size of cached tiles in bytes and evicts
//! least-recently-used entries when the capacity is exceeded. A tile larger
//! than the whole capacity is never retained.

use std::num::NonZeroUsize;
use std::sync::Arc;

use bytes::Bytes;
use lru::LruCache;
use tokio::sync::Mutex;

use crate::pyramid::LevelScheme;

/// Upper bound on entries, independent of byte capacity.
const DEFAULT_MAX_ENTRIES: NonZeroUsize = match NonZeroUsize::new(10_000) {
    Some(n) => n,
    None => NonZeroUsize::MIN,
};

// =============================================================================
// Cache Key
// =============================================================================

/// Cache key for encoded tiles.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TileCacheKey {
    pub slide_id: Arc<str>,

    /// Level as requested, numbered per `scheme`
    pub level: u32,

    pub col: u32,
    pub row: u32,

    /// JPEG quality (1-100)
    pub quality: u8,

    pub scheme: LevelScheme,
}

impl TileCacheKey {
    pub fn new(slide_id: impl Into<Arc<str>>, level: u32, col: u32, row: u32, quality: u8) -> Self {
        Self {
            slide_id: slide_id.into(),
            level,
            col,
            row,
            quality,
            scheme: LevelScheme::Pyramid,
        }
    }

    /// Key a tile whose level is numbered in `scheme`.
    pub fn with_scheme(mut self, scheme: LevelScheme) -> Self {
        self.scheme = scheme;
        self
    }
}

// =============================================================================
// Tile Cache
// =============================================================================

struct Entries {
    lru: LruCache<TileCacheKey, Bytes>,
    size: usize,
}

/// LRU cache for encoded JPEG tiles with size-based capacity.
///
/// # Example
///
/// ```
/// use wsi_deepzoom::tile::{TileCache, TileCacheKey};
/// use bytes::Bytes;
///
/// #[tokio::main]
/// async fn main() {
///     let cache = TileCache::with_capacity(1024 * 1024);
///
///     let key = TileCacheKey::new("sample.jpg", 9, 3, 3, 80);
///     let tile = Bytes::from_static(&[0xFF, 0xD8, 0xFF, 0xD9]);
///
///     cache.put(key.clone(), tile.clone()).await;
///     assert_eq!(cache.get(&key).await, Some(tile));
/// }
/// ```
pub struct TileCache {
    entries: Mutex<Entries>,

    /// Maximum total size in bytes
    max_size: usize,
}

impl TileCache {
    /// Create a cache holding at most `max_size` bytes of tiles.
    pub fn with_capacity(max_size: usize) -> Self {
        Self::with_capacity_and_entries(max_size, DEFAULT_MAX_ENTRIES)
    }

    /// Create a cache bounded by both bytes and entry count.
    pub fn with_capacity_and_entries(max_size: usize, max_entries: NonZeroUsize) -> Self {
        Self {
            entries: Mutex::new(Entries {
                lru: LruCache::new(max_entries),
                size: 0,
            }),
            max_size,
        }
    }

    /// Get a tile, marking it as recently used.
    pub async fn get(&self, key: &TileCacheKey) -> Option<Bytes> {
        let mut entries = self.entries.lock().await;
        entries.lru.get(key).cloned()
    }

    /// Check for a tile without updating LRU order.
    pub async fn contains(&self, key: &TileCacheKey) -> bool {
        self.entries.lock().await.lru.contains(key)
    }

    /// Store a tile, evicting least-recently-used entries while over capacity.
    pub async fn put(&self, key: TileCacheKey, data: Bytes) {
        if data.len() > self.max_size {
            return;
        }

        let mut entries = self.entries.lock().await;
        let data_size = data.len();

        // `push` reports both replaced values and entries evicted by count
        if let Some((_, old)) = entries.lru.push(key, data) {
            entries.size = entries.size.saturating_sub(old.len());
        }
        entries.size += data_size;

        while entries.size > self.max_size {
            match entries.lru.pop_lru() {
                Some((_, evicted)) => entries.size = entries.size.saturating_sub(evicted.len()),
                None => break,
            }
        }
    }

    /// Drop every cached tile.
    pub async fn clear(&self) {
        let mut entries = self.entries.lock().await;
        entries.lru.clear();
        entries.size = 0;
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.lru.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.lru.is_empty()
    }

    /// Current total size of cached tiles in bytes.
    pub async fn size(&self) -> usize {
        self.entries.lock().await.size
    }

    /// Maximum capacity in bytes.
    pub fn capacity(&self) -> usize {
        self.max_size
    }
}

// =============================================================================
// Tests
// =============================================================================
