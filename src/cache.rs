//! Route-name resolution memo.
//!
//! [`ResolveCache`] is an LRU memo from a canonical location to the index of
//! the template it matched, so repeated pushes of the same location skip the
//! template scan.
//! It is gated behind the `cache` feature flag and uses the [`lru`] crate.
//!
//! The memo is not the page cache: page shells live in
//! [`PageCache`](crate::pages::PageCache) and follow the stack, while this
//! memo only depends on the registered templates and is cleared whenever a
//! template is added.
//!
//! # Examples
//!
//! ```
//! use gpui_route_stack::cache::ResolveCache;
//!
//! let mut cache = ResolveCache::new();
//! cache.insert("settings".to_string(), 3);
//!
//! assert_eq!(cache.get("settings"), Some(3));
//! assert_eq!(cache.stats().hits, 1);
//! ```

use crate::{debug_log, trace_log};
use lru::LruCache;
use std::num::NonZeroUsize;

/// Counters tracking memo hit/miss rates and invalidations.
#[derive(Debug, Clone, Default)]
pub struct CacheStats {
    /// Number of lookups answered from the memo.
    pub hits: usize,
    /// Number of lookups that had to scan the templates.
    pub misses: usize,
    /// Number of full invalidations (via [`ResolveCache::clear`]).
    pub invalidations: usize,
}

impl CacheStats {
    /// Return the hit rate as a value in `0.0..=1.0`.
    ///
    /// Returns `0.0` if no lookups have been performed.
    #[allow(clippy::cast_precision_loss)]
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// LRU memo from lookup name to template index.
#[derive(Debug)]
pub struct ResolveCache {
    entries: LruCache<String, usize>,
    stats: CacheStats,
}

impl ResolveCache {
    const DEFAULT_CAPACITY: usize = 256;

    /// Create a memo with the default capacity (256 names).
    pub fn new() -> Self {
        Self::with_capacity(Self::DEFAULT_CAPACITY)
    }

    /// Create a memo with a custom capacity. A capacity of zero is raised to one.
    pub fn with_capacity(capacity: usize) -> Self {
        let cap = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: LruCache::new(cap),
            stats: CacheStats::default(),
        }
    }

    /// Look up the template index memoized for `name`.
    pub fn get(&mut self, name: &str) -> Option<usize> {
        if let Some(index) = self.entries.get(name) {
            self.stats.hits += 1;
            trace_log!("Resolve memo hit for '{}'", name);
            Some(*index)
        } else {
            self.stats.misses += 1;
            trace_log!("Resolve memo miss for '{}'", name);
            None
        }
    }

    /// Memoize the template index for `name`.
    pub fn insert(&mut self, name: String, index: usize) {
        self.entries.push(name, index);
    }

    /// Drop every entry and count an invalidation.
    pub fn clear(&mut self) {
        let len = self.entries.len();
        self.entries.clear();
        self.stats.invalidations += 1;
        debug_log!(
            "Resolve memo cleared: {} entries removed ({} total invalidations, hit rate: {:.1}%)",
            len,
            self.stats.invalidations,
            self.stats.hit_rate() * 100.0
        );
    }

    /// Current statistics.
    pub const fn stats(&self) -> &CacheStats {
        &self.stats
    }

    /// Number of memoized names.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// `true` if nothing is memoized.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for ResolveCache {
    fn default() -> Self {
        Self::new()
    }
}
