//! Value-keyed memoization store.

use std::{
    collections::{hash_map::Entry, HashMap},
    hash::Hash,
};

/// Hit and miss counters accumulated by a [`MemoCache`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Lookups answered from a stored entry.
    pub hits: u64,
    /// Lookups that had to compute a fresh entry.
    pub misses: u64,
}

/// Unbounded result cache keyed by plain values.
///
/// Keys are compared by value only. Callers that cache results derived from a
/// mutable aggregate must fold a version stamp into the key; the cache never
/// evicts on its own.
#[derive(Clone, Debug)]
pub struct MemoCache<K, V> {
    entries: HashMap<K, V>,
    stats: CacheStats,
}

impl<K, V> Default for MemoCache<K, V> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
            stats: CacheStats::default(),
        }
    }
}

impl<K, V> MemoCache<K, V>
where
    K: Eq + Hash,
{
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the stored value for `key`, computing and storing it on a miss.
    pub fn get_or_insert_with<F>(&mut self, key: K, compute: F) -> &V
    where
        F: FnOnce() -> V,
    {
        match self.entries.entry(key) {
            Entry::Occupied(entry) => {
                self.stats.hits += 1;
                entry.into_mut()
            }
            Entry::Vacant(entry) => {
                self.stats.misses += 1;
                entry.insert(compute())
            }
        }
    }

    /// Fallible variant of [`MemoCache::get_or_insert_with`].
    ///
    /// A failed computation stores nothing, so the next lookup retries it.
    pub fn get_or_try_insert_with<F, E>(&mut self, key: K, compute: F) -> Result<&V, E>
    where
        F: FnOnce() -> Result<V, E>,
    {
        match self.entries.entry(key) {
            Entry::Occupied(entry) => {
                self.stats.hits += 1;
                Ok(entry.into_mut())
            }
            Entry::Vacant(entry) => {
                self.stats.misses += 1;
                let value = compute()?;
                Ok(entry.insert(value))
            }
        }
    }

    /// Stored value for `key`, without touching the counters.
    #[must_use]
    pub fn get(&self, key: &K) -> Option<&V> {
        self.entries.get(key)
    }

    /// Reports whether a value is stored for `key`.
    #[must_use]
    pub fn contains(&self, key: &K) -> bool {
        self.entries.contains_key(key)
    }

    /// Keeps only the entries accepted by `keep`, returning how many were dropped.
    pub fn retain<F>(&mut self, mut keep: F) -> usize
    where
        F: FnMut(&K, &V) -> bool,
    {
        let before = self.entries.len();
        self.entries.retain(|key, value| keep(key, value));
        before - self.entries.len()
    }

    /// Number of stored entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Reports whether the cache holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drops every stored entry. Counters are preserved.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Hit and miss counters accumulated since construction.
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        self.stats
    }
}
