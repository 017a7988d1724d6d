//! AvlHashMap: bucketed container routing keys to per-bucket AVL trees.

use crate::avl_tree::{self, AvlTree};
use core::borrow::Borrow;
use core::fmt;
use core::hash::{BuildHasher, Hash};
use core::mem;
use std::collections::hash_map::RandomState;

const DEFAULT_CAPACITY: usize = 16;
const DEFAULT_LOAD_FACTOR_THRESHOLD: f64 = 0.75;

/// Rejected construction parameters. The steady-state API has no error
/// type: absence is `None`, overwrite and remove-of-absent are defined
/// behaviors, not faults.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConfigError {
    /// `initial_capacity` must be at least 1.
    ZeroCapacity,
    /// The load-factor threshold must lie in `(0, 1]` (and not be NaN).
    InvalidLoadFactorThreshold(f64),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ZeroCapacity => write!(f, "initial capacity must be non-zero"),
            ConfigError::InvalidLoadFactorThreshold(t) => {
                write!(f, "load factor threshold {t} outside (0, 1]")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// A hash map whose buckets are AVL trees.
///
/// Keys are routed to a bucket by hash and resolved inside the bucket by
/// `Ord`, so per-key cost is O(log m) in the bucket population no matter how
/// degenerate the hasher is. A constant hasher collapses the table into one
/// tree-backed bucket and lookups stay logarithmic; that bound, not hash
/// quality, is what this structure guarantees.
///
/// Inserting past the load-factor threshold doubles the bucket count and
/// redistributes every entry synchronously before `insert` returns.
pub struct AvlHashMap<K, V, S = RandomState> {
    buckets: Vec<AvlTree<K, V>>,
    len: usize,
    load_factor_threshold: f64,
    hasher: S,
}

impl<K, V> AvlHashMap<K, V>
where
    K: Ord + Hash,
{
    /// Capacity 16, load-factor threshold 0.75, randomly seeded std hasher.
    pub fn new() -> Self {
        Self::with_hasher(Default::default())
    }
}

impl<K, V> Default for AvlHashMap<K, V>
where
    K: Ord + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, S> AvlHashMap<K, V, S> {
    /// Total number of entries across all buckets.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Current bucket count. Doubles on growth, never shrinks.
    pub fn capacity(&self) -> usize {
        self.buckets.len()
    }

    /// `len / capacity`. Never left above the configured threshold once a
    /// public call returns.
    pub fn load_factor(&self) -> f64 {
        self.len as f64 / self.buckets.len() as f64
    }

    pub fn max_bucket_height(&self) -> usize {
        self.buckets.iter().map(|b| b.height()).max().unwrap_or(0)
    }

    pub fn average_bucket_height(&self) -> f64 {
        let total: usize = self.buckets.iter().map(|b| b.height()).sum();
        total as f64 / self.buckets.len() as f64
    }

    /// Lifetime rotation total summed over the current buckets. Growth
    /// replaces the buckets wholesale, so this restarts from the rotations
    /// performed while redistributing.
    pub fn total_rotation_count(&self) -> u64 {
        self.buckets.iter().map(|b| b.rotation_count()).sum()
    }

    /// Per-bucket tree heights, one entry per bucket in index order.
    pub fn bucket_heights(&self) -> Vec<usize> {
        self.buckets.iter().map(|b| b.height()).collect()
    }

    /// Iterate all entries, bucket by bucket, ascending by key within each
    /// bucket. No cross-bucket order is guaranteed.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            buckets: self.buckets.iter(),
            current: None,
        }
    }

    fn fresh_buckets(capacity: usize) -> Vec<AvlTree<K, V>> {
        (0..capacity).map(|_| AvlTree::new()).collect()
    }
}

impl<K, V, S> AvlHashMap<K, V, S>
where
    K: Ord + Hash,
    S: BuildHasher,
{
    /// Default capacity and threshold with an injected hasher.
    pub fn with_hasher(hasher: S) -> Self {
        Self {
            buckets: Self::fresh_buckets(DEFAULT_CAPACITY),
            len: 0,
            load_factor_threshold: DEFAULT_LOAD_FACTOR_THRESHOLD,
            hasher,
        }
    }

    /// Fully configured construction. Parameters are validated here, once;
    /// nothing downstream re-checks them.
    pub fn with_config(
        initial_capacity: usize,
        load_factor_threshold: f64,
        hasher: S,
    ) -> Result<Self, ConfigError> {
        if initial_capacity == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        if !(load_factor_threshold > 0.0 && load_factor_threshold <= 1.0) {
            return Err(ConfigError::InvalidLoadFactorThreshold(
                load_factor_threshold,
            ));
        }
        Ok(Self {
            buckets: Self::fresh_buckets(initial_capacity),
            len: 0,
            load_factor_threshold,
            hasher,
        })
    }

    // Unsigned reduction of the full 64-bit hash. Avoids the classic
    // `abs(hash) % capacity` scheme, which folds h and -h together and is
    // undefined at the minimum representable integer.
    fn bucket_index<Q>(&self, key: &Q) -> usize
    where
        Q: ?Sized + Hash,
    {
        (self.hasher.hash_one(key) % self.buckets.len() as u64) as usize
    }

    /// Insert `key`, returning the previous value on overwrite. A fresh
    /// insert that pushes the load factor past the threshold triggers a
    /// synchronous growth before returning.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        let index = self.bucket_index(&key);
        let previous = self.buckets[index].insert(key, value);
        if previous.is_none() {
            self.len += 1;
            if self.load_factor() > self.load_factor_threshold {
                self.grow();
            }
        }
        previous
    }

    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Ord,
    {
        self.buckets[self.bucket_index(key)].get(key)
    }

    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Ord,
    {
        let index = self.bucket_index(key);
        self.buckets[index].get_mut(key)
    }

    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Ord,
    {
        self.get(key).is_some()
    }

    /// Remove `key` and return its value; `None` if absent (a no-op at both
    /// the container and bucket level).
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Ord,
    {
        let index = self.bucket_index(key);
        let removed = self.buckets[index].remove(key);
        if removed.is_some() {
            self.len -= 1;
        }
        removed
    }

    /// Double the bucket count and reinsert every entry under the new
    /// capacity. Reinsertion goes through `insert` so bucket trees rebalance
    /// normally; the load factor halves, so growth cannot re-trigger here.
    fn grow(&mut self) {
        let doubled = Self::fresh_buckets(self.buckets.len() * 2);
        let drained = mem::replace(&mut self.buckets, doubled);
        self.len = 0;
        for bucket in drained {
            for (key, value) in bucket {
                self.insert(key, value);
            }
        }
    }
}

/// Iterator over `(&K, &V)` for the whole container; see
/// [`AvlHashMap::iter`] for ordering.
pub struct Iter<'a, K, V> {
    buckets: std::slice::Iter<'a, AvlTree<K, V>>,
    current: Option<avl_tree::Iter<'a, K, V>>,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(entry) = self.current.as_mut().and_then(|it| it.next()) {
                return Some(entry);
            }
            self.current = Some(self.buckets.next()?.iter());
        }
    }
}
