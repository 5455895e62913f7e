//! Frequency-table LFU cache with batched, eviction-factor driven eviction.
//!
//! Tracks each entry's access frequency in a fixed table of `capacity + 1`
//! frequency deques. A `get` promotes the entry exactly one level; when an
//! insert pushes the cache over capacity, the coldest entries are discarded
//! in one sweep until the live count drops to
//! `capacity - floor(capacity * eviction_factor)`.
//!
//! ## Architecture
//!
//! ```text
//!   ┌──────────────────────────────────────────────────────────────────┐
//!   │                        LfuCache<K, V>                            │
//!   │                                                                  │
//!   │   index: FxHashMap<K, NodeId>     table: FreqTable<K, V>         │
//!   │   ┌──────────┬─────────┐          ┌───────┬────────────────────┐ │
//!   │   │   Key    │ NodeId  │          │ level │ oldest ◄──► newest │ │
//!   │   ├──────────┼─────────┤          ├───────┼────────────────────┤ │
//!   │   │  "a"     │  id_0   │─────────►│   0   │ [id_2]             │ │
//!   │   │  "b"     │  id_1   │          │   1   │ [id_0] ◄──► [id_1] │ │
//!   │   │  "c"     │  id_2   │          │  ...  │                    │ │
//!   │   └──────────┴─────────┘          │  cap  │ next = itself      │ │
//!   │                                   └───────┴────────────────────┘ │
//!   │   capacity, eviction_count, len                                  │
//!   └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Eviction Flow
//!
//! ```text
//!   put(new key) pushes len to capacity + 1
//!        │
//!        ▼
//!   target = capacity - eviction_count
//!   scan levels 0, 1, 2, ... :
//!        pop the oldest node of the level, drop it from the index,
//!        stop the moment len <= target  (mid-level; higher levels
//!        are never inspected once the target is reached)
//! ```
//!
//! With `eviction_factor = 0.0` the sweep removes exactly the minimum needed
//! to satisfy the insert; larger factors free a batch in one pass so the
//! following inserts are cheap.
//!
//! ## Operations
//!
//! | Method           | Complexity | Notes                                   |
//! |------------------|------------|-----------------------------------------|
//! | `put(k, v)`      | O(1)*      | overwrite resets frequency to 0         |
//! | `get(&k)`        | O(1)       | promotes one level, saturating at top   |
//! | `peek(&k)`       | O(1)       | no promotion                            |
//! | `remove(&k)`     | O(1)       | unlink + index removal                  |
//! | `frequency(&k)`  | O(1)       | current level                           |
//! | `len()`          | O(1)       | live entries                            |
//!
//! *amortized: an over-capacity insert pays for the eviction sweep.
//!
//! ## Semantics worth knowing
//!
//! - **Overwrite resets frequency.** `put` on an existing key re-inserts the
//!   node at the tail of level 0, discarding its accumulated frequency. This
//!   reproduces the behavior of the frequency-table design this cache is
//!   modeled on; it is not the conventional preserve-on-update LFU.
//! - **Tie-break is insertion order.** Within a level the oldest node (the
//!   one that arrived at that frequency earliest) is evicted first.
//! - **Frequency saturates.** An entry accessed more than `capacity` times
//!   stays at the top level; further `get`s only refresh its recency there.
//!
//! ## Example
//!
//! ```
//! use lfukit::policy::lfu::LfuCache;
//!
//! let mut cache = LfuCache::new(3, 0.34); // eviction_count = 1
//! cache.put("a", 1);
//! cache.put("b", 2);
//! cache.put("c", 3);
//! cache.get(&"a"); // "a" moves to level 1
//!
//! cache.put("d", 4); // over capacity: evicts "b" and "c" (level 0, oldest first)
//! assert_eq!(cache.len(), 2);
//! assert!(cache.contains(&"a"));
//! assert!(cache.contains(&"d"));
//! ```
//!
//! `LfuCache` is not thread-safe; [`ConcurrentLfuCache`] wraps it in a single
//! coarse mutex so `put`/`get`/`remove` are atomic with respect to each other.

use std::hash::Hash;
#[cfg(feature = "concurrency")]
use std::sync::atomic::{AtomicUsize, Ordering};

#[cfg(feature = "concurrency")]
use parking_lot::Mutex;
use rustc_hash::FxHashMap;

use crate::ds::{FreqTable, NodeId};
use crate::error::ConfigError;

/// LFU cache over a fixed frequency table.
///
/// Single-threaded core; see the module docs for the eviction model and
/// [`ConcurrentLfuCache`] for the locked variant.
#[derive(Debug)]
pub struct LfuCache<K, V>
where
    K: Eq + Hash + Clone,
{
    index: FxHashMap<K, NodeId>,
    table: FreqTable<K, V>,
    capacity: usize,
    eviction_count: usize,
    len: usize,
}

impl<K, V> LfuCache<K, V>
where
    K: Eq + Hash + Clone,
{
    /// Creates a cache with the given capacity and eviction factor.
    ///
    /// `eviction_count = floor(capacity * eviction_factor)` entries beyond
    /// the minimum are freed per eviction sweep.
    ///
    /// # Panics
    ///
    /// Panics if parameters are invalid. See [`try_new`](Self::try_new).
    pub fn new(capacity: usize, eviction_factor: f64) -> Self {
        match Self::try_new(capacity, eviction_factor) {
            Ok(cache) => cache,
            Err(e) => panic!("{}", e),
        }
    }

    /// Creates a cache, returning an error on invalid parameters.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if `capacity` is zero, or `eviction_factor`
    /// is NaN or outside `[0.0, 1.0]`.
    pub fn try_new(capacity: usize, eviction_factor: f64) -> Result<Self, ConfigError> {
        if capacity == 0 {
            return Err(ConfigError::new("cache capacity must be greater than zero"));
        }
        if !eviction_factor.is_finite() || !(0.0..=1.0).contains(&eviction_factor) {
            return Err(ConfigError::new(format!(
                "eviction factor must be in [0.0, 1.0], got {}",
                eviction_factor
            )));
        }

        Ok(Self {
            index: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
            table: FreqTable::new(capacity),
            capacity,
            eviction_count: (capacity as f64 * eviction_factor) as usize,
            len: 0,
        })
    }

    /// Returns the number of live entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the cache is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the maximum number of entries.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the number of extra entries freed per eviction sweep.
    #[inline]
    pub fn eviction_count(&self) -> usize {
        self.eviction_count
    }

    /// Returns `true` if the key is present. Does not promote.
    #[inline]
    pub fn contains(&self, key: &K) -> bool {
        self.index.contains_key(key)
    }

    /// Inserts or overwrites an entry, returning the previous value if the
    /// key existed.
    ///
    /// An overwrite withdraws the node from its current level, swaps the
    /// value, and re-inserts it at the tail of level 0: the entry's
    /// frequency resets to zero. A new key is inserted at level 0; if that
    /// pushes the cache over capacity, the eviction sweep runs before this
    /// call returns, so `len() <= capacity()` holds on exit.
    pub fn put(&mut self, key: K, value: V) -> Option<V> {
        if let Some(&id) = self.index.get(&key) {
            self.table.withdraw(id);
            let previous = self.table.replace_value(id, value);
            self.table.push_tail(0, id);
            return previous;
        }

        let id = self.table.insert_new(0, key.clone(), value);
        self.index.insert(key, id);
        self.len += 1;
        if self.len > self.capacity {
            self.evict();
        }
        None
    }

    /// Returns the value for `key` and promotes the entry one frequency
    /// level (saturating at the top).
    pub fn get(&mut self, key: &K) -> Option<&V> {
        let id = *self.index.get(key)?;
        self.table.promote(id);
        self.table.value(id)
    }

    /// Returns the value for `key` without recording an access.
    pub fn peek(&self, key: &K) -> Option<&V> {
        let id = *self.index.get(key)?;
        self.table.value(id)
    }

    /// Returns the entry's current frequency level.
    pub fn frequency(&self, key: &K) -> Option<usize> {
        let id = *self.index.get(key)?;
        self.table.level_of(id)
    }

    /// Removes an entry, returning its value.
    pub fn remove(&mut self, key: &K) -> Option<V> {
        let id = self.index.remove(key)?;
        let (_key, value) = self.table.remove(id).expect("indexed node missing");
        self.len -= 1;
        Some(value)
    }

    /// Drops all entries.
    pub fn clear(&mut self) {
        self.index.clear();
        self.table.clear();
        self.len = 0;
    }

    /// Frees the coldest entries until `len <= capacity - eviction_count`.
    ///
    /// Scans levels from 0 upward, popping the oldest node of each level and
    /// fully removing it. The scan halts the moment the target is reached,
    /// possibly mid-level; higher levels are never inspected after that.
    fn evict(&mut self) {
        let target = self.capacity - self.eviction_count;
        'levels: for level in 0..self.table.levels() {
            while let Some((key, _value)) = self.table.pop_oldest(level) {
                self.index.remove(&key);
                self.len -= 1;
                if self.len <= target {
                    break 'levels;
                }
            }
        }
    }

    #[cfg(any(test, debug_assertions))]
    pub fn debug_validate_invariants(&self) {
        assert!(self.len <= self.capacity);
        assert_eq!(self.len, self.index.len());
        assert_eq!(self.len, self.table.len());

        let per_level: usize = (0..self.table.levels())
            .map(|level| self.table.level_len(level))
            .sum();
        assert_eq!(per_level, self.len);

        for (key, &id) in &self.index {
            let level = self.table.level_of(id).expect("indexed node missing");
            assert!(level < self.table.levels());
            assert!(self.table.key(id) == Some(key));
        }

        self.table.debug_validate_invariants();
    }
}

/// Thread-safe LFU cache guarded by a single coarse mutex.
///
/// Every `put`, `get`, and `remove` holds the lock for its whole duration,
/// eviction included, so no caller ever observes a partially updated
/// structure. [`len`](Self::len) deliberately does not take the lock: it
/// reads a counter maintained under the lock with relaxed ordering, so a
/// concurrent reader may see a value that an in-flight mutation is about to
/// change.
///
/// # Example
///
/// ```
/// use lfukit::policy::lfu::ConcurrentLfuCache;
///
/// let cache = ConcurrentLfuCache::new(100, 0.1);
/// cache.put("key", 42);
/// assert_eq!(cache.get(&"key"), Some(42));
/// assert_eq!(cache.len(), 1);
/// ```
#[cfg(feature = "concurrency")]
#[derive(Debug)]
pub struct ConcurrentLfuCache<K, V>
where
    K: Eq + Hash + Clone,
{
    inner: Mutex<LfuCache<K, V>>,
    len: AtomicUsize,
    capacity: usize,
    eviction_count: usize,
}

#[cfg(feature = "concurrency")]
impl<K, V> ConcurrentLfuCache<K, V>
where
    K: Eq + Hash + Clone,
{
    /// Creates a cache with the given capacity and eviction factor.
    ///
    /// # Panics
    ///
    /// Panics if parameters are invalid. See [`try_new`](Self::try_new).
    pub fn new(capacity: usize, eviction_factor: f64) -> Self {
        match Self::try_new(capacity, eviction_factor) {
            Ok(cache) => cache,
            Err(e) => panic!("{}", e),
        }
    }

    /// Creates a cache, returning an error on invalid parameters.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if `capacity` is zero, or `eviction_factor`
    /// is NaN or outside `[0.0, 1.0]`.
    pub fn try_new(capacity: usize, eviction_factor: f64) -> Result<Self, ConfigError> {
        let inner = LfuCache::try_new(capacity, eviction_factor)?;
        let eviction_count = inner.eviction_count();
        Ok(Self {
            inner: Mutex::new(inner),
            len: AtomicUsize::new(0),
            capacity,
            eviction_count,
        })
    }

    /// Inserts or overwrites an entry under the lock; returns the previous
    /// value if the key existed. Eviction triggered by the insert runs
    /// before the lock is released.
    pub fn put(&self, key: K, value: V) -> Option<V> {
        let mut inner = self.inner.lock();
        let previous = inner.put(key, value);
        self.len.store(inner.len(), Ordering::Relaxed);
        previous
    }

    /// Returns a clone of the value for `key`, promoting the entry one
    /// frequency level.
    pub fn get(&self, key: &K) -> Option<V>
    where
        V: Clone,
    {
        let mut inner = self.inner.lock();
        inner.get(key).cloned()
    }

    /// Applies `f` to the value for `key` under the lock, promoting the
    /// entry one frequency level. Avoids cloning the value.
    pub fn get_with<R>(&self, key: &K, f: impl FnOnce(&V) -> R) -> Option<R> {
        let mut inner = self.inner.lock();
        inner.get(key).map(f)
    }

    /// Removes an entry under the lock, returning its value.
    pub fn remove(&self, key: &K) -> Option<V> {
        let mut inner = self.inner.lock();
        let removed = inner.remove(key);
        self.len.store(inner.len(), Ordering::Relaxed);
        removed
    }

    /// Returns `true` if the key is present. Does not promote.
    pub fn contains(&self, key: &K) -> bool {
        self.inner.lock().contains(key)
    }

    /// Returns the entry's current frequency level.
    pub fn frequency(&self, key: &K) -> Option<usize> {
        self.inner.lock().frequency(key)
    }

    /// Returns the live-entry count without taking the lock.
    ///
    /// Relaxed read of a counter maintained under the lock: the value may be
    /// stale relative to a concurrent `put`/`remove`.
    pub fn len(&self) -> usize {
        self.len.load(Ordering::Relaxed)
    }

    /// Returns `true` if the cache was empty at the last counter update.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the maximum number of entries.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the number of extra entries freed per eviction sweep.
    pub fn eviction_count(&self) -> usize {
        self.eviction_count
    }

    /// Drops all entries under the lock.
    pub fn clear(&self) {
        let mut inner = self.inner.lock();
        inner.clear();
        self.len.store(0, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn put_get_round_trip() {
        let mut cache = LfuCache::new(4, 0.5);
        assert_eq!(cache.put("a", 1), None);
        assert_eq!(cache.frequency(&"a"), Some(0));
        assert_eq!(cache.get(&"a"), Some(&1));
        assert_eq!(cache.frequency(&"a"), Some(1));
        cache.debug_validate_invariants();
    }

    #[test]
    fn get_missing_is_none_and_mutates_nothing() {
        let mut cache: LfuCache<&str, i32> = LfuCache::new(4, 0.5);
        cache.put("a", 1);
        assert_eq!(cache.get(&"missing"), None);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.frequency(&"a"), Some(0));
        cache.debug_validate_invariants();
    }

    #[test]
    fn overwrite_resets_frequency_and_returns_previous() {
        let mut cache = LfuCache::new(4, 0.5);
        cache.put("a", 1);
        cache.get(&"a");
        cache.get(&"a");
        assert_eq!(cache.frequency(&"a"), Some(2));

        assert_eq!(cache.put("a", 2), Some(1));
        assert_eq!(cache.frequency(&"a"), Some(0));
        assert_eq!(cache.get(&"a"), Some(&2));
        assert_eq!(cache.len(), 1);
        cache.debug_validate_invariants();
    }

    #[test]
    fn remove_returns_value_and_is_idempotent() {
        let mut cache = LfuCache::new(4, 0.5);
        cache.put("a", 1);
        assert_eq!(cache.remove(&"a"), Some(1));
        assert_eq!(cache.len(), 0);
        assert_eq!(cache.remove(&"a"), None);
        assert_eq!(cache.len(), 0);
        cache.debug_validate_invariants();
    }

    #[test]
    fn eviction_sweep_hits_target_and_stops() {
        // capacity 3, factor 0.34 -> eviction_count 1, target 2.
        let mut cache = LfuCache::new(3, 0.34);
        assert_eq!(cache.eviction_count(), 1);

        cache.put("a", 1);
        cache.put("b", 2);
        cache.put("c", 3);
        cache.get(&"a"); // "a" moves to level 1

        cache.put("d", 4); // triggers the sweep: "b", "c" go (oldest at level 0)
        assert_eq!(cache.len(), 2);
        assert!(cache.contains(&"a"));
        assert!(cache.contains(&"d"));
        assert_eq!(cache.get(&"b"), None);
        assert_eq!(cache.get(&"c"), None);
        cache.debug_validate_invariants();
    }

    #[test]
    fn zero_factor_evicts_only_the_minimum() {
        let mut cache = LfuCache::new(3, 0.0);
        assert_eq!(cache.eviction_count(), 0);

        cache.put("a", 1);
        cache.put("b", 2);
        cache.put("c", 3);
        cache.put("d", 4);
        // target == capacity: exactly one eviction, the oldest at level 0.
        assert_eq!(cache.len(), 3);
        assert!(!cache.contains(&"a"));
        assert!(cache.contains(&"b"));
        assert!(cache.contains(&"c"));
        assert!(cache.contains(&"d"));
        cache.debug_validate_invariants();
    }

    #[test]
    fn eviction_prefers_lower_frequencies() {
        let mut cache = LfuCache::new(3, 0.0);
        cache.put("a", 1);
        cache.put("b", 2);
        cache.put("c", 3);
        cache.get(&"b");
        cache.get(&"c");

        // Only "a" remains at level 0; it is the victim.
        cache.put("d", 4);
        assert!(!cache.contains(&"a"));
        assert!(cache.contains(&"b"));
        assert!(cache.contains(&"c"));
        assert!(cache.contains(&"d"));
        cache.debug_validate_invariants();
    }

    #[test]
    fn full_factor_sweep_can_evict_the_new_key() {
        // factor 1.0 -> target 0: the sweep empties the cache, newest last.
        let mut cache = LfuCache::new(2, 1.0);
        cache.put("a", 1);
        cache.put("b", 2);
        cache.put("c", 3);
        assert_eq!(cache.len(), 0);
        assert!(!cache.contains(&"c"));
        cache.debug_validate_invariants();
    }

    #[test]
    fn frequency_saturates_at_capacity() {
        let mut cache = LfuCache::new(3, 0.0);
        cache.put("a", 1);
        for _ in 0..10 {
            assert_eq!(cache.get(&"a"), Some(&1));
        }
        assert_eq!(cache.frequency(&"a"), Some(3));
        cache.debug_validate_invariants();
    }

    #[test]
    fn peek_does_not_promote() {
        let mut cache = LfuCache::new(3, 0.0);
        cache.put("a", 1);
        assert_eq!(cache.peek(&"a"), Some(&1));
        assert_eq!(cache.frequency(&"a"), Some(0));
        assert_eq!(cache.peek(&"missing"), None);
    }

    #[test]
    fn clear_empties_the_cache() {
        let mut cache = LfuCache::new(3, 0.5);
        cache.put("a", 1);
        cache.put("b", 2);
        cache.get(&"a");
        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(cache.get(&"a"), None);
        cache.debug_validate_invariants();

        // Usable after clear.
        cache.put("c", 3);
        assert_eq!(cache.get(&"c"), Some(&3));
    }

    #[test]
    fn try_new_rejects_zero_capacity() {
        let err = LfuCache::<u64, u64>::try_new(0, 0.5).unwrap_err();
        assert!(err.to_string().contains("capacity"));
    }

    #[test]
    fn try_new_rejects_out_of_range_factor() {
        assert!(LfuCache::<u64, u64>::try_new(10, 1.5).is_err());
        assert!(LfuCache::<u64, u64>::try_new(10, -0.1).is_err());
        assert!(LfuCache::<u64, u64>::try_new(10, f64::NAN).is_err());
        assert!(LfuCache::<u64, u64>::try_new(10, f64::INFINITY).is_err());
    }

    #[test]
    #[should_panic(expected = "capacity")]
    fn new_panics_on_zero_capacity() {
        let _ = LfuCache::<u64, u64>::new(0, 0.5);
    }

    #[test]
    fn eviction_count_truncates() {
        assert_eq!(LfuCache::<u64, u64>::new(3, 0.34).eviction_count(), 1);
        assert_eq!(LfuCache::<u64, u64>::new(10, 0.25).eviction_count(), 2);
        assert_eq!(LfuCache::<u64, u64>::new(10, 1.0).eviction_count(), 10);
        assert_eq!(LfuCache::<u64, u64>::new(10, 0.0).eviction_count(), 0);
    }

    #[cfg(feature = "concurrency")]
    mod concurrent {
        use super::*;

        #[test]
        fn basic_ops_through_the_lock() {
            let cache = ConcurrentLfuCache::new(4, 0.5);
            assert_eq!(cache.put("a", 1), None);
            assert_eq!(cache.get(&"a"), Some(1));
            assert_eq!(cache.frequency(&"a"), Some(1));
            assert_eq!(cache.put("a", 2), Some(1));
            assert_eq!(cache.frequency(&"a"), Some(0));
            assert_eq!(cache.remove(&"a"), Some(2));
            assert_eq!(cache.remove(&"a"), None);
        }

        #[test]
        fn len_tracks_mutations() {
            let cache = ConcurrentLfuCache::new(2, 0.0);
            assert_eq!(cache.len(), 0);
            cache.put(1u64, "one");
            cache.put(2, "two");
            assert_eq!(cache.len(), 2);
            cache.put(3, "three"); // evicts one entry
            assert_eq!(cache.len(), 2);
            cache.clear();
            assert!(cache.is_empty());
        }

        #[test]
        fn get_with_avoids_cloning() {
            let cache = ConcurrentLfuCache::new(2, 0.0);
            cache.put("k", String::from("value"));
            assert_eq!(cache.get_with(&"k", |v| v.len()), Some(5));
            assert_eq!(cache.get_with(&"missing", |v| v.len()), None);
        }

        #[test]
        fn try_new_propagates_config_errors() {
            assert!(ConcurrentLfuCache::<u64, u64>::try_new(0, 0.5).is_err());
            assert!(ConcurrentLfuCache::<u64, u64>::try_new(10, f64::NAN).is_err());
        }
    }
}
