use std::sync::Arc;

use ahash::RandomState;
use hashlink::LinkedHashMap;
use parking_lot::Mutex;
use tracing::{debug, trace};

use crate::error::CacheError;
use crate::metrics::CacheMetrics;
use crate::weigher::Weigher;

/// A resident entry. The weight is computed once by the weigher at insertion
/// time and never implicitly recomputed.
struct CacheEntry<V> {
	value: Arc<V>,
	weight: i64,
}

/// Mutable cache state, guarded as one unit.
///
/// The recency-ordered map, the occupancy total, and the counters must always
/// be observed together: `size` equals the sum of the weights of the entries
/// in `map` at every lock boundary, and that cross-field invariant is exactly
/// what a single lock (rather than per-field atomics) protects.
struct Inner<V> {
	/// Front = least recently used, back = most recently used.
	map: LinkedHashMap<String, CacheEntry<V>, RandomState>,
	/// Sum of the weights of all resident entries.
	size: i64,
	put_count: u64,
	eviction_count: u64,
	hit_count: u64,
	miss_count: u64,
}

/// Bounded, size-aware LRU cache mapping string keys to shared values.
///
/// The cache tracks occupancy by a caller-defined weight metric, not by entry
/// count: a weigher supplied at construction maps each value to a non-negative
/// weight, and the running total is kept at or below a fixed capacity by
/// evicting least-recently-used entries after every `set`.
///
/// # Recency
///
/// Every successful `get` and every `set` (insert or overwrite) moves the
/// entry to the most-recently-used end of the order. Eviction always removes
/// the entry at the least-recently-used end; keys are unique, so the victim
/// is deterministic.
///
/// # Concurrency
///
/// The cache is a passive, thread-safe structure: share it via `Arc<Cache<V>>`
/// and call it from any number of threads. All operations run under one lock
/// per cache instance. The eviction loop releases and reacquires that lock
/// between victims to bound worst-case hold time; concurrent callers observe
/// a monotonically shrinking occupancy during a trim, never an inconsistent
/// one.
///
/// # Faults
///
/// Caller mistakes (non-positive capacity, empty key) surface as
/// [`CacheError`]. A weigher that returns a negative weight, or whose results
/// drive the occupancy total negative, is unrecoverable and panics: the cache
/// cannot correct a size function that disagrees with itself.
///
/// # Example
///
/// ```
/// use weighted_lru::{BytesWeigher, Cache};
///
/// let cache: Cache<Vec<u8>> = Cache::new(1024, BytesWeigher).unwrap();
///
/// cache.set("thumb:42", vec![0u8; 600]).unwrap();
/// cache.set("thumb:43", vec![0u8; 600]).unwrap();
///
/// // 1200 > 1024, so the older entry was evicted
/// assert!(cache.get("thumb:42").unwrap().is_none());
/// assert!(cache.get("thumb:43").unwrap().is_some());
/// assert_eq!(cache.size(), 600);
/// ```
pub struct Cache<V> {
	inner: Mutex<Inner<V>>,
	/// Fixed for the cache's lifetime.
	max_size: i64,
	weigher: Box<dyn Weigher<V>>,
}

impl<V: 'static> Cache<V> {
	/// Create a cache holding at most `max_size` total weight.
	///
	/// The weigher is the injected size-of-value policy; see [`Weigher`] for
	/// its contract. Fails with [`CacheError::InvalidCapacity`] if `max_size`
	/// is zero or negative.
	pub fn new(max_size: i64, weigher: impl Weigher<V>) -> Result<Self, CacheError> {
		Self::with_boxed_weigher(max_size, Box::new(weigher))
	}

	pub(crate) fn with_boxed_weigher(
		max_size: i64,
		weigher: Box<dyn Weigher<V>>,
	) -> Result<Self, CacheError> {
		if max_size <= 0 {
			return Err(CacheError::InvalidCapacity(max_size));
		}
		debug!(max_size, "creating lru cache");
		Ok(Self {
			inner: Mutex::new(Inner {
				map: LinkedHashMap::with_hasher(RandomState::new()),
				size: 0,
				put_count: 0,
				eviction_count: 0,
				hit_count: 0,
				miss_count: 0,
			}),
			max_size,
			weigher,
		})
	}

	/// Look up `key`, refreshing its recency on a hit.
	///
	/// A miss is a normal outcome (`Ok(None)`), not an error; only an empty
	/// key fails, with [`CacheError::InvalidKey`]. The recency update and the
	/// hit counter increment happen under the same critical section as the
	/// lookup, so a concurrent `set` never observes a half-updated order.
	pub fn get(&self, key: &str) -> Result<Option<Arc<V>>, CacheError> {
		if key.is_empty() {
			return Err(CacheError::InvalidKey);
		}
		let mut guard = self.inner.lock();
		let inner = &mut *guard;
		// Touch = pop the entry and reinsert it at the back of the order.
		// Both steps are O(1) on the linked hash map.
		match inner.map.remove(key) {
			Some(entry) => {
				let value = Arc::clone(&entry.value);
				inner.map.insert(key.to_owned(), entry);
				inner.hit_count += 1;
				Ok(Some(value))
			}
			None => {
				inner.miss_count += 1;
				Ok(None)
			}
		}
	}

	/// Insert `value` under `key`, then trim the cache back to capacity.
	///
	/// The entry lands at the most-recently-used end of the order. On an
	/// overwrite the previous entry's stored weight is subtracted, so the
	/// occupancy total reflects only the new entry for that key.
	///
	/// Fails with [`CacheError::InvalidKey`] on an empty key. Panics if the
	/// weigher returns a negative weight; that fault precedes any state
	/// mutation.
	pub fn set(&self, key: &str, value: V) -> Result<(), CacheError> {
		if key.is_empty() {
			return Err(CacheError::InvalidKey);
		}
		let weight = self.weigher.weigh(&value);
		if weight < 0 {
			panic!("weigher returned a negative weight ({weight}); weights must be non-negative");
		}
		{
			let mut guard = self.inner.lock();
			let inner = &mut *guard;
			inner.put_count += 1;
			inner.size += weight;
			let previous = inner.map.insert(
				key.to_owned(),
				CacheEntry {
					value: Arc::new(value),
					weight,
				},
			);
			if let Some(previous) = previous {
				inner.size -= previous.weight;
			}
		}
		self.trim_to_size(self.max_size);
		Ok(())
	}

	/// Remove every entry, driving occupancy to zero.
	pub fn evict_all(&self) {
		debug!("evicting all entries");
		// A floor of -1 also drains zero-weight entries, which a floor of 0
		// would leave resident.
		self.trim_to_size(-1);
	}

	/// Evict least-recently-used entries until `size <= target`.
	///
	/// The lock is released between victims; each iteration (invariant check,
	/// pick victim, remove, account) is one atomic unit.
	fn trim_to_size(&self, target: i64) {
		loop {
			let (key, weight) = {
				let mut guard = self.inner.lock();
				let inner = &mut *guard;
				if inner.size < 0 || (inner.map.is_empty() && inner.size != 0) {
					panic!(
						"weigher is reporting inconsistent results: occupancy {} with {} entries",
						inner.size,
						inner.map.len()
					);
				}
				if inner.size <= target || inner.map.is_empty() {
					break;
				}
				let Some((key, entry)) = inner.map.pop_front() else {
					break;
				};
				inner.size -= entry.weight;
				inner.eviction_count += 1;
				// The entry (and its value Arc) drops here, inside the
				// iteration; no reference outlives the removal.
				(key, entry.weight)
			};
			trace!(key = %key, weight, "evicted lru entry");
		}
	}

	/// Sum of the weights of all resident entries.
	pub fn size(&self) -> i64 {
		self.inner.lock().size
	}

	/// Fixed capacity in weight units.
	pub fn max_size(&self) -> i64 {
		self.max_size
	}

	/// Number of `get` calls that returned a value.
	pub fn hit_count(&self) -> u64 {
		self.inner.lock().hit_count
	}

	/// Number of `get` calls that found nothing.
	pub fn miss_count(&self) -> u64 {
		self.inner.lock().miss_count
	}

	/// Number of `set` calls.
	pub fn put_count(&self) -> u64 {
		self.inner.lock().put_count
	}

	/// Number of entries removed by the eviction loop.
	pub fn eviction_count(&self) -> u64 {
		self.inner.lock().eviction_count
	}

	/// Current number of resident entries.
	pub fn len(&self) -> usize {
		self.inner.lock().map.len()
	}

	/// Check whether the cache holds no entries.
	pub fn is_empty(&self) -> bool {
		self.inner.lock().map.is_empty()
	}

	/// Check whether `key` is resident, without refreshing its recency or
	/// touching the hit/miss counters.
	pub fn contains_key(&self, key: &str) -> bool {
		self.inner.lock().map.contains_key(key)
	}

	/// Consistent snapshot of counters and occupancy.
	pub fn metrics(&self) -> CacheMetrics {
		let inner = self.inner.lock();
		CacheMetrics {
			hit_count: inner.hit_count,
			miss_count: inner.miss_count,
			put_count: inner.put_count,
			eviction_count: inner.eviction_count,
			size: inner.size,
			max_size: self.max_size,
			entry_count: inner.map.len(),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::weigher::UnitWeigher;

	fn byte_cache(max_size: i64) -> Cache<Vec<u8>> {
		Cache::new(max_size, |v: &Vec<u8>| v.len() as i64).expect("capacity is positive")
	}

	#[test]
	fn test_set_and_get() {
		let cache = byte_cache(100);

		cache.set("a", vec![1, 2, 3]).expect("set should succeed");

		let value = cache.get("a").expect("key is valid").expect("entry is resident");
		assert_eq!(*value, vec![1, 2, 3]);
		assert_eq!(cache.hit_count(), 1);
		assert_eq!(cache.put_count(), 1);
		assert_eq!(cache.size(), 3);
	}

	#[test]
	fn test_miss_is_not_an_error() {
		let cache = byte_cache(100);

		assert_eq!(cache.get("absent").expect("key is valid"), None);
		assert_eq!(cache.miss_count(), 1);
		assert_eq!(cache.hit_count(), 0);
	}

	#[test]
	fn test_invalid_capacity() {
		assert_eq!(
			Cache::<Vec<u8>>::new(0, UnitWeigher).err(),
			Some(CacheError::InvalidCapacity(0))
		);
		assert_eq!(
			Cache::<Vec<u8>>::new(-5, UnitWeigher).err(),
			Some(CacheError::InvalidCapacity(-5))
		);
	}

	#[test]
	fn test_empty_key_rejected() {
		let cache = byte_cache(100);

		assert_eq!(cache.get("").err(), Some(CacheError::InvalidKey));
		assert_eq!(cache.set("", vec![1]).err(), Some(CacheError::InvalidKey));
		// Rejected calls mutate nothing
		assert_eq!(cache.put_count(), 0);
		assert_eq!(cache.miss_count(), 0);
	}

	#[test]
	fn test_lru_eviction_order() {
		// Capacity 10: A(6) + B(6) exceeds it, so A (least recent) goes
		let cache = byte_cache(10);

		cache.set("a", vec![0; 6]).expect("set should succeed");
		cache.set("b", vec![0; 6]).expect("set should succeed");

		assert!(cache.get("a").expect("key is valid").is_none());
		assert!(cache.get("b").expect("key is valid").is_some());
		assert_eq!(cache.size(), 6);
		assert_eq!(cache.eviction_count(), 1);
	}

	#[test]
	fn test_get_refreshes_recency() {
		let cache = byte_cache(10);

		cache.set("a", vec![0; 4]).expect("set should succeed");
		cache.set("b", vec![0; 4]).expect("set should succeed");
		// Touch A so B becomes the eviction victim
		cache.get("a").expect("key is valid");
		cache.set("c", vec![0; 4]).expect("set should succeed");

		assert!(cache.contains_key("a"));
		assert!(!cache.contains_key("b"));
		assert!(cache.contains_key("c"));
	}

	#[test]
	fn test_overwrite_replaces_weight() {
		let cache = byte_cache(100);

		cache.set("k", vec![0; 10]).expect("set should succeed");
		cache.set("k", vec![0; 30]).expect("set should succeed");

		assert_eq!(cache.size(), 30);
		assert_eq!(cache.len(), 1);
		assert_eq!(cache.put_count(), 2);
	}

	#[test]
	fn test_overwrite_moves_to_back() {
		let cache = byte_cache(10);

		cache.set("a", vec![0; 4]).expect("set should succeed");
		cache.set("b", vec![0; 4]).expect("set should succeed");
		// Overwriting A refreshes it, so B is now least recent
		cache.set("a", vec![0; 4]).expect("set should succeed");
		cache.set("c", vec![0; 4]).expect("set should succeed");

		assert!(cache.contains_key("a"));
		assert!(!cache.contains_key("b"));
	}

	#[test]
	fn test_oversized_entry_evicted_immediately() {
		let cache = byte_cache(1);

		cache.set("big", vec![0; 2]).expect("set should succeed");

		assert!(cache.is_empty());
		assert_eq!(cache.size(), 0);
		assert_eq!(cache.eviction_count(), 1);
	}

	#[test]
	fn test_evict_all_drains_zero_weight_entries() {
		let cache = byte_cache(100);

		cache.set("empty", Vec::new()).expect("set should succeed");
		cache.set("full", vec![0; 10]).expect("set should succeed");
		assert_eq!(cache.len(), 2);

		cache.evict_all();

		assert!(cache.is_empty());
		assert_eq!(cache.size(), 0);
		assert_eq!(cache.eviction_count(), 2);
	}

	#[test]
	fn test_eviction_count_matches_removals() {
		let cache = byte_cache(10);

		for i in 0..5 {
			cache.set(&format!("k{i}"), vec![0; 5]).expect("set should succeed");
		}

		// Each insert past the second displaces exactly one entry
		assert_eq!(cache.len(), 2);
		assert_eq!(cache.eviction_count(), 3);
		assert_eq!(cache.size(), 10);
	}

	#[test]
	fn test_contains_key_does_not_touch() {
		let cache = byte_cache(10);

		cache.set("a", vec![0; 4]).expect("set should succeed");
		cache.set("b", vec![0; 4]).expect("set should succeed");
		// contains_key must not refresh A's recency
		assert!(cache.contains_key("a"));
		cache.set("c", vec![0; 4]).expect("set should succeed");

		assert!(!cache.contains_key("a"));
		assert_eq!(cache.hit_count(), 0);
		assert_eq!(cache.miss_count(), 0);
	}

	#[test]
	#[should_panic(expected = "negative weight")]
	fn test_negative_weight_is_fatal() {
		let cache: Cache<Vec<u8>> =
			Cache::new(100, |_: &Vec<u8>| -1).expect("capacity is positive");
		let _ = cache.set("k", vec![1]);
	}

	#[test]
	fn test_metrics_snapshot() {
		let cache = byte_cache(10);

		cache.set("a", vec![0; 6]).expect("set should succeed");
		cache.set("b", vec![0; 6]).expect("set should succeed");
		cache.get("b").expect("key is valid");
		cache.get("a").expect("key is valid");

		let metrics = cache.metrics();
		assert_eq!(metrics.put_count, 2);
		assert_eq!(metrics.hit_count, 1);
		assert_eq!(metrics.miss_count, 1);
		assert_eq!(metrics.eviction_count, 1);
		assert_eq!(metrics.size, 6);
		assert_eq!(metrics.max_size, 10);
		assert_eq!(metrics.entry_count, 1);
		assert_eq!(metrics.hit_rate(), 0.5);
		assert_eq!(metrics.utilization(), 0.6);
	}

	#[test]
	fn test_cache_is_send_sync() {
		fn assert_send<T: Send>() {}
		fn assert_sync<T: Sync>() {}

		assert_send::<Cache<Vec<u8>>>();
		assert_sync::<Cache<Vec<u8>>>();
	}
}
