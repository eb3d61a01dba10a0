use crate::cache::Cache;
use crate::error::CacheError;
use crate::weigher::{UnitWeigher, Weigher};

/// Builder for configuring a [`Cache`].
///
/// Without a weigher the cache falls back to [`UnitWeigher`], bounding entry
/// count rather than total weight.
///
/// # Example
///
/// ```
/// use weighted_lru::CacheBuilder;
///
/// let cache = CacheBuilder::new(16 * 1024 * 1024) // 16 MB
///     .weigher(|v: &Vec<u8>| v.len() as i64)
///     .build()
///     .unwrap();
///
/// cache.set("frame:0", vec![0u8; 4096]).unwrap();
/// ```
pub struct CacheBuilder<V> {
	max_size: i64,
	weigher: Option<Box<dyn Weigher<V>>>,
}

impl<V: 'static> CacheBuilder<V> {
	/// Create a builder for a cache holding at most `max_size` total weight.
	pub fn new(max_size: i64) -> Self {
		Self {
			max_size,
			weigher: None,
		}
	}

	/// Set the size-of-value function.
	pub fn weigher(mut self, weigher: impl Weigher<V>) -> Self {
		self.weigher = Some(Box::new(weigher));
		self
	}

	/// Build the cache with the configured settings.
	///
	/// Fails with [`CacheError::InvalidCapacity`] if the capacity is zero or
	/// negative.
	pub fn build(self) -> Result<Cache<V>, CacheError> {
		let weigher = self.weigher.unwrap_or_else(|| Box::new(UnitWeigher));
		Cache::with_boxed_weigher(self.max_size, weigher)
	}
}

/// Derive a cache capacity from a host-provided memory budget: one sixth of
/// the budget, floored at 1 weight unit.
///
/// This is the external collaborator side of construction. The caller is
/// responsible for obtaining the budget from whatever host signal applies
/// (process memory class, cgroup limit, a config value); this function only
/// turns that figure into a capacity the constructor accepts.
///
/// ```
/// use weighted_lru::{recommended_max_size, CacheBuilder};
///
/// let cache = CacheBuilder::<Vec<u8>>::new(recommended_max_size(192 * 1024 * 1024))
///     .weigher(|v: &Vec<u8>| v.len() as i64)
///     .build()
///     .unwrap();
/// assert_eq!(cache.max_size(), 32 * 1024 * 1024);
/// ```
pub fn recommended_max_size(memory_budget_bytes: u64) -> i64 {
	(memory_budget_bytes / 6).clamp(1, i64::MAX as u64) as i64
}
