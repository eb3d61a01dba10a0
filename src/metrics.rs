//! Cache performance metrics.

/// Point-in-time snapshot of cache counters and occupancy.
///
/// All counters are monotonically non-decreasing over the cache's lifetime;
/// only re-construction resets them. The snapshot is taken under the cache
/// lock, so `size` and `entry_count` are mutually consistent.
///
/// # Example
///
/// ```
/// use weighted_lru::{Cache, UnitWeigher};
///
/// let cache: Cache<String> = Cache::new(1024, UnitWeigher).unwrap();
/// // ... perform cache operations ...
///
/// let metrics = cache.metrics();
/// println!("Hit rate: {:.2}%", metrics.hit_rate() * 100.0);
/// println!("Utilization: {:.2}%", metrics.utilization() * 100.0);
/// println!("Evictions: {}", metrics.eviction_count);
/// ```
#[non_exhaustive]
#[derive(Debug, Clone, Default)]
pub struct CacheMetrics {
	/// Number of `get` calls that returned a value.
	pub hit_count: u64,
	/// Number of `get` calls that found nothing.
	pub miss_count: u64,
	/// Number of `set` calls (inserts and overwrites alike).
	pub put_count: u64,
	/// Number of entries removed by the eviction loop.
	pub eviction_count: u64,
	/// Sum of the weights of all resident entries.
	pub size: i64,
	/// Fixed capacity in weight units.
	pub max_size: i64,
	/// Current number of resident entries.
	pub entry_count: usize,
}

impl CacheMetrics {
	/// Cache hit rate as a ratio between 0.0 and 1.0.
	///
	/// Returns 0.0 if there have been no lookups.
	pub fn hit_rate(&self) -> f64 {
		let total = self.hit_count + self.miss_count;
		if total == 0 {
			0.0
		} else {
			self.hit_count as f64 / total as f64
		}
	}

	/// Fraction of capacity currently occupied, between 0.0 and 1.0.
	pub fn utilization(&self) -> f64 {
		if self.max_size <= 0 {
			0.0
		} else {
			self.size as f64 / self.max_size as f64
		}
	}

	/// Total number of lookups (hits + misses).
	pub fn total_accesses(&self) -> u64 {
		self.hit_count + self.miss_count
	}
}
