/// Size-of-value function injected at construction time.
///
/// The weigher maps a value to a non-negative weight (any caller-defined
/// metric, not necessarily a byte count). It must be pure: deterministic for
/// a given value across repeated calls. The eviction loop's size accounting
/// depends on this — the cache computes the weight exactly once per insert
/// and stores it with the entry, and a weigher that disagrees with itself
/// can only be detected later as an inconsistency fault.
///
/// A negative weight is a fatal fault: `Cache::set` panics rather than let
/// the occupancy total go negative.
///
/// Closures implement `Weigher` directly:
///
/// ```
/// use weighted_lru::{Cache, Weigher};
///
/// let cache: Cache<Vec<u8>> = Cache::new(1024, |v: &Vec<u8>| v.len() as i64).unwrap();
/// ```
pub trait Weigher<V>: Send + Sync + 'static {
	/// Weight of `value`. Must be non-negative and stable across calls.
	fn weigh(&self, value: &V) -> i64;
}

impl<V, F> Weigher<V> for F
where
	F: Fn(&V) -> i64 + Send + Sync + 'static,
{
	fn weigh(&self, value: &V) -> i64 {
		self(value)
	}
}

/// Weighs every value as 1, turning the cache into a plain entry-count LRU.
///
/// This is the builder's default when no weigher is configured.
pub struct UnitWeigher;

impl<V> Weigher<V> for UnitWeigher {
	fn weigh(&self, _value: &V) -> i64 {
		1
	}
}

/// Weighs a value by the length of its byte representation.
///
/// Suitable for `Vec<u8>`, `String`, `Bytes`-like types — anything exposing
/// `AsRef<[u8]>`. This is the stock policy for image-style payloads where the
/// decoded byte count is the natural occupancy metric.
pub struct BytesWeigher;

impl<V> Weigher<V> for BytesWeigher
where
	V: AsRef<[u8]> + Send + Sync + 'static,
{
	fn weigh(&self, value: &V) -> i64 {
		value.as_ref().len() as i64
	}
}
