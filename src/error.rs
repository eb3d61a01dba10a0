use thiserror::Error;

/// Errors surfaced for caller mistakes.
///
/// These are precondition violations: they are reported immediately, nothing
/// is retried, and no cache state is mutated. A cache miss is *not* an error;
/// `Cache::get` reports it as `Ok(None)`.
///
/// Invariant violations (a weigher returning a negative weight, or reporting
/// inconsistent results across calls) are unrecoverable and raised as panics
/// instead — see the `Cache` documentation.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum CacheError {
	/// The capacity passed at construction was zero or negative.
	#[error("max size must be positive, got {0}")]
	InvalidCapacity(i64),

	/// An empty key was passed to `get` or `set`.
	#[error("cache key must be non-empty")]
	InvalidKey,
}
