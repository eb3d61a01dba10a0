#![doc = include_str!("../README.md")]

mod builder;
mod cache;
mod error;
mod metrics;
mod weigher;

pub use builder::{recommended_max_size, CacheBuilder};
pub use cache::Cache;
pub use error::CacheError;
pub use metrics::CacheMetrics;
pub use weigher::{BytesWeigher, UnitWeigher, Weigher};
