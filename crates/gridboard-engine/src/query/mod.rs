//! Cached query service
//!
//! Deduplicates and memoizes expensive read-only backend operations per a
//! strongly typed derived key. Guarantees at most one concurrent loader
//! invocation per key; failed loads are evicted so a later call retries.

pub mod cache;
pub mod key;
pub mod paging;
pub mod service;

pub use cache::{QueryCache, QueryError, QueryValue};
pub use key::{QueryCacheKey, QueryKind};
pub use paging::{ElementsPager, InMemoryPager};
pub use service::QueryService;
