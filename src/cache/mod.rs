//! Client-side cache of server lists.
//!
//! [`CacheKey`] addresses one slice of server data; [`QueryCache`] holds the
//! last known value per key together with its freshness and the fetch
//! generation used to discard superseded responses.

pub mod keys;
pub mod query_cache;

pub use keys::{CacheKey, KeyFamily};
pub use query_cache::{CacheValue, EntryStatus, FetchTicket, QueryCache, Snapshot};
