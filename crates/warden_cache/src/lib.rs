//! Rendered answer caching with TTL support.
//!
//! Answers of slash commands are cached under a key derived from the
//! resolved query window, so repeated questions inside the TTL are
//! answered without touching upstream providers.

#![warn(missing_docs)]

mod cache;

pub use cache::{CacheEntry, DEFAULT_CAPACITY, ResponseCache};
