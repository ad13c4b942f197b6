//! Generic in-process caching layer.
//!
//! This module provides an API-agnostic caching mechanism that:
//! - Derives deterministic keys from an operation name and its parameters
//! - Stores JSON values with a per-entry TTL, expired lazily on read
//! - Supports single-key and pattern invalidation after mutations
//! - Can be bypassed per call or disabled for the whole process

mod key;
mod layer;
mod storage;
mod traits;


pub use key::cache_key;
pub use layer::CacheLayer;
pub use traits::{CacheOptions, CacheStats};

#[cfg(test)]
pub use traits::ManualClock;
