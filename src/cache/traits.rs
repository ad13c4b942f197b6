//! Core traits and types for the caching system.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

/// Source of the current time for expiry checks.
///
/// Injected into the cache layer so TTL behaviour can be exercised without
/// sleeping.
pub trait Clock: Send + Sync {
  fn now(&self) -> DateTime<Utc>;
}

/// Wall clock backed by `Utc::now()`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
  fn now(&self) -> DateTime<Utc> {
    Utc::now()
  }
}

/// Per-call options for `CacheLayer::get_or_fetch`.
#[derive(Debug, Clone, Copy, Default)]
pub struct CacheOptions {
  /// Lifetime of the stored value (falls back to the layer's default TTL)
  pub ttl: Option<Duration>,
  /// Skip the cache read but still store the fresh value
  pub bypass_cache: bool,
}

impl CacheOptions {
  pub fn with_ttl(ttl: Duration) -> Self {
    Self {
      ttl: Some(ttl),
      bypass_cache: false,
    }
  }

  pub fn bypass(mut self, bypass_cache: bool) -> Self {
    self.bypass_cache = bypass_cache;
    self
  }
}

/// Counters reported by `CacheLayer::stats`, all scoped to one namespace.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct CacheStats {
  /// Lookups served from the store
  pub hits: u64,
  /// Lookups that had to run the producer (absent, expired or bypassed)
  pub misses: u64,
  /// Live entries in the active namespace
  pub entry_count: usize,
  pub hit_rate: f64,
}

impl CacheStats {
  pub fn new(hits: u64, misses: u64, entry_count: usize) -> Self {
    let total = hits + misses;
    let hit_rate = if total == 0 {
      0.0
    } else {
      hits as f64 / total as f64
    };

    Self {
      hits,
      misses,
      entry_count,
      hit_rate,
    }
  }
}

#[cfg(test)]
pub use self::testing::ManualClock;


#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_hit_rate_no_lookups() {
    assert_eq!(CacheStats::new(0, 0, 0).hit_rate, 0.0);
  }

  #[test]
  fn test_hit_rate_mixed() {
    let stats = CacheStats::new(3, 1, 2);
    assert_eq!(stats.hit_rate, 0.75);
    assert_eq!(stats.entry_count, 2);
  }

  #[test]
  fn test_manual_clock_advances() {
    let clock = ManualClock::new();
    let start = clock.now();
    clock.advance(Duration::seconds(90));
    assert_eq!(clock.now() - start, Duration::seconds(90));
  }
}
