//! Cache layer that orchestrates caching logic with network fetching.

use chrono::Duration;
use serde::{de::DeserializeOwned, Serialize};
use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::debug;

use super::key::matches_pattern;
use super::storage::{CacheEntry, MemoryStorage};
use super::traits::{CacheOptions, CacheStats, Clock, SystemClock};

/// Entries and lookup counters of one namespace.
#[derive(Debug, Default)]
struct NamespaceState {
  storage: MemoryStorage,
  hits: u64,
  misses: u64,
}

/// Cache layer that manages caching logic and network fetching.
///
/// Values are stored as JSON with a per-entry expiry, in a map owned by the
/// layer's namespace. Expired entries are evicted lazily when read. Clones
/// share the same store and enabled flag.
pub struct CacheLayer {
  namespaces: Arc<Mutex<HashMap<String, NamespaceState>>>,
  enabled: Arc<AtomicBool>,
  namespace: String,
  /// TTL used when a call does not specify one
  default_ttl: Duration,
  clock: Arc<dyn Clock>,
}

impl CacheLayer {
  /// Create an empty, enabled cache layer.
  pub fn new(namespace: impl Into<String>) -> Self {
    Self {
      namespaces: Arc::new(Mutex::new(HashMap::new())),
      enabled: Arc::new(AtomicBool::new(true)),
      namespace: namespace.into(),
      default_ttl: Duration::minutes(5),
      clock: Arc::new(SystemClock),
    }
  }

  /// Set the TTL used when a call does not pass one.
  pub fn with_default_ttl(mut self, default_ttl: Duration) -> Self {
    self.default_ttl = default_ttl;
    self
  }

  /// Replace the clock used for expiry checks.
  #[cfg(test)]
  pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
    self.clock = clock;
    self
  }

  /// A view of the same store scoped to another namespace.
  #[cfg(test)]
  pub fn with_namespace(&self, namespace: impl Into<String>) -> Self {
    Self {
      namespace: namespace.into(),
      ..self.clone()
    }
  }

  /// Run `f` against this layer's namespace, creating it on first use.
  fn scope<R>(&self, f: impl FnOnce(&mut NamespaceState) -> R) -> R {
    let mut namespaces = self
      .namespaces
      .lock()
      .unwrap_or_else(PoisonError::into_inner);
    f(namespaces.entry(self.namespace.clone()).or_default())
  }

  /// Return the cached value for `key`, or run `producer` and cache its result.
  ///
  /// 1. Disabled cache - run the producer, never touch the store
  /// 2. Fresh entry and no bypass - return it
  /// 3. Otherwise run the producer and store its value with `now + ttl`
  ///
  /// A failing producer leaves the store untouched.
  pub async fn get_or_fetch<T, E, F, Fut>(
    &self,
    key: &str,
    options: CacheOptions,
    producer: F,
  ) -> Result<T, E>
  where
    T: Serialize + DeserializeOwned,
    E: From<serde_json::Error>,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, E>>,
  {
    if !self.is_enabled() {
      debug!(key, "cache disabled, fetching");
      return producer().await;
    }

    if options.bypass_cache {
      debug!(key, "cache bypassed");
      self.scope(|ns| ns.misses += 1);
    } else if let Some(value) = self.lookup(key) {
      debug!(key, "cache hit");
      return Ok(serde_json::from_value(value)?);
    } else {
      debug!(key, "cache miss");
    }

    let data = producer().await?;

    let value = serde_json::to_value(&data)?;
    let ttl = options.ttl.unwrap_or(self.default_ttl);
    let expires_at = self.clock.now() + ttl;
    self.scope(|ns| ns.storage.insert(key.to_string(), CacheEntry { value, expires_at }));

    Ok(data)
  }

  /// Read a live entry, evicting it if it has expired.
  fn lookup(&self, key: &str) -> Option<serde_json::Value> {
    let now = self.clock.now();
    self.scope(|ns| {
      let hit = ns
        .storage
        .get(key)
        .filter(|entry| !entry.is_expired(now))
        .map(|entry| entry.value.clone());

      if hit.is_some() {
        ns.hits += 1;
      } else {
        if ns.storage.remove(key) {
          debug!(key, "evicted expired entry");
        }
        ns.misses += 1;
      }

      hit
    })
  }

  /// Remove a single entry. Returns whether it existed.
  pub fn invalidate(&self, key: &str) -> bool {
    let removed = self.scope(|ns| ns.storage.remove(key));
    debug!(key, removed, "invalidate");
    removed
  }

  /// Remove every entry in this namespace whose key matches `pattern`.
  ///
  /// See [`matches_pattern`] for the pattern rules.
  pub fn invalidate_pattern(&self, pattern: &str) -> usize {
    let removed = self.scope(|ns| {
      ns.storage
        .remove_where(|key, _| matches_pattern(key, pattern))
    });
    debug!(pattern, removed, "invalidate pattern");
    removed
  }

  /// Remove every entry in this namespace. Hit/miss counters are kept.
  pub fn clear(&self) -> usize {
    let removed = self.scope(|ns| ns.storage.remove_where(|_, _| true));
    debug!(namespace = %self.namespace, removed, "cache cleared");
    removed
  }

  /// Evict expired entries in this namespace.
  pub fn purge_expired(&self) -> usize {
    let now = self.clock.now();
    self.scope(|ns| ns.storage.remove_where(|_, entry| entry.is_expired(now)))
  }

  /// Stop reading and writing the store until `enable` is called.
  pub fn disable(&self) {
    self.enabled.store(false, Ordering::SeqCst);
  }

  #[cfg(test)]
  pub fn enable(&self) {
    self.enabled.store(true, Ordering::SeqCst);
  }

  pub fn is_enabled(&self) -> bool {
    self.enabled.load(Ordering::SeqCst)
  }

  /// Counters and live entry count for this namespace only.
  pub fn stats(&self) -> CacheStats {
    self.purge_expired();
    self.scope(|ns| CacheStats::new(ns.hits, ns.misses, ns.storage.len()))
  }
}

impl Clone for CacheLayer {
  fn clone(&self) -> Self {
    Self {
      namespaces: Arc::clone(&self.namespaces),
      enabled: Arc::clone(&self.enabled),
      namespace: self.namespace.clone(),
      default_ttl: self.default_ttl,
      clock: Arc::clone(&self.clock),
    }
  }
}
