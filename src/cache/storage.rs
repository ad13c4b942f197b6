//! In-memory cache storage.

use chrono::{DateTime, Utc};
use serde_json::Value;
use std::collections::HashMap;

/// A single cached value and its expiry time.
#[derive(Debug, Clone)]
pub struct CacheEntry {
  pub value: Value,
  pub expires_at: DateTime<Utc>,
}

impl CacheEntry {
  /// An entry is expired once `now` reaches `expires_at`.
  pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
    now >= self.expires_at
  }
}

/// Process-local key/value store for one namespace.
#[derive(Debug, Default)]
pub struct MemoryStorage {
  entries: HashMap<String, CacheEntry>,
}

impl MemoryStorage {
  pub fn get(&self, key: &str) -> Option<&CacheEntry> {
    self.entries.get(key)
  }

  pub fn insert(&mut self, key: String, entry: CacheEntry) {
    self.entries.insert(key, entry);
  }

  /// Remove one entry, returning whether it existed.
  pub fn remove(&mut self, key: &str) -> bool {
    self.entries.remove(key).is_some()
  }

  /// Remove every entry whose key satisfies `predicate`, returning the count.
  pub fn remove_where<P>(&mut self, mut predicate: P) -> usize
  where
    P: FnMut(&str, &CacheEntry) -> bool,
  {
    let before = self.entries.len();
    self.entries.retain(|key, entry| !predicate(key, entry));
    before - self.entries.len()
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }
}
