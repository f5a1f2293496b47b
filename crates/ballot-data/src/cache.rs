//! [`MemoryCache`]: the process-wide, in-memory [`SuggestionCache`].
//!
//! Construct one per process and share it behind an `Arc`. An expired entry
//! is dropped the next time it is looked up, or on the next `set` of any key,
//! so the map never holds more than the keys written within one TTL.

use std::time::Duration;

use ballot_core::cache::{CacheKey, Snapshot, SuggestionCache};
use dashmap::DashMap;
use tokio::time::Instant;

struct Entry {
  value:      Snapshot,
  expires_at: Instant,
}

#[derive(Default)]
pub struct MemoryCache {
  entries: DashMap<CacheKey, Entry>,
}

impl MemoryCache {
  pub fn new() -> Self { Self::default() }

  /// Number of stored entries, expired ones included.
  pub fn len(&self) -> usize { self.entries.len() }

  pub fn is_empty(&self) -> bool { self.entries.is_empty() }
}

impl SuggestionCache for MemoryCache {
  fn get(&self, key: &CacheKey) -> Option<Snapshot> {
    let now = Instant::now();
    let live = self
      .entries
      .get(key)
      .map(|entry| (entry.expires_at > now).then(|| entry.value.clone()))?;

    if live.is_none() {
      self.entries.remove_if(key, |_, entry| entry.expires_at <= now);
    }
    live
  }

  fn set(&self, key: CacheKey, value: Snapshot, ttl: Duration) {
    let now = Instant::now();
    self.entries.retain(|_, entry| entry.expires_at > now);
    self.entries.insert(key, Entry {
      value,
      expires_at: now + ttl,
    });
  }

  fn remove(&self, key: &CacheKey) { self.entries.remove(key); }
}
