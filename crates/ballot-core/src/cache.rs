//! The read-through cache capability used by the data service.
//!
//! Entries are whole-list snapshots. A cache never fails: implementations
//! that lose their backing storage simply report a miss.

use std::{sync::Arc, time::Duration};

use uuid::Uuid;

use crate::suggestion::Suggestion;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheKey {
  /// Every non-archived suggestion.
  AllSuggestions,
  /// The suggestions authored by one user.
  AuthoredBy(Uuid),
}

/// A snapshot stored under a [`CacheKey`].
pub type Snapshot = Arc<Vec<Suggestion>>;

pub trait SuggestionCache: Send + Sync {
  /// Return the live entry under `key`, if one exists and has not expired.
  fn get(&self, key: &CacheKey) -> Option<Snapshot>;

  /// Store `value` under `key`, replacing any existing entry.
  fn set(&self, key: CacheKey, value: Snapshot, ttl: Duration);

  fn remove(&self, key: &CacheKey);
}
