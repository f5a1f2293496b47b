//! Runtime configuration for [`SuggestionData`](crate::SuggestionData).

use std::time::Duration;

use serde::Deserialize;

use crate::retry::RetryPolicy;

/// Deserialised from the `[data]` table of the application config.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DataConfig {
  /// Lifetime of every cached suggestion list.
  pub cache_ttl_secs:      u64,
  /// How long a transaction-capability probe result is reused. `0` probes
  /// the store on every create.
  pub capability_ttl_secs: u64,
  pub retry:               RetryPolicy,
}

impl Default for DataConfig {
  fn default() -> Self {
    Self {
      cache_ttl_secs:      60,
      capability_ttl_secs: 0,
      retry:               RetryPolicy::default(),
    }
  }
}

impl DataConfig {
  pub fn cache_ttl(&self) -> Duration { Duration::from_secs(self.cache_ttl_secs) }

  pub fn capability_ttl(&self) -> Option<Duration> {
    (self.capability_ttl_secs > 0)
      .then(|| Duration::from_secs(self.capability_ttl_secs))
  }
}
