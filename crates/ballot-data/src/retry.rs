//! Bounded retry for transactions that lose a write conflict.

use std::time::Duration;

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
  /// Total attempts, including the first. Values below 1 are treated as 1.
  pub max_attempts:    u32,
  /// Delay before the second attempt; doubles for every attempt after that.
  pub base_backoff_ms: u64,
}

impl Default for RetryPolicy {
  fn default() -> Self {
    Self {
      max_attempts:    3,
      base_backoff_ms: 25,
    }
  }
}

impl RetryPolicy {
  /// A policy that gives up after the first conflict.
  pub fn none() -> Self {
    Self {
      max_attempts:    1,
      base_backoff_ms: 0,
    }
  }

  pub fn attempts(&self) -> u32 { self.max_attempts.max(1) }

  /// Delay to wait after failed attempt number `attempt` (1-based).
  pub fn backoff(&self, attempt: u32) -> Duration {
    let factor = 1u64 << attempt.saturating_sub(1).min(16);
    Duration::from_millis(self.base_backoff_ms.saturating_mul(factor))
  }
}
