//! Optional reuse of the store's transaction-capability answer.

use std::{
  sync::{Mutex, PoisonError},
  time::Duration,
};

use tokio::time::Instant;

pub(crate) struct CapabilityProbe {
  ttl:  Option<Duration>,
  last: Mutex<Option<(bool, Instant)>>,
}

impl CapabilityProbe {
  pub(crate) fn new(ttl: Option<Duration>) -> Self {
    Self {
      ttl,
      last: Mutex::new(None),
    }
  }

  /// The remembered answer, if caching is enabled and it is still fresh.
  pub(crate) fn cached(&self) -> Option<bool> {
    let ttl = self.ttl?;
    let last = *self.last.lock().unwrap_or_else(PoisonError::into_inner);
    last
      .filter(|(_, at)| at.elapsed() < ttl)
      .map(|(supported, _)| supported)
  }

  pub(crate) fn remember(&self, supported: bool) {
    if self.ttl.is_some() {
      *self.last.lock().unwrap_or_else(PoisonError::into_inner) =
        Some((supported, Instant::now()));
    }
  }
}
