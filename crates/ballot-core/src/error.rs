//! Error types for `ballot-core`.

use thiserror::Error;
use uuid::Uuid;

use crate::store::{StoreErrorKind, StoreFailure};

/// A type-erased store failure carried inside [`Error`].
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Error)]
pub enum Error {
  #[error("suggestion not found: {0}")]
  SuggestionNotFound(Uuid),

  #[error("user not found: {0}")]
  UserNotFound(Uuid),

  /// A multi-document transaction was rolled back. Nothing it wrote is
  /// visible.
  #[error("transaction aborted after {attempts} attempt(s): {source}")]
  TransactionAborted {
    attempts: u32,
    #[source]
    source:   BoxError,
  },

  /// The non-transactional create path stored the suggestion but failed to
  /// record it on the author's profile.
  #[error(
    "suggestion {suggestion_id} was stored but the author's profile was not \
     updated: {source}"
  )]
  PartialWriteInconsistency {
    suggestion_id: Uuid,
    #[source]
    source:        BoxError,
  },

  #[error("store unavailable: {0}")]
  StoreUnavailable(#[source] BoxError),

  /// The backend answered but the operation failed, e.g. a stored document
  /// could not be decoded.
  #[error("store error: {0}")]
  Store(#[source] BoxError),
}

impl Error {
  /// Wrap a backend failure according to its [`StoreErrorKind`]. Only
  /// [`StoreErrorKind::Unavailable`] becomes [`Error::StoreUnavailable`].
  pub fn store<E: StoreFailure>(e: E) -> Self {
    match e.kind() {
      StoreErrorKind::Unavailable => Self::StoreUnavailable(Box::new(e)),
      StoreErrorKind::Conflict | StoreErrorKind::Other => Self::Store(Box::new(e)),
    }
  }

  pub fn is_not_found(&self) -> bool {
    matches!(self, Self::SuggestionNotFound(_) | Self::UserNotFound(_))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
