//! Error type for `ballot-store-sqlite`.

use ballot_core::store::{StoreErrorKind, StoreFailure};
use rusqlite::ErrorCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),
}

impl StoreFailure for Error {
  fn kind(&self) -> StoreErrorKind {
    match self {
      Error::Database(tokio_rusqlite::Error::Rusqlite(
        rusqlite::Error::SqliteFailure(e, _),
      )) if matches!(e.code, ErrorCode::DatabaseBusy | ErrorCode::DatabaseLocked) => {
        StoreErrorKind::Conflict
      }
      Error::Database(tokio_rusqlite::Error::ConnectionClosed) => {
        StoreErrorKind::Unavailable
      }
      Error::Database(tokio_rusqlite::Error::Rusqlite(
        rusqlite::Error::SqliteFailure(e, _),
      )) if matches!(e.code, ErrorCode::CannotOpen | ErrorCode::NotADatabase) => {
        StoreErrorKind::Unavailable
      }
      _ => StoreErrorKind::Other,
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
