//! [`SqliteStore`]: the SQLite implementation of [`SuggestionStore`] and
//! [`UserDirectory`].

use std::{path::Path, sync::Arc};

use ballot_core::{
  store::{SuggestionFilter, SuggestionStore, UserDirectory},
  suggestion::{NewSuggestion, Suggestion},
  user::UserProfile,
};
use chrono::Utc;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::{
  Result,
  encode::{
    RawFilter, RawSuggestion, RawUser, decode_suggestions, decode_user,
    encode_uuid,
  },
  queries,
  schema::SCHEMA,
  session::SqliteSession,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A suggestion store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted. All clones
/// share one connection, so operations are funnelled through a gate: an open
/// [`SqliteSession`] holds it until it commits or aborts, and nothing else
/// runs on the connection in the meantime.
#[derive(Clone)]
pub struct SqliteStore {
  pub(crate) conn: tokio_rusqlite::Connection,
  gate:            Arc<Mutex<()>>,
  transactions:    bool,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    Self::init(conn).await
  }

  /// Open an in-memory store, useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    Self::init(conn).await
  }

  /// Report multi-document transactions as unavailable, so callers take
  /// their non-transactional path. Used to mirror a standalone deployment.
  pub fn with_transactions(mut self, enabled: bool) -> Self {
    self.transactions = enabled;
    self
  }

  async fn init(conn: tokio_rusqlite::Connection) -> Result<Self> {
    conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(Self {
      conn,
      gate: Arc::new(Mutex::new(())),
      transactions: true,
    })
  }
}

// ─── SuggestionStore impl ────────────────────────────────────────────────────

impl SuggestionStore for SqliteStore {
  type Error = crate::Error;
  type Session = SqliteSession;

  async fn find_suggestions(
    &self,
    filter: SuggestionFilter,
  ) -> Result<Vec<Suggestion>> {
    let raw_filter = RawFilter::from(filter);
    let _gate = self.gate.lock().await;

    let documents = self
      .conn
      .call(move |conn| {
        queries::close_abandoned(conn)?;
        Ok(queries::select_suggestions(conn, &raw_filter)?)
      })
      .await?;

    decode_suggestions(documents)
  }

  async fn insert_suggestion(&self, input: NewSuggestion) -> Result<Suggestion> {
    let suggestion = input.into_suggestion(Uuid::new_v4(), Utc::now());
    let raw = RawSuggestion::encode(&suggestion)?;
    let _gate = self.gate.lock().await;

    self
      .conn
      .call(move |conn| {
        queries::close_abandoned(conn)?;
        Ok(queries::insert_suggestion(conn, &raw)?)
      })
      .await?;

    Ok(suggestion)
  }

  async fn replace_suggestion(&self, suggestion: &Suggestion) -> Result<bool> {
    let raw = RawSuggestion::encode(suggestion)?;
    let _gate = self.gate.lock().await;

    Ok(
      self
        .conn
        .call(move |conn| {
          queries::close_abandoned(conn)?;
          Ok(queries::update_suggestion(conn, &raw)?)
        })
        .await?,
    )
  }

  async fn start_session(&self) -> Result<SqliteSession> {
    let gate = Arc::clone(&self.gate).lock_owned().await;
    SqliteSession::begin(self.conn.clone(), gate).await
  }

  async fn supports_transactions(&self) -> Result<bool> { Ok(self.transactions) }
}

// ─── UserDirectory impl ──────────────────────────────────────────────────────

impl UserDirectory for SqliteStore {
  type Error = crate::Error;

  async fn get_user(&self, id: Uuid) -> Result<Option<UserProfile>> {
    let id_str = encode_uuid(id);
    let _gate = self.gate.lock().await;

    let document = self
      .conn
      .call(move |conn| {
        queries::close_abandoned(conn)?;
        Ok(queries::select_user(conn, &id_str)?)
      })
      .await?;

    document.as_deref().map(decode_user).transpose()
  }

  async fn replace_user(&self, user: &UserProfile) -> Result<bool> {
    let raw = RawUser::encode(user)?;
    let _gate = self.gate.lock().await;

    Ok(
      self
        .conn
        .call(move |conn| {
          queries::close_abandoned(conn)?;
          Ok(queries::update_user(conn, &raw)?)
        })
        .await?,
    )
  }

  async fn insert_user(&self, user: &UserProfile) -> Result<()> {
    let raw = RawUser::encode(user)?;
    let _gate = self.gate.lock().await;

    self
      .conn
      .call(move |conn| {
        queries::close_abandoned(conn)?;
        Ok(queries::insert_user(conn, &raw)?)
      })
      .await?;
    Ok(())
  }
}
