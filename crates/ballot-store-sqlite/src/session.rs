//! [`SqliteSession`]: a `BEGIN IMMEDIATE` transaction spanning the
//! suggestion and user tables.

use ballot_core::{
  store::StoreSession,
  suggestion::{NewSuggestion, Suggestion},
  user::UserProfile,
};
use chrono::Utc;
use tokio::sync::OwnedMutexGuard;
use uuid::Uuid;

use crate::{
  Result,
  encode::{
    RawFilter, RawSuggestion, RawUser, decode_suggestions, decode_user,
    encode_uuid,
  },
  queries,
};

/// An open transaction on a [`SqliteStore`](crate::SqliteStore).
///
/// Holds the store's gate for its whole lifetime. Dropping a session that
/// was neither committed nor aborted rolls it back on a background task
/// before the gate is released. Without a runtime to spawn on, the open
/// transaction is rolled back by the next operation on the store.
pub struct SqliteSession {
  conn: tokio_rusqlite::Connection,
  gate: Option<OwnedMutexGuard<()>>,
}

impl SqliteSession {
  pub(crate) async fn begin(
    conn: tokio_rusqlite::Connection,
    gate: OwnedMutexGuard<()>,
  ) -> Result<Self> {
    conn
      .call(|conn| {
        queries::close_abandoned(conn)?;
        conn.execute_batch("BEGIN IMMEDIATE")?;
        Ok(())
      })
      .await?;
    Ok(Self {
      conn,
      gate: Some(gate),
    })
  }

  async fn finish(&mut self, statement: &'static str) -> Result<()> {
    self
      .conn
      .call(move |conn| {
        conn.execute_batch(statement)?;
        Ok(())
      })
      .await?;
    // Released only once the transaction is closed.
    self.gate = None;
    Ok(())
  }
}

impl StoreSession for SqliteSession {
  type Error = crate::Error;

  async fn find_suggestion(&mut self, id: Uuid) -> Result<Option<Suggestion>> {
    let raw_filter = RawFilter::ById(encode_uuid(id));
    let documents = self
      .conn
      .call(move |conn| Ok(queries::select_suggestions(conn, &raw_filter)?))
      .await?;
    Ok(decode_suggestions(documents)?.into_iter().next())
  }

  async fn insert_suggestion(&mut self, input: NewSuggestion) -> Result<Suggestion> {
    let suggestion = input.into_suggestion(Uuid::new_v4(), Utc::now());
    let raw = RawSuggestion::encode(&suggestion)?;
    self
      .conn
      .call(move |conn| Ok(queries::insert_suggestion(conn, &raw)?))
      .await?;
    Ok(suggestion)
  }

  async fn replace_suggestion(&mut self, suggestion: &Suggestion) -> Result<bool> {
    let raw = RawSuggestion::encode(suggestion)?;
    Ok(
      self
        .conn
        .call(move |conn| Ok(queries::update_suggestion(conn, &raw)?))
        .await?,
    )
  }

  async fn get_user(&mut self, id: Uuid) -> Result<Option<UserProfile>> {
    let id_str = encode_uuid(id);
    let document = self
      .conn
      .call(move |conn| Ok(queries::select_user(conn, &id_str)?))
      .await?;
    document.as_deref().map(decode_user).transpose()
  }

  async fn replace_user(&mut self, user: &UserProfile) -> Result<bool> {
    let raw = RawUser::encode(user)?;
    Ok(
      self
        .conn
        .call(move |conn| Ok(queries::update_user(conn, &raw)?))
        .await?,
    )
  }

  async fn commit(mut self) -> Result<()> { self.finish("COMMIT").await }

  async fn abort(mut self) -> Result<()> { self.finish("ROLLBACK").await }
}

impl Drop for SqliteSession {
  fn drop(&mut self) {
    let Some(gate) = self.gate.take() else {
      return;
    };
    let Ok(handle) = tokio::runtime::Handle::try_current() else {
      tracing::warn!("session dropped outside a runtime, deferring rollback");
      return;
    };

    let conn = self.conn.clone();
    handle.spawn(async move {
      let rolled_back = conn
        .call(|conn| {
          conn.execute_batch("ROLLBACK")?;
          Ok(())
        })
        .await;
      if let Err(e) = rolled_back {
        tracing::warn!(error = %e, "failed to roll back dropped session");
      }
      drop(gate);
    });
  }
}
