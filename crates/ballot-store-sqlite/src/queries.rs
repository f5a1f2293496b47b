//! Statements shared by [`SqliteStore`](crate::SqliteStore) and
//! [`SqliteSession`](crate::SqliteSession).
//!
//! Each function runs synchronously on the connection thread inside a
//! `tokio_rusqlite::Connection::call` closure.

use rusqlite::{Connection, OptionalExtension as _, params};

use crate::encode::{RawFilter, RawSuggestion, RawUser};

/// Roll back a transaction left open by a session that was dropped where no
/// runtime could run its rollback. Only called with the store's gate held
/// and no session open, so any open transaction is an abandoned one.
pub fn close_abandoned(conn: &Connection) -> rusqlite::Result<()> {
  if !conn.is_autocommit() {
    tracing::warn!("rolling back transaction abandoned by a dropped session");
    conn.execute_batch("ROLLBACK")?;
  }
  Ok(())
}

pub fn select_suggestions(
  conn: &Connection,
  filter: &RawFilter,
) -> rusqlite::Result<Vec<String>> {
  let (sql, param) = match filter {
    RawFilter::NotArchived => (
      "SELECT document FROM suggestions WHERE archived = 0 ORDER BY seq",
      None,
    ),
    RawFilter::ById(id) => (
      "SELECT document FROM suggestions WHERE suggestion_id = ?1 ORDER BY seq",
      Some(id.as_str()),
    ),
    RawFilter::ByAuthor(id) => (
      "SELECT document FROM suggestions WHERE author_id = ?1 ORDER BY seq",
      Some(id.as_str()),
    ),
  };

  let mut stmt = conn.prepare(sql)?;
  match param {
    Some(p) => stmt.query_map(params![p], |row| row.get(0))?.collect(),
    None => stmt.query_map([], |row| row.get(0))?.collect(),
  }
}

pub fn insert_suggestion(
  conn: &Connection,
  raw: &RawSuggestion,
) -> rusqlite::Result<()> {
  conn.execute(
    "INSERT INTO suggestions (suggestion_id, author_id, archived, document)
     VALUES (?1, ?2, ?3, ?4)",
    params![raw.suggestion_id, raw.author_id, raw.archived, raw.document],
  )?;
  Ok(())
}

/// Returns whether a row matched.
pub fn update_suggestion(
  conn: &Connection,
  raw: &RawSuggestion,
) -> rusqlite::Result<bool> {
  let changed = conn.execute(
    "UPDATE suggestions
        SET author_id = ?2, archived = ?3, document = ?4
      WHERE suggestion_id = ?1",
    params![raw.suggestion_id, raw.author_id, raw.archived, raw.document],
  )?;
  Ok(changed > 0)
}

pub fn select_user(conn: &Connection, user_id: &str) -> rusqlite::Result<Option<String>> {
  conn
    .query_row(
      "SELECT document FROM users WHERE user_id = ?1",
      params![user_id],
      |row| row.get(0),
    )
    .optional()
}

pub fn insert_user(conn: &Connection, raw: &RawUser) -> rusqlite::Result<()> {
  conn.execute(
    "INSERT INTO users (user_id, object_identifier, document) VALUES (?1, ?2, ?3)",
    params![raw.user_id, raw.object_identifier, raw.document],
  )?;
  Ok(())
}

/// Returns whether a row matched.
pub fn update_user(conn: &Connection, raw: &RawUser) -> rusqlite::Result<bool> {
  let changed = conn.execute(
    "UPDATE users SET object_identifier = ?2, document = ?3 WHERE user_id = ?1",
    params![raw.user_id, raw.object_identifier, raw.document],
  )?;
  Ok(changed > 0)
}
