//! SQL schema for the Ballot SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

-- One JSON document per suggestion. `seq` fixes store order; the other
-- columns mirror document fields that queries filter on.
CREATE TABLE IF NOT EXISTS suggestions (
    seq            INTEGER PRIMARY KEY AUTOINCREMENT,
    suggestion_id  TEXT NOT NULL UNIQUE,
    author_id      TEXT NOT NULL,
    archived       INTEGER NOT NULL DEFAULT 0,
    document       TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS users (
    user_id            TEXT PRIMARY KEY,
    object_identifier  TEXT NOT NULL UNIQUE,
    document           TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS suggestions_author_idx   ON suggestions(author_id);
CREATE INDEX IF NOT EXISTS suggestions_archived_idx ON suggestions(archived);

PRAGMA user_version = 1;
";
