//! SQLite backend for the Ballot suggestion board.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime. Suggestions and user profiles are
//! stored as JSON documents, one row each.

mod encode;
mod queries;
mod schema;
mod session;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use session::SqliteSession;
pub use store::SqliteStore;
