//! Conversions between domain documents and the rows stored in SQLite.
//!
//! UUIDs are stored as hyphenated lowercase strings. Documents are stored as
//! compact JSON; a few fields are copied into plain columns for filtering.

use ballot_core::{
  store::SuggestionFilter,
  suggestion::Suggestion,
  user::UserProfile,
};
use uuid::Uuid;

use crate::Result;

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

// ─── Suggestions ─────────────────────────────────────────────────────────────

/// Column values for one `suggestions` row.
pub struct RawSuggestion {
  pub suggestion_id: String,
  pub author_id:     String,
  pub archived:      bool,
  pub document:      String,
}

impl RawSuggestion {
  pub fn encode(s: &Suggestion) -> Result<Self> {
    Ok(Self {
      suggestion_id: encode_uuid(s.suggestion_id),
      author_id:     encode_uuid(s.author.user_id),
      archived:      s.archived,
      document:      serde_json::to_string(s)?,
    })
  }
}

pub fn decode_suggestion(document: &str) -> Result<Suggestion> {
  Ok(serde_json::from_str(document)?)
}

pub fn decode_suggestions(documents: Vec<String>) -> Result<Vec<Suggestion>> {
  documents.iter().map(|d| decode_suggestion(d)).collect()
}

/// A [`SuggestionFilter`] with its parameter already encoded.
pub enum RawFilter {
  NotArchived,
  ById(String),
  ByAuthor(String),
}

impl From<SuggestionFilter> for RawFilter {
  fn from(filter: SuggestionFilter) -> Self {
    match filter {
      SuggestionFilter::NotArchived => Self::NotArchived,
      SuggestionFilter::ById(id) => Self::ById(encode_uuid(id)),
      SuggestionFilter::ByAuthor(id) => Self::ByAuthor(encode_uuid(id)),
    }
  }
}

// ─── Users ───────────────────────────────────────────────────────────────────

/// Column values for one `users` row.
pub struct RawUser {
  pub user_id:           String,
  pub object_identifier: String,
  pub document:          String,
}

impl RawUser {
  pub fn encode(u: &UserProfile) -> Result<Self> {
    Ok(Self {
      user_id:           encode_uuid(u.user_id),
      object_identifier: u.object_identifier.clone(),
      document:          serde_json::to_string(u)?,
    })
  }
}

pub fn decode_user(document: &str) -> Result<UserProfile> {
  Ok(serde_json::from_str(document)?)
}
