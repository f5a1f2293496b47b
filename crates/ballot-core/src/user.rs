//! User profiles, as far as the suggestion board needs them.
//!
//! A profile carries two denormalized lists of [`BasicSuggestion`]s. They
//! mirror `Suggestion::user_votes` and `Suggestion::author` respectively and
//! are only kept in sync by the data service's transactional workflows.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::suggestion::{BasicSuggestion, BasicUser};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
  pub user_id:              Uuid,
  /// Identifier issued by the external identity provider.
  pub object_identifier:    String,
  pub first_name:           String,
  pub last_name:            String,
  pub display_name:         String,
  pub email_address:        String,
  pub authored_suggestions: Vec<BasicSuggestion>,
  pub voted_on_suggestions: Vec<BasicSuggestion>,
}

impl UserProfile {
  pub fn new(
    object_identifier: impl Into<String>,
    display_name: impl Into<String>,
  ) -> Self {
    Self {
      user_id:              Uuid::new_v4(),
      object_identifier:    object_identifier.into(),
      first_name:           String::new(),
      last_name:            String::new(),
      display_name:         display_name.into(),
      email_address:        String::new(),
      authored_suggestions: Vec::new(),
      voted_on_suggestions: Vec::new(),
    }
  }

  /// The reference embedded in suggestions this user authors.
  pub fn basic(&self) -> BasicUser {
    BasicUser {
      user_id:      self.user_id,
      display_name: self.display_name.clone(),
    }
  }

  pub fn has_voted_on(&self, suggestion_id: Uuid) -> bool {
    self
      .voted_on_suggestions
      .iter()
      .any(|s| s.suggestion_id == suggestion_id)
  }

  /// Add a voted-on entry. Keeps at most one entry per suggestion.
  pub fn record_vote(&mut self, summary: BasicSuggestion) {
    if !self.has_voted_on(summary.suggestion_id) {
      self.voted_on_suggestions.push(summary);
    }
  }

  /// Drop the voted-on entry for `suggestion_id`. Returns whether one was
  /// present.
  pub fn remove_vote(&mut self, suggestion_id: Uuid) -> bool {
    let before = self.voted_on_suggestions.len();
    self
      .voted_on_suggestions
      .retain(|s| s.suggestion_id != suggestion_id);
    self.voted_on_suggestions.len() != before
  }

  pub fn record_authored(&mut self, summary: BasicSuggestion) {
    if !self
      .authored_suggestions
      .iter()
      .any(|s| s.suggestion_id == summary.suggestion_id)
    {
      self.authored_suggestions.push(summary);
    }
  }
}
