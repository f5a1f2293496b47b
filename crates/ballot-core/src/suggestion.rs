//! Suggestions: the documents users author and vote on.
//!
//! A suggestion is publicly listed while it is not archived, and is "pending
//! approval" until a moderator either approves or rejects it. Votes are a set
//! of user ids: membership, not a counter, decides whether a user has voted.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display};
use uuid::Uuid;

// ─── References ──────────────────────────────────────────────────────────────

/// The author reference embedded in a suggestion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BasicUser {
  pub user_id:      Uuid,
  pub display_name: String,
}

/// A denormalized summary of a suggestion, embedded in a user's
/// `voted_on_suggestions` and `authored_suggestions` lists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BasicSuggestion {
  pub suggestion_id: Uuid,
  pub suggestion:    String,
}

impl From<&Suggestion> for BasicSuggestion {
  fn from(s: &Suggestion) -> Self {
    Self {
      suggestion_id: s.suggestion_id,
      suggestion:    s.suggestion.clone(),
    }
  }
}

// ─── Suggestion ──────────────────────────────────────────────────────────────

/// A stored suggestion document. Replaced wholesale on every write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestion {
  /// Store-assigned; never changes after insert.
  pub suggestion_id:        Uuid,
  /// The short headline text of the suggestion.
  pub suggestion:           String,
  pub description:          String,
  pub category:             Option<String>,
  pub author:               BasicUser,
  /// Store-assigned insert timestamp.
  pub created_at:           DateTime<Utc>,
  /// Ids of the users who currently vote for this suggestion.
  pub user_votes:           BTreeSet<Uuid>,
  /// Moderator-facing status label, e.g. "in work" or "completed".
  pub status:               Option<String>,
  pub owner_notes:          Option<String>,
  pub approved_for_release: bool,
  pub archived:             bool,
  pub rejected:             bool,
}

impl Suggestion {
  /// Add `user_id` to the vote set, or remove it if it was already present.
  ///
  /// Returns the direction the toggle went.
  pub fn toggle_vote(&mut self, user_id: Uuid) -> VoteOutcome {
    if self.user_votes.insert(user_id) {
      VoteOutcome::Voted
    } else {
      self.user_votes.remove(&user_id);
      VoteOutcome::Retracted
    }
  }

  pub fn has_voted(&self, user_id: Uuid) -> bool {
    self.user_votes.contains(&user_id)
  }

  pub fn vote_count(&self) -> usize { self.user_votes.len() }

  /// Neither approved nor rejected yet.
  pub fn is_pending_approval(&self) -> bool {
    !self.approved_for_release && !self.rejected
  }

  pub fn summary(&self) -> BasicSuggestion { BasicSuggestion::from(self) }
}

// ─── NewSuggestion ───────────────────────────────────────────────────────────

/// Input to [`crate::store::SuggestionStore::insert_suggestion`].
///
/// The id and `created_at` are always set by the store. A new suggestion
/// starts with no votes and is pending approval.
#[derive(Debug, Clone)]
pub struct NewSuggestion {
  pub suggestion:  String,
  pub description: String,
  pub category:    Option<String>,
  pub author:      BasicUser,
}

impl NewSuggestion {
  pub fn new(author: BasicUser, suggestion: impl Into<String>) -> Self {
    Self {
      suggestion: suggestion.into(),
      description: String::new(),
      category: None,
      author,
    }
  }

  /// Materialise the stored document once the store has picked an id and
  /// timestamp.
  pub fn into_suggestion(
    self,
    suggestion_id: Uuid,
    created_at: DateTime<Utc>,
  ) -> Suggestion {
    Suggestion {
      suggestion_id,
      suggestion: self.suggestion,
      description: self.description,
      category: self.category,
      author: self.author,
      created_at,
      user_votes: BTreeSet::new(),
      status: None,
      owner_notes: None,
      approved_for_release: false,
      archived: false,
      rejected: false,
    }
  }
}

// ─── VoteOutcome ─────────────────────────────────────────────────────────────

/// Which way a vote toggle went.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum VoteOutcome {
  /// The user was not in the vote set and now is.
  Voted,
  /// The user was in the vote set and has been removed.
  Retracted,
}

impl VoteOutcome {
  pub fn is_upvote(self) -> bool { matches!(self, Self::Voted) }
}
