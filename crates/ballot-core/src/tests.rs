//! Unit tests for the domain types.

use chrono::Utc;
use uuid::Uuid;

use crate::{
  Error,
  store::{StoreErrorKind, StoreFailure, SuggestionFilter},
  suggestion::{BasicUser, NewSuggestion, Suggestion, VoteOutcome},
  user::UserProfile,
};

fn author() -> BasicUser {
  BasicUser {
    user_id:      Uuid::new_v4(),
    display_name: "Ada".into(),
  }
}

fn suggestion() -> Suggestion {
  NewSuggestion::new(author(), "Dark mode").into_suggestion(Uuid::new_v4(), Utc::now())
}

// ─── Suggestion ──────────────────────────────────────────────────────────────

#[test]
fn new_suggestion_starts_pending_without_votes() {
  let s = suggestion();
  assert!(s.is_pending_approval());
  assert_eq!(s.vote_count(), 0);
  assert!(!s.archived);
}

#[test]
fn toggle_vote_adds_then_removes() {
  let mut s = suggestion();
  let voter = Uuid::new_v4();

  assert_eq!(s.toggle_vote(voter), VoteOutcome::Voted);
  assert!(s.has_voted(voter));
  assert_eq!(s.vote_count(), 1);

  assert_eq!(s.toggle_vote(voter), VoteOutcome::Retracted);
  assert!(!s.has_voted(voter));
  assert_eq!(s.vote_count(), 0);
}

#[test]
fn toggle_vote_leaves_other_voters_alone() {
  let mut s = suggestion();
  let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
  s.toggle_vote(a);
  s.toggle_vote(b);
  s.toggle_vote(a);

  assert!(!s.has_voted(a));
  assert!(s.has_voted(b));
}

#[test]
fn approval_states_are_disjoint() {
  let mut s = suggestion();
  s.approved_for_release = true;
  assert!(!s.is_pending_approval());

  s.approved_for_release = false;
  s.rejected = true;
  assert!(!s.is_pending_approval());
}

#[test]
fn vote_outcome_renders_snake_case() {
  assert_eq!(VoteOutcome::Retracted.to_string(), "retracted");
  assert_eq!(
    serde_json::to_string(&VoteOutcome::Voted).unwrap(),
    "\"voted\""
  );
  assert!(VoteOutcome::Voted.is_upvote());
}

// ─── Filters ─────────────────────────────────────────────────────────────────

#[test]
fn filters_match_expected_documents() {
  let mut s = suggestion();
  assert!(SuggestionFilter::NotArchived.matches(&s));
  assert!(SuggestionFilter::ById(s.suggestion_id).matches(&s));
  assert!(SuggestionFilter::ByAuthor(s.author.user_id).matches(&s));
  assert!(!SuggestionFilter::ByAuthor(Uuid::new_v4()).matches(&s));

  s.archived = true;
  assert!(!SuggestionFilter::NotArchived.matches(&s));
}

// ─── UserProfile ─────────────────────────────────────────────────────────────

#[test]
fn record_vote_keeps_one_entry_per_suggestion() {
  let s = suggestion();
  let mut user = UserProfile::new("oid-1", "Grace");

  user.record_vote(s.summary());
  user.record_vote(s.summary());
  assert_eq!(user.voted_on_suggestions.len(), 1);
  assert!(user.has_voted_on(s.suggestion_id));

  assert!(user.remove_vote(s.suggestion_id));
  assert!(!user.remove_vote(s.suggestion_id));
  assert!(user.voted_on_suggestions.is_empty());
}

#[test]
fn record_authored_is_idempotent() {
  let s = suggestion();
  let mut user = UserProfile::new("oid-2", "Linus");
  user.record_authored(s.summary());
  user.record_authored(s.summary());
  assert_eq!(user.authored_suggestions, vec![s.summary()]);
}

// ─── Errors ──────────────────────────────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
#[error("backend said no")]
struct Failure(StoreErrorKind);

impl StoreFailure for Failure {
  fn kind(&self) -> StoreErrorKind { self.0 }
}

#[test]
fn only_unavailable_failures_map_to_store_unavailable() {
  assert!(matches!(
    Error::store(Failure(StoreErrorKind::Unavailable)),
    Error::StoreUnavailable(_)
  ));
  assert!(matches!(
    Error::store(Failure(StoreErrorKind::Other)),
    Error::Store(_)
  ));
  assert!(matches!(
    Error::store(Failure(StoreErrorKind::Conflict)),
    Error::Store(_)
  ));
}
