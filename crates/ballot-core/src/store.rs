//! The Store Handle and User Directory traits.
//!
//! These are implemented by storage backends (e.g. `ballot-store-sqlite`).
//! The data service depends on these abstractions, not on any concrete
//! backend.

use std::future::Future;

use strum::Display;
use uuid::Uuid;

use crate::{
  suggestion::{NewSuggestion, Suggestion},
  user::UserProfile,
};

// ─── Failure classification ──────────────────────────────────────────────────

/// Coarse classification of a backend failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum StoreErrorKind {
  /// A concurrent writer got in the way; retrying the transaction may
  /// succeed.
  Conflict,
  /// The backend could not be reached or is not accepting work.
  Unavailable,
  Other,
}

/// Implemented by every backend error type so callers can tell transient
/// conflicts from everything else.
pub trait StoreFailure: std::error::Error + Send + Sync + 'static {
  fn kind(&self) -> StoreErrorKind;

  fn is_conflict(&self) -> bool { self.kind() == StoreErrorKind::Conflict }
}

// ─── Query type ──────────────────────────────────────────────────────────────

/// The predicates the data service issues against the suggestion collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuggestionFilter {
  /// Every suggestion whose `archived` flag is false.
  NotArchived,
  ById(Uuid),
  ByAuthor(Uuid),
}

impl SuggestionFilter {
  pub fn matches(&self, suggestion: &Suggestion) -> bool {
    match *self {
      Self::NotArchived => !suggestion.archived,
      Self::ById(id) => suggestion.suggestion_id == id,
      Self::ByAuthor(id) => suggestion.author.user_id == id,
    }
  }
}

// ─── Store handle ────────────────────────────────────────────────────────────

/// Typed access to the suggestion collection, plus sessions spanning the
/// suggestion and user collections.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes.
pub trait SuggestionStore: Send + Sync {
  type Error: StoreFailure;
  type Session: StoreSession<Error = Self::Error>;

  /// Return every suggestion matching `filter`, in store order.
  fn find_suggestions(
    &self,
    filter: SuggestionFilter,
  ) -> impl Future<Output = Result<Vec<Suggestion>, Self::Error>> + Send + '_;

  /// Insert a new suggestion. The store assigns its id and timestamp.
  fn insert_suggestion(
    &self,
    input: NewSuggestion,
  ) -> impl Future<Output = Result<Suggestion, Self::Error>> + Send + '_;

  /// Replace the stored document with the same id. Returns `false` if no
  /// document matched.
  fn replace_suggestion<'a>(
    &'a self,
    suggestion: &'a Suggestion,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + 'a;

  /// Begin a multi-document transaction.
  fn start_session(
    &self,
  ) -> impl Future<Output = Result<Self::Session, Self::Error>> + Send + '_;

  /// Whether the connected deployment can run multi-document transactions.
  fn supports_transactions(
    &self,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;
}

/// An open transaction. Writes become visible on [`commit`](Self::commit)
/// and are discarded on [`abort`](Self::abort). Dropping a session without
/// committing must behave like an abort.
pub trait StoreSession: Send {
  type Error: StoreFailure;

  fn find_suggestion(
    &mut self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Suggestion>, Self::Error>> + Send + '_;

  fn insert_suggestion(
    &mut self,
    input: NewSuggestion,
  ) -> impl Future<Output = Result<Suggestion, Self::Error>> + Send + '_;

  fn replace_suggestion<'a>(
    &'a mut self,
    suggestion: &'a Suggestion,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + 'a;

  fn get_user(
    &mut self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<UserProfile>, Self::Error>> + Send + '_;

  fn replace_user<'a>(
    &'a mut self,
    user: &'a UserProfile,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + 'a;

  fn commit(self) -> impl Future<Output = Result<(), Self::Error>> + Send;

  fn abort(self) -> impl Future<Output = Result<(), Self::Error>> + Send;
}

// ─── User directory ──────────────────────────────────────────────────────────

/// Profile lookups outside of any transaction.
pub trait UserDirectory: Send + Sync {
  type Error: StoreFailure;

  /// Retrieve a profile by id. Returns `None` if not found.
  fn get_user(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<UserProfile>, Self::Error>> + Send + '_;

  /// Replace the stored profile with the same id. Returns `false` if no
  /// profile matched.
  fn replace_user<'a>(
    &'a self,
    user: &'a UserProfile,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + 'a;

  /// Persist a brand-new profile.
  fn insert_user<'a>(
    &'a self,
    user: &'a UserProfile,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;
}
