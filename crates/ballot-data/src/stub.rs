//! An in-memory store for service tests.
//!
//! Counts store round-trips and can be told to fail specific operations.
//! Sessions work on a private copy of the data. On commit only the documents
//! the session wrote are copied back, so aborted sessions leave no trace and
//! writes made elsewhere in the meantime survive.

use std::sync::{
  Arc, Mutex,
  atomic::{AtomicBool, AtomicU32, AtomicUsize, Ordering},
};

use ballot_core::{
  store::{
    StoreErrorKind, StoreFailure, StoreSession, SuggestionFilter,
    SuggestionStore, UserDirectory,
  },
  suggestion::{NewSuggestion, Suggestion},
  user::UserProfile,
};
use chrono::Utc;
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum StubError {
  #[error("write conflict")]
  Conflict,
  #[error("injected failure")]
  Injected,
  #[error("backend offline")]
  Offline,
}

impl StoreFailure for StubError {
  fn kind(&self) -> StoreErrorKind {
    match self {
      Self::Conflict => StoreErrorKind::Conflict,
      Self::Injected => StoreErrorKind::Other,
      Self::Offline => StoreErrorKind::Unavailable,
    }
  }
}

#[derive(Debug, Clone, Default)]
struct Data {
  suggestions: Vec<Suggestion>,
  users:       Vec<UserProfile>,
}

impl Data {
  fn insert_suggestion(&mut self, input: NewSuggestion) -> Suggestion {
    let created = input.into_suggestion(Uuid::new_v4(), Utc::now());
    self.suggestions.push(created.clone());
    created
  }

  fn replace_suggestion(&mut self, suggestion: &Suggestion) -> bool {
    match self
      .suggestions
      .iter_mut()
      .find(|s| s.suggestion_id == suggestion.suggestion_id)
    {
      Some(slot) => {
        *slot = suggestion.clone();
        true
      }
      None => false,
    }
  }

  fn user(&self, id: Uuid) -> Option<UserProfile> {
    self.users.iter().find(|u| u.user_id == id).cloned()
  }

  fn replace_user(&mut self, user: &UserProfile) -> bool {
    match self.users.iter_mut().find(|u| u.user_id == user.user_id) {
      Some(slot) => {
        *slot = user.clone();
        true
      }
      None => false,
    }
  }

  fn upsert_suggestion(&mut self, suggestion: Suggestion) {
    if !self.replace_suggestion(&suggestion) {
      self.suggestions.push(suggestion);
    }
  }
}

#[derive(Default)]
struct Inner {
  data:                Mutex<Data>,
  no_transactions:     AtomicBool,
  fail_user_replace:   AtomicBool,
  conflicts_remaining: AtomicU32,
  next_find_failure:   Mutex<Option<StubError>>,
  find_calls:          AtomicUsize,
  probe_calls:         AtomicUsize,
  sessions_started:    AtomicUsize,
}

#[derive(Clone, Default)]
pub struct StubStore {
  inner: Arc<Inner>,
}

impl StubStore {
  pub fn new() -> Self { Self::default() }

  pub fn set_transactions(&self, supported: bool) {
    self.inner.no_transactions.store(!supported, Ordering::SeqCst);
  }

  /// Make every `replace_user`, in or out of a session, fail.
  pub fn fail_user_replace(&self, fail: bool) {
    self.inner.fail_user_replace.store(fail, Ordering::SeqCst);
  }

  /// Make the next `n` session starts report a write conflict.
  pub fn conflict_next(&self, n: u32) {
    self.inner.conflicts_remaining.store(n, Ordering::SeqCst);
  }

  /// Make the next `find_suggestions` call fail with `error`.
  pub fn fail_next_find(&self, error: StubError) {
    *self.inner.next_find_failure.lock().unwrap() = Some(error);
  }

  pub fn find_calls(&self) -> usize { self.inner.find_calls.load(Ordering::SeqCst) }

  pub fn probe_calls(&self) -> usize { self.inner.probe_calls.load(Ordering::SeqCst) }

  pub fn sessions_started(&self) -> usize {
    self.inner.sessions_started.load(Ordering::SeqCst)
  }

  pub fn seed_user(&self, display_name: &str) -> UserProfile {
    let user = UserProfile::new(format!("oid-{display_name}"), display_name);
    self.lock().users.push(user.clone());
    user
  }

  pub fn seed_suggestion(
    &self,
    author: &UserProfile,
    text: &str,
    edit: impl FnOnce(&mut Suggestion),
  ) -> Suggestion {
    let mut data = self.lock();
    let mut created = data.insert_suggestion(NewSuggestion::new(author.basic(), text));
    edit(&mut created);
    data.replace_suggestion(&created);
    created
  }

  /// Read a suggestion without counting it as a store query.
  pub fn peek_suggestion(&self, id: Uuid) -> Option<Suggestion> {
    self
      .lock()
      .suggestions
      .iter()
      .find(|s| s.suggestion_id == id)
      .cloned()
  }

  pub fn peek_user(&self, id: Uuid) -> Option<UserProfile> { self.lock().user(id) }

  pub fn suggestion_count(&self) -> usize { self.lock().suggestions.len() }

  fn lock(&self) -> std::sync::MutexGuard<'_, Data> { self.inner.data.lock().unwrap() }

  fn check_user_replace(&self) -> Result<(), StubError> {
    if self.inner.fail_user_replace.load(Ordering::SeqCst) {
      Err(StubError::Injected)
    } else {
      Ok(())
    }
  }
}

impl SuggestionStore for StubStore {
  type Error = StubError;
  type Session = StubSession;

  async fn find_suggestions(
    &self,
    filter: SuggestionFilter,
  ) -> Result<Vec<Suggestion>, StubError> {
    self.inner.find_calls.fetch_add(1, Ordering::SeqCst);
    if let Some(error) = self.inner.next_find_failure.lock().unwrap().take() {
      return Err(error);
    }
    Ok(
      self
        .lock()
        .suggestions
        .iter()
        .filter(|s| filter.matches(s))
        .cloned()
        .collect(),
    )
  }

  async fn insert_suggestion(
    &self,
    input: NewSuggestion,
  ) -> Result<Suggestion, StubError> {
    Ok(self.lock().insert_suggestion(input))
  }

  async fn replace_suggestion(
    &self,
    suggestion: &Suggestion,
  ) -> Result<bool, StubError> {
    Ok(self.lock().replace_suggestion(suggestion))
  }

  async fn start_session(&self) -> Result<StubSession, StubError> {
    self.inner.sessions_started.fetch_add(1, Ordering::SeqCst);
    let conflicted = self
      .inner
      .conflicts_remaining
      .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
      .is_ok();
    if conflicted {
      return Err(StubError::Conflict);
    }
    Ok(StubSession {
      store:               self.clone(),
      working:             self.lock().clone(),
      touched_suggestions: Vec::new(),
      touched_users:       Vec::new(),
    })
  }

  async fn supports_transactions(&self) -> Result<bool, StubError> {
    self.inner.probe_calls.fetch_add(1, Ordering::SeqCst);
    Ok(!self.inner.no_transactions.load(Ordering::SeqCst))
  }
}

impl UserDirectory for StubStore {
  type Error = StubError;

  async fn get_user(&self, id: Uuid) -> Result<Option<UserProfile>, StubError> {
    Ok(self.lock().user(id))
  }

  async fn replace_user(&self, user: &UserProfile) -> Result<bool, StubError> {
    self.check_user_replace()?;
    Ok(self.lock().replace_user(user))
  }

  async fn insert_user(&self, user: &UserProfile) -> Result<(), StubError> {
    self.lock().users.push(user.clone());
    Ok(())
  }
}

pub struct StubSession {
  store:               StubStore,
  working:             Data,
  touched_suggestions: Vec<Uuid>,
  touched_users:       Vec<Uuid>,
}

impl StoreSession for StubSession {
  type Error = StubError;

  async fn find_suggestion(
    &mut self,
    id: Uuid,
  ) -> Result<Option<Suggestion>, StubError> {
    Ok(
      self
        .working
        .suggestions
        .iter()
        .find(|s| s.suggestion_id == id)
        .cloned(),
    )
  }

  async fn insert_suggestion(
    &mut self,
    input: NewSuggestion,
  ) -> Result<Suggestion, StubError> {
    let created = self.working.insert_suggestion(input);
    self.touched_suggestions.push(created.suggestion_id);
    Ok(created)
  }

  async fn replace_suggestion(
    &mut self,
    suggestion: &Suggestion,
  ) -> Result<bool, StubError> {
    let matched = self.working.replace_suggestion(suggestion);
    if matched {
      self.touched_suggestions.push(suggestion.suggestion_id);
    }
    Ok(matched)
  }

  async fn get_user(&mut self, id: Uuid) -> Result<Option<UserProfile>, StubError> {
    Ok(self.working.user(id))
  }

  async fn replace_user(&mut self, user: &UserProfile) -> Result<bool, StubError> {
    self.store.check_user_replace()?;
    let matched = self.working.replace_user(user);
    if matched {
      self.touched_users.push(user.user_id);
    }
    Ok(matched)
  }

  async fn commit(self) -> Result<(), StubError> {
    let mut shared = self.store.lock();
    for id in &self.touched_suggestions {
      if let Some(s) = self.working.suggestions.iter().find(|s| s.suggestion_id == *id) {
        shared.upsert_suggestion(s.clone());
      }
    }
    for id in &self.touched_users {
      if let Some(u) = self.working.user(*id) {
        shared.replace_user(&u);
      }
    }
    Ok(())
  }

  async fn abort(self) -> Result<(), StubError> { Ok(()) }
}
