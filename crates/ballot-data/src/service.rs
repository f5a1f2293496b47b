//! [`SuggestionData`]: cache-first reads and the transactional write
//! workflows.

use std::{future::Future, sync::Arc};

use ballot_core::{
  BoxError, Error, Result,
  cache::{CacheKey, Snapshot, SuggestionCache},
  store::{
    StoreFailure, StoreSession, SuggestionFilter, SuggestionStore,
    UserDirectory,
  },
  suggestion::{NewSuggestion, Suggestion, VoteOutcome},
};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{cache::MemoryCache, capability::CapabilityProbe, config::DataConfig};

/// Why one attempt at a transactional workflow failed.
enum TxFailure<E> {
  /// The store rejected an operation; retried if it reports a conflict.
  Store(E),
  /// A lookup inside the transaction came back empty. Never retried.
  Missing(Error),
}

// ─── Service ─────────────────────────────────────────────────────────────────

/// The suggestion data service.
///
/// Cloning is cheap; the store, directory and cache are reference-counted,
/// so every clone shares the same cache entries.
pub struct SuggestionData<S, U, C = MemoryCache> {
  store:      Arc<S>,
  users:      Arc<U>,
  cache:      Arc<C>,
  config:     DataConfig,
  capability: Arc<CapabilityProbe>,
}

impl<S, U, C> Clone for SuggestionData<S, U, C> {
  fn clone(&self) -> Self {
    Self {
      store:      Arc::clone(&self.store),
      users:      Arc::clone(&self.users),
      cache:      Arc::clone(&self.cache),
      config:     self.config.clone(),
      capability: Arc::clone(&self.capability),
    }
  }
}

impl<S, U, C> SuggestionData<S, U, C>
where
  S: SuggestionStore,
  U: UserDirectory,
  C: SuggestionCache,
{
  pub fn new(
    store: Arc<S>,
    users: Arc<U>,
    cache: Arc<C>,
    config: DataConfig,
  ) -> Self {
    let capability = Arc::new(CapabilityProbe::new(config.capability_ttl()));
    Self {
      store,
      users,
      cache,
      config,
      capability,
    }
  }

  // ── Reads ─────────────────────────────────────────────────────────────────

  /// Every non-archived suggestion, served from the cache when possible.
  pub async fn get_all_suggestions(&self) -> Result<Vec<Suggestion>> {
    let all = self
      .cached_list(CacheKey::AllSuggestions, SuggestionFilter::NotArchived)
      .await?;
    Ok(all.to_vec())
  }

  pub async fn get_all_approved_suggestions(&self) -> Result<Vec<Suggestion>> {
    let all = self
      .cached_list(CacheKey::AllSuggestions, SuggestionFilter::NotArchived)
      .await?;
    Ok(
      all
        .iter()
        .filter(|s| s.approved_for_release)
        .cloned()
        .collect(),
    )
  }

  pub async fn get_all_suggestions_waiting_for_approval(
    &self,
  ) -> Result<Vec<Suggestion>> {
    let all = self
      .cached_list(CacheKey::AllSuggestions, SuggestionFilter::NotArchived)
      .await?;
    Ok(
      all
        .iter()
        .filter(|s| s.is_pending_approval())
        .cloned()
        .collect(),
    )
  }

  /// Look a single suggestion up in the store. Never cached.
  pub async fn get_suggestion(&self, id: Uuid) -> Result<Option<Suggestion>> {
    let found = self
      .store
      .find_suggestions(SuggestionFilter::ById(id))
      .await
      .map_err(Error::store)?;
    Ok(found.into_iter().next())
  }

  /// Every suggestion authored by `user_id`, archived ones included.
  pub async fn get_users_suggestions(
    &self,
    user_id: Uuid,
  ) -> Result<Vec<Suggestion>> {
    let authored = self
      .cached_list(
        CacheKey::AuthoredBy(user_id),
        SuggestionFilter::ByAuthor(user_id),
      )
      .await?;
    Ok(authored.to_vec())
  }

  async fn cached_list(
    &self,
    key: CacheKey,
    filter: SuggestionFilter,
  ) -> Result<Snapshot> {
    if let Some(hit) = self.cache.get(&key) {
      debug!(?key, "suggestion cache hit");
      return Ok(hit);
    }

    debug!(?key, "suggestion cache miss");
    let fresh = Arc::new(
      self
        .store
        .find_suggestions(filter)
        .await
        .map_err(Error::store)?,
    );
    self
      .cache
      .set(key, Arc::clone(&fresh), self.config.cache_ttl());
    Ok(fresh)
  }

  // ── Plain update ──────────────────────────────────────────────────────────

  /// Replace the stored document with `suggestion` and drop the cached full
  /// list.
  ///
  /// This does not touch any user's voted-on or authored lists; use
  /// [`upvote_suggestion`](Self::upvote_suggestion) to change votes.
  pub async fn update_suggestion(&self, suggestion: &Suggestion) -> Result<()> {
    let matched = self
      .store
      .replace_suggestion(suggestion)
      .await
      .map_err(Error::store)?;
    self.cache.remove(&CacheKey::AllSuggestions);

    if !matched {
      return Err(Error::SuggestionNotFound(suggestion.suggestion_id));
    }
    Ok(())
  }

  // ── Vote toggle ───────────────────────────────────────────────────────────

  /// Toggle `user_id`'s vote on a suggestion: cast it if absent, retract it
  /// if present. The suggestion's vote set and the user's voted-on list are
  /// written in one transaction.
  pub async fn upvote_suggestion(
    &self,
    suggestion_id: Uuid,
    user_id: Uuid,
  ) -> Result<VoteOutcome> {
    let outcome = self
      .retrying("upvote", || self.try_toggle_vote(suggestion_id, user_id))
      .await?;

    self.cache.remove(&CacheKey::AllSuggestions);
    info!(%suggestion_id, %user_id, %outcome, "vote toggled");
    Ok(outcome)
  }

  async fn try_toggle_vote(
    &self,
    suggestion_id: Uuid,
    user_id: Uuid,
  ) -> Result<VoteOutcome, TxFailure<S::Error>> {
    let mut session = self.store.start_session().await.map_err(TxFailure::Store)?;
    match toggle_vote_in(&mut session, suggestion_id, user_id).await {
      Ok(outcome) => {
        session.commit().await.map_err(TxFailure::Store)?;
        Ok(outcome)
      }
      Err(failure) => {
        abort_quietly(session).await;
        Err(failure)
      }
    }
  }

  // ── Creation ──────────────────────────────────────────────────────────────

  /// Insert a new suggestion and record it on its author's profile.
  ///
  /// When the store cannot run transactions the two writes happen
  /// independently; if the second one fails the suggestion stays stored and
  /// [`Error::PartialWriteInconsistency`] is returned.
  pub async fn create_suggestion(
    &self,
    input: NewSuggestion,
  ) -> Result<Suggestion> {
    let author_id = input.author.user_id;

    let created = if self.transactions_supported().await? {
      self
        .retrying("create", || self.try_create(input.clone()))
        .await?
    } else {
      warn!(%author_id, "store lacks transactions, creating suggestion without one");
      self.create_without_transaction(input).await?
    };

    // New suggestions are pending approval, so the full list needs no
    // eviction. The author's own list does.
    self.cache.remove(&CacheKey::AuthoredBy(author_id));
    info!(suggestion_id = %created.suggestion_id, %author_id, "suggestion created");
    Ok(created)
  }

  async fn transactions_supported(&self) -> Result<bool> {
    if let Some(supported) = self.capability.cached() {
      return Ok(supported);
    }
    let supported = self
      .store
      .supports_transactions()
      .await
      .map_err(Error::store)?;
    self.capability.remember(supported);
    Ok(supported)
  }

  async fn try_create(
    &self,
    input: NewSuggestion,
  ) -> Result<Suggestion, TxFailure<S::Error>> {
    let mut session = self.store.start_session().await.map_err(TxFailure::Store)?;
    match create_in(&mut session, input).await {
      Ok(created) => {
        session.commit().await.map_err(TxFailure::Store)?;
        Ok(created)
      }
      Err(failure) => {
        abort_quietly(session).await;
        Err(failure)
      }
    }
  }

  async fn create_without_transaction(
    &self,
    input: NewSuggestion,
  ) -> Result<Suggestion> {
    let author_id = input.author.user_id;
    let mut author = self
      .users
      .get_user(author_id)
      .await
      .map_err(Error::store)?
      .ok_or(Error::UserNotFound(author_id))?;

    let created = self
      .store
      .insert_suggestion(input)
      .await
      .map_err(Error::store)?;

    // From here on a failure leaves the suggestion without its authored
    // entry. Nothing rolls the insert back.
    author.record_authored(created.summary());
    let source: BoxError = match self.users.replace_user(&author).await {
      Ok(true) => return Ok(created),
      Ok(false) => Box::new(Error::UserNotFound(author_id)),
      Err(e) => Box::new(e),
    };

    warn!(
      suggestion_id = %created.suggestion_id,
      %author_id,
      error = %source,
      "suggestion stored but author profile update failed"
    );
    Err(Error::PartialWriteInconsistency {
      suggestion_id: created.suggestion_id,
      source,
    })
  }

  // ── Retry ─────────────────────────────────────────────────────────────────

  async fn retrying<T, F, Fut>(&self, workflow: &'static str, mut attempt: F) -> Result<T>
  where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, TxFailure<S::Error>>>,
  {
    let policy = &self.config.retry;
    let mut made = 1;
    loop {
      match attempt().await {
        Ok(value) => return Ok(value),
        Err(TxFailure::Missing(e)) => return Err(e),
        Err(TxFailure::Store(e)) if e.is_conflict() && made < policy.attempts() => {
          let delay = policy.backoff(made);
          warn!(workflow, attempt = made, ?delay, error = %e, "transaction conflict, retrying");
          tokio::time::sleep(delay).await;
          made += 1;
        }
        Err(TxFailure::Store(e)) => {
          warn!(workflow, attempts = made, error = %e, "transaction aborted");
          return Err(Error::TransactionAborted {
            attempts: made,
            source:   Box::new(e),
          });
        }
      }
    }
  }
}

// ─── Transaction bodies ──────────────────────────────────────────────────────

async fn toggle_vote_in<T: StoreSession>(
  session: &mut T,
  suggestion_id: Uuid,
  user_id: Uuid,
) -> Result<VoteOutcome, TxFailure<T::Error>> {
  let Some(mut suggestion) = session
    .find_suggestion(suggestion_id)
    .await
    .map_err(TxFailure::Store)?
  else {
    return Err(TxFailure::Missing(Error::SuggestionNotFound(suggestion_id)));
  };

  let outcome = suggestion.toggle_vote(user_id);
  if !session
    .replace_suggestion(&suggestion)
    .await
    .map_err(TxFailure::Store)?
  {
    return Err(TxFailure::Missing(Error::SuggestionNotFound(suggestion_id)));
  }

  let Some(mut user) = session.get_user(user_id).await.map_err(TxFailure::Store)?
  else {
    return Err(TxFailure::Missing(Error::UserNotFound(user_id)));
  };

  match outcome {
    VoteOutcome::Voted => user.record_vote(suggestion.summary()),
    VoteOutcome::Retracted => {
      if !user.remove_vote(suggestion_id) {
        debug!(%suggestion_id, %user_id, "retracted vote had no voted-on entry");
      }
    }
  }

  if !session.replace_user(&user).await.map_err(TxFailure::Store)? {
    return Err(TxFailure::Missing(Error::UserNotFound(user_id)));
  }
  Ok(outcome)
}

async fn create_in<T: StoreSession>(
  session: &mut T,
  input: NewSuggestion,
) -> Result<Suggestion, TxFailure<T::Error>> {
  let author_id = input.author.user_id;
  let created = session
    .insert_suggestion(input)
    .await
    .map_err(TxFailure::Store)?;

  let Some(mut author) = session.get_user(author_id).await.map_err(TxFailure::Store)?
  else {
    return Err(TxFailure::Missing(Error::UserNotFound(author_id)));
  };

  author.record_authored(created.summary());
  if !session.replace_user(&author).await.map_err(TxFailure::Store)? {
    return Err(TxFailure::Missing(Error::UserNotFound(author_id)));
  }
  Ok(created)
}

async fn abort_quietly<T: StoreSession>(session: T) {
  if let Err(e) = session.abort().await {
    warn!(error = %e, "failed to abort transaction");
  }
}
