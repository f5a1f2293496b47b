//! `ballot`: command-line front end for the suggestion board.
//!
//! Reads `ballot.toml` (or the path specified with `--config`), opens the
//! SQLite store and runs one operation against the suggestion data service.
//! Results are printed as JSON.

mod config;

use std::{path::PathBuf, sync::Arc};

use anyhow::Context as _;
use ballot_core::{
  store::UserDirectory,
  suggestion::{NewSuggestion, Suggestion},
  user::UserProfile,
};
use ballot_data::{MemoryCache, SuggestionData};
use ballot_store_sqlite::SqliteStore;
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use crate::config::AppConfig;

type Service = SuggestionData<SqliteStore, SqliteStore>;

#[derive(Parser)]
#[command(author, version, about = "Ballot suggestion board")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "ballot.toml")]
  config: PathBuf,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
enum Command {
  /// Register a user profile.
  AddUser {
    display_name: String,
    /// Identifier from the external identity provider.
    #[arg(long)]
    object_id:    Option<String>,
    #[arg(long)]
    email:        Option<String>,
  },
  /// Submit a new suggestion for approval.
  Create {
    #[arg(long)]
    author:      Uuid,
    suggestion:  String,
    #[arg(long, default_value = "")]
    description: String,
    #[arg(long)]
    category:    Option<String>,
  },
  /// All non-archived suggestions.
  List,
  /// Suggestions approved for release.
  Approved,
  /// Suggestions neither approved nor rejected.
  Pending,
  /// One suggestion by id.
  Show { id: Uuid },
  /// Suggestions authored by a user.
  Mine { user: Uuid },
  /// Cast or retract a user's vote.
  Vote { suggestion: Uuid, user: Uuid },
  Approve { id: Uuid },
  Reject { id: Uuid },
  Archive { id: Uuid },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Initialise tracing. Logs go to stderr so stdout stays machine-readable.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .with_writer(std::io::stderr)
    .init();

  let cli = Cli::parse();
  let cfg = AppConfig::load(&cli.config)?;

  let store_path = cfg.resolved_store_path();
  if let Some(parent) = store_path.parent() {
    std::fs::create_dir_all(parent)
      .with_context(|| format!("failed to create {parent:?}"))?;
  }

  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?
    .with_transactions(cfg.transactions);
  let store = Arc::new(store);

  let service = SuggestionData::new(
    Arc::clone(&store),
    Arc::clone(&store),
    Arc::new(MemoryCache::new()),
    cfg.data.clone(),
  );

  run(cli.command, &store, &service).await
}

async fn run(command: Command, store: &SqliteStore, service: &Service) -> anyhow::Result<()> {
  match command {
    Command::AddUser {
      display_name,
      object_id,
      email,
    } => {
      let mut profile = UserProfile::new(
        object_id.unwrap_or_else(|| Uuid::new_v4().to_string()),
        display_name,
      );
      profile.email_address = email.unwrap_or_default();
      store
        .insert_user(&profile)
        .await
        .context("failed to add user")?;
      print_json(&profile)
    }
    Command::Create {
      author,
      suggestion,
      description,
      category,
    } => {
      let profile = store
        .get_user(author)
        .await?
        .with_context(|| format!("no user with id {author}"))?;
      let mut input = NewSuggestion::new(profile.basic(), suggestion);
      input.description = description;
      input.category = category;
      print_json(&service.create_suggestion(input).await?)
    }
    Command::List => print_json(&service.get_all_suggestions().await?),
    Command::Approved => print_json(&service.get_all_approved_suggestions().await?),
    Command::Pending => {
      print_json(&service.get_all_suggestions_waiting_for_approval().await?)
    }
    Command::Show { id } => {
      let found = service
        .get_suggestion(id)
        .await?
        .with_context(|| format!("no suggestion with id {id}"))?;
      print_json(&found)
    }
    Command::Mine { user } => print_json(&service.get_users_suggestions(user).await?),
    Command::Vote { suggestion, user } => {
      let outcome = service.upvote_suggestion(suggestion, user).await?;
      print_json(&serde_json::json!({ "suggestion_id": suggestion, "outcome": outcome }))
    }
    Command::Approve { id } => {
      moderate(service, id, |s| {
        s.approved_for_release = true;
        s.rejected = false;
      })
      .await
    }
    Command::Reject { id } => {
      moderate(service, id, |s| {
        s.rejected = true;
        s.approved_for_release = false;
      })
      .await
    }
    Command::Archive { id } => moderate(service, id, |s| s.archived = true).await,
  }
}

/// Apply a moderator edit through the plain whole-document update.
async fn moderate(
  service: &Service,
  id: Uuid,
  edit: impl FnOnce(&mut Suggestion),
) -> anyhow::Result<()> {
  let mut suggestion = service
    .get_suggestion(id)
    .await?
    .with_context(|| format!("no suggestion with id {id}"))?;
  edit(&mut suggestion);
  service.update_suggestion(&suggestion).await?;
  print_json(&suggestion)
}

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
  println!("{}", serde_json::to_string_pretty(value)?);
  Ok(())
}
