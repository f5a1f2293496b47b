//! Application configuration, deserialised from `ballot.toml` and `BALLOT_*`
//! environment variables.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use ballot_data::DataConfig;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
  #[serde(default = "default_store_path")]
  pub store_path:   PathBuf,
  /// Set to `false` to treat the store as a standalone deployment without
  /// multi-document transactions.
  #[serde(default = "default_transactions")]
  pub transactions: bool,
  #[serde(default)]
  pub data:         DataConfig,
}

fn default_store_path() -> PathBuf { PathBuf::from("~/.local/share/ballot/ballot.db") }

fn default_transactions() -> bool { true }

impl AppConfig {
  /// Layer the optional config file under the environment.
  ///
  /// Nested keys use a double underscore, e.g. `BALLOT_DATA__CACHE_TTL_SECS`.
  pub fn load(path: &Path) -> anyhow::Result<Self> {
    let settings = config::Config::builder()
      .add_source(config::File::from(path.to_path_buf()).required(false))
      .add_source(
        config::Environment::with_prefix("BALLOT")
          .prefix_separator("_")
          .separator("__"),
      )
      .build()
      .context("failed to read config file")?;

    settings
      .try_deserialize()
      .context("failed to deserialise AppConfig")
  }

  /// `store_path` with a leading `~` expanded to the user's home directory.
  pub fn resolved_store_path(&self) -> PathBuf { expand_tilde(&self.store_path) }
}

fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
