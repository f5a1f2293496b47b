//! The suggestion data service.
//!
//! [`SuggestionData`] sits between callers and a
//! [`SuggestionStore`](ballot_core::store::SuggestionStore): reads go through a
//! short-lived [`MemoryCache`], and the vote and create workflows keep the
//! suggestion documents and the users' denormalized lists in step.

mod capability;
mod service;

pub mod cache;
pub mod config;
pub mod retry;

pub use cache::MemoryCache;
pub use config::DataConfig;
pub use retry::RetryPolicy;
pub use service::SuggestionData;

#[cfg(test)]
mod stub;
