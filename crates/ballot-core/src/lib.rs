//! Core types and trait definitions for the Ballot suggestion board.
//!
//! This crate is deliberately free of runtime and database dependencies.
//! The data service and every storage backend depend on it.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod cache;
pub mod error;
pub mod store;
pub mod suggestion;
pub mod user;

pub use error::{BoxError, Error, Result};

#[cfg(test)]
mod tests;
