//! Core types and trait definitions for the fcwatch player roster.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! The storage backends and the server depend on it.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod error;
pub mod log;
pub mod player;
pub mod snapshot;
pub mod store;

pub use error::{Error, Result};
