//! SQLite backend for the fcwatch roster.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime. Every mutating operation runs as one
//! immediate transaction inside a single `call`, so it cannot interleave with
//! another request.

mod encode;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;
