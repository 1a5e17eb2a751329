//! Single-document JSON backend for the fcwatch roster.
//!
//! The whole roster lives in one file shaped like the `/download` export.
//! Every mutation reads the document, applies the in-memory rule from
//! `fcwatch-core`, and atomically replaces the file, all while holding one
//! async mutex.

mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::FileStore;
