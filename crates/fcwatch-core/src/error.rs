//! Error types for `fcwatch-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("unrecognised change-log line: {0:?}")]
  InvalidLogLine(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
