//! Change-log entries — the append-only history of name transitions.

use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, player::Fc};

/// Separator between the old and new name in the line form.
const ARROW: &str = " → ";

/// An immutable record that `fc` changed its name from `old_name` to
/// `new_name`.
///
/// Equality covers every field, including the timestamp; log deduplication
/// during a merge relies on that.
///
/// Deserialises from either the structured object this crate writes or the
/// legacy line form `"{fc}: {old} → {new}"` found in older snapshot
/// documents. Serialisation always produces the structured object.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawLogEntry")]
pub struct ChangeLogEntry {
  pub fc:          Fc,
  pub old_name:    String,
  pub new_name:    String,
  /// Set by the store for every entry it generates; absent on entries
  /// imported from legacy line-form documents.
  pub recorded_at: Option<DateTime<Utc>>,
}

impl ChangeLogEntry {
  pub fn new(
    fc: Fc,
    old_name: impl Into<String>,
    new_name: impl Into<String>,
    recorded_at: DateTime<Utc>,
  ) -> Self {
    Self {
      fc,
      old_name: old_name.into(),
      new_name: new_name.into(),
      recorded_at: Some(recorded_at),
    }
  }
}

impl fmt::Display for ChangeLogEntry {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}: {}{ARROW}{}", self.fc, self.old_name, self.new_name)
  }
}

impl FromStr for ChangeLogEntry {
  type Err = Error;

  /// Parse the line form. The first `": "` ends the FC and the first `" → "`
  /// after it separates the names.
  fn from_str(line: &str) -> Result<Self, Self::Err> {
    let invalid = || Error::InvalidLogLine(line.to_owned());

    let (fc, names) = line.split_once(": ").ok_or_else(invalid)?;
    let fc = fc.trim().parse::<Fc>().map_err(|_| invalid())?;
    let (old_name, new_name) = names.split_once(ARROW).ok_or_else(invalid)?;

    Ok(Self {
      fc,
      old_name: old_name.to_owned(),
      new_name: new_name.to_owned(),
      recorded_at: None,
    })
  }
}

// ─── Wire form ───────────────────────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(untagged)]
enum RawLogEntry {
  Line(String),
  Entry {
    fc:          Fc,
    old_name:    String,
    new_name:    String,
    #[serde(default)]
    recorded_at: Option<DateTime<Utc>>,
  },
}

impl TryFrom<RawLogEntry> for ChangeLogEntry {
  type Error = Error;

  fn try_from(raw: RawLogEntry) -> Result<Self, Self::Error> {
    match raw {
      RawLogEntry::Line(line) => line.parse(),
      RawLogEntry::Entry { fc, old_name, new_name, recorded_at } => {
        Ok(Self { fc, old_name, new_name, recorded_at })
      }
    }
  }
}
