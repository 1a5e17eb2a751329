//! Encoding and decoding helpers between domain types and the plain values
//! stored in SQLite columns.
//!
//! FCs are stored as native integers. Timestamps are stored as RFC 3339
//! strings; the encoding is canonical so that equality on the column matches
//! equality on [`ChangeLogEntry`].

use chrono::{DateTime, Utc};
use fcwatch_core::log::ChangeLogEntry;

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Column values for a `change_log` row, without the surrogate id.
pub struct RawLogEntry {
  pub fc:          i64,
  pub old_name:    String,
  pub new_name:    String,
  pub recorded_at: Option<String>,
}

impl RawLogEntry {
  pub fn from_entry(entry: &ChangeLogEntry) -> Self {
    Self {
      fc:          entry.fc,
      old_name:    entry.old_name.clone(),
      new_name:    entry.new_name.clone(),
      recorded_at: entry.recorded_at.map(encode_dt),
    }
  }

  pub fn into_entry(self) -> Result<ChangeLogEntry> {
    Ok(ChangeLogEntry {
      fc:          self.fc,
      old_name:    self.old_name,
      new_name:    self.new_name,
      recorded_at: self.recorded_at.as_deref().map(decode_dt).transpose()?,
    })
  }
}
