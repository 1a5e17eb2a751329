//! Player identities and blacklist entries.
//!
//! An FC is the numeric identifier a player keeps across name changes. Players
//! and blacklist entries share the FC space but are independent collections:
//! an FC may be blacklisted before it has ever been observed.

use serde::{Deserialize, Serialize};

/// The numeric identifier uniquely naming a player.
pub type Fc = i64;

// ─── Player ──────────────────────────────────────────────────────────────────

/// A known player and the display name most recently observed for them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
  pub fc:   Fc,
  pub name: String,
}

impl Player {
  pub fn new(fc: Fc, name: impl Into<String>) -> Self {
    Self { fc, name: name.into() }
  }
}

// ─── Observation ─────────────────────────────────────────────────────────────

/// One `(fc, name)` pair pushed by a client.
///
/// Structurally identical to [`Player`], but an observation is an input to
/// reconciliation, not stored state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Observation {
  pub fc:   Fc,
  pub name: String,
}

impl Observation {
  pub fn new(fc: Fc, name: impl Into<String>) -> Self {
    Self { fc, name: name.into() }
  }
}

impl From<Player> for Observation {
  fn from(p: Player) -> Self { Self { fc: p.fc, name: p.name } }
}

// ─── Blacklist ───────────────────────────────────────────────────────────────

/// An administrator-curated blacklist entry.
///
/// `name` is the name the administrator gave at blacklisting time; it is not
/// kept in sync with the player's in-game name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlacklistEntry {
  pub fc:   Fc,
  pub name: String,
}

impl BlacklistEntry {
  pub fn new(fc: Fc, name: impl Into<String>) -> Self {
    Self { fc, name: name.into() }
  }
}

// ─── Reconciliation rule ─────────────────────────────────────────────────────

/// What a single observation does to stored state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
  /// The FC has never been seen; store it. First sightings are not logged.
  Insert,
  /// The stored name already matches.
  Unchanged,
  /// The stored name differs; log the transition and overwrite.
  Rename { old_name: String },
}

/// Classify an incoming name against the stored name for the same FC.
///
/// Both storage backends apply this rule, so it is the single definition of
/// "did the name change".
pub fn decide(stored: Option<&str>, incoming: &str) -> Decision {
  match stored {
    None => Decision::Insert,
    Some(name) if name == incoming => Decision::Unchanged,
    Some(name) => Decision::Rename { old_name: name.to_owned() },
  }
}
