//! The full logical state of a roster and the in-memory reconcile/merge rules.
//!
//! Whole-document backends load a [`Snapshot`], apply [`Snapshot::reconcile`]
//! or [`Snapshot::merge`], and write it back. Relational backends apply the
//! same [`decide`] rule row by row.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
  log::ChangeLogEntry,
  player::{BlacklistEntry, Decision, Fc, Observation, Player, decide},
};

// ─── Reports ─────────────────────────────────────────────────────────────────

/// Counts of what a reconciliation did, one bucket per [`Decision`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReconcileReport {
  pub inserted:  usize,
  pub renamed:   usize,
  pub unchanged: usize,
}

impl ReconcileReport {
  pub fn record(&mut self, decision: &Decision) {
    match decision {
      Decision::Insert => self.inserted += 1,
      Decision::Unchanged => self.unchanged += 1,
      Decision::Rename { .. } => self.renamed += 1,
    }
  }
}

/// What a merge did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MergeReport {
  pub players:            ReconcileReport,
  /// Log entries that were not already present, including those generated by
  /// player renames during this merge.
  pub logs_added:         usize,
  pub blacklist_replaced: bool,
}

// ─── Snapshot ────────────────────────────────────────────────────────────────

/// Players, blacklist and change log at one point in time.
///
/// This is also the document exchanged by `/download` and `/upload`;
/// `blacklist` and `logs` may be omitted from an uploaded document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
  pub players:   Vec<Player>,
  #[serde(default)]
  pub blacklist: Vec<BlacklistEntry>,
  #[serde(default)]
  pub logs:      Vec<ChangeLogEntry>,
}

impl Snapshot {
  /// Apply a batch of observations in order. Later observations for the same
  /// FC see the effect of earlier ones.
  pub fn reconcile<I>(&mut self, observations: I, now: DateTime<Utc>) -> ReconcileReport
  where
    I: IntoIterator<Item = Observation>,
  {
    let mut index = self.player_index();
    let mut report = ReconcileReport::default();

    for obs in observations {
      let slot = index.get(&obs.fc).copied();
      let decision = decide(slot.map(|i| self.players[i].name.as_str()), &obs.name);
      report.record(&decision);

      match (decision, slot) {
        (Decision::Insert, _) => {
          index.insert(obs.fc, self.players.len());
          self.players.push(Player::new(obs.fc, obs.name));
        }
        (Decision::Rename { old_name }, Some(i)) => {
          self.logs.push(ChangeLogEntry::new(obs.fc, old_name, obs.name.clone(), now));
          self.players[i].name = obs.name;
        }
        _ => {}
      }
    }

    self.sort_players();
    report
  }

  /// Merge a snapshot exported by another instance into this one.
  ///
  /// Players merge by FC with a log entry per divergence; logs become the
  /// exact-equality union (first occurrence kept); the blacklist is replaced
  /// only when the incoming one is non-empty.
  pub fn merge(&mut self, incoming: Snapshot, now: DateTime<Utc>) -> MergeReport {
    let logs_before: HashSet<ChangeLogEntry> = self.logs.iter().cloned().collect();

    let players = self.reconcile(incoming.players.into_iter().map(Observation::from), now);

    self.logs.extend(incoming.logs);
    let mut seen = HashSet::with_capacity(self.logs.len());
    self.logs.retain(|entry| seen.insert(entry.clone()));
    let logs_added = seen.difference(&logs_before).count();

    let blacklist_replaced = !incoming.blacklist.is_empty();
    if blacklist_replaced {
      self.blacklist = dedup_blacklist(incoming.blacklist);
    }

    MergeReport { players, logs_added, blacklist_replaced }
  }

  /// Insert a blacklist entry, or replace the one with the same FC in place.
  pub fn upsert_blacklist(&mut self, entry: BlacklistEntry) {
    match self.blacklist.iter_mut().find(|bl| bl.fc == entry.fc) {
      Some(existing) => *existing = entry,
      None => self.blacklist.push(entry),
    }
  }

  pub fn player(&self, fc: Fc) -> Option<&Player> {
    self.players.iter().find(|p| p.fc == fc)
  }

  pub fn is_blacklisted(&self, fc: Fc) -> bool {
    self.blacklist.iter().any(|bl| bl.fc == fc)
  }

  /// Order players ascending by FC.
  pub fn sort_players(&mut self) {
    self.players.sort_by_key(|p| p.fc);
  }

  fn player_index(&self) -> HashMap<Fc, usize> {
    self.players.iter().enumerate().map(|(i, p)| (p.fc, i)).collect()
  }
}

/// Collapse duplicate FCs, keeping the position of the first and the value of
/// the last.
fn dedup_blacklist(entries: Vec<BlacklistEntry>) -> Vec<BlacklistEntry> {
  let mut out: Vec<BlacklistEntry> = Vec::with_capacity(entries.len());
  for entry in entries {
    match out.iter_mut().find(|bl| bl.fc == entry.fc) {
      Some(existing) => *existing = entry,
      None => out.push(entry),
    }
  }
  out
}
