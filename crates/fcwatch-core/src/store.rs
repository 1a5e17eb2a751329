//! The `RosterStore` trait.
//!
//! Implemented by the storage backends (`fcwatch-store-sqlite`,
//! `fcwatch-store-file`). The server depends on this abstraction, not on any
//! concrete backend.

use std::future::Future;

use crate::{
  player::{BlacklistEntry, Fc, Observation, Player},
  snapshot::{MergeReport, ReconcileReport, Snapshot},
};

/// Abstraction over a roster backend.
///
/// Every mutating method is atomic: it either applies completely or not at
/// all, and concurrent calls never interleave their read-modify-write steps.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait RosterStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Reads ─────────────────────────────────────────────────────────────

  /// Load the full state. Players are ordered ascending by FC; the
  /// blacklist and logs are in the order they were first added.
  fn snapshot(
    &self,
  ) -> impl Future<Output = Result<Snapshot, Self::Error>> + Send + '_;

  /// Look up a single player. Returns `None` if the FC has never been seen.
  fn get_player(
    &self,
    fc: Fc,
  ) -> impl Future<Output = Result<Option<Player>, Self::Error>> + Send + '_;

  // ── Writes ────────────────────────────────────────────────────────────

  /// Reconcile a batch of observations: insert unseen FCs, log and apply
  /// renames, skip unchanged names.
  fn record_observations(
    &self,
    batch: Vec<Observation>,
  ) -> impl Future<Output = Result<ReconcileReport, Self::Error>> + Send + '_;

  /// Merge a snapshot exported by another instance.
  /// See [`Snapshot::merge`] for the rules.
  fn merge_snapshot(
    &self,
    incoming: Snapshot,
  ) -> impl Future<Output = Result<MergeReport, Self::Error>> + Send + '_;

  /// Insert a blacklist entry or overwrite the one with the same FC.
  fn upsert_blacklist(
    &self,
    entry: BlacklistEntry,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;
}
