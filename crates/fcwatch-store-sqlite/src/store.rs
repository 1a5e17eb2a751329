//! [`SqliteStore`] — the SQLite implementation of [`RosterStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::{Connection, OptionalExtension as _, TransactionBehavior};

use fcwatch_core::{
  player::{BlacklistEntry, Decision, Fc, Observation, Player, decide},
  snapshot::{MergeReport, ReconcileReport, Snapshot},
  store::RosterStore,
};

use crate::{
  encode::{RawLogEntry, encode_dt},
  schema::SCHEMA,
  Result,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A roster backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── Statement helpers ───────────────────────────────────────────────────────
//
// These run on the connection thread, inside a transaction opened by the
// caller.

/// Apply the reconciliation rule to one observation.
fn apply_observation(
  conn: &Connection,
  obs: &Observation,
  now: &str,
) -> rusqlite::Result<Decision> {
  let stored: Option<String> = conn
    .query_row(
      "SELECT name FROM players WHERE fc = ?1",
      rusqlite::params![obs.fc],
      |r| r.get(0),
    )
    .optional()?;

  let decision = decide(stored.as_deref(), &obs.name);

  match &decision {
    Decision::Insert => {
      conn.execute(
        "INSERT INTO players (fc, name) VALUES (?1, ?2)",
        rusqlite::params![obs.fc, obs.name],
      )?;
    }
    Decision::Rename { old_name } => {
      conn.execute(
        "INSERT INTO change_log (fc, old_name, new_name, recorded_at)
         VALUES (?1, ?2, ?3, ?4)",
        rusqlite::params![obs.fc, old_name, obs.name, now],
      )?;
      conn.execute(
        "UPDATE players SET name = ?2 WHERE fc = ?1",
        rusqlite::params![obs.fc, obs.name],
      )?;
    }
    Decision::Unchanged => {}
  }

  Ok(decision)
}

fn append_log(conn: &Connection, raw: &RawLogEntry) -> rusqlite::Result<()> {
  conn.execute(
    "INSERT INTO change_log (fc, old_name, new_name, recorded_at)
     VALUES (?1, ?2, ?3, ?4)",
    rusqlite::params![raw.fc, raw.old_name, raw.new_name, raw.recorded_at],
  )?;
  Ok(())
}

/// Number of distinct log entries. NULL timestamps compare equal.
fn count_distinct_logs(conn: &Connection) -> rusqlite::Result<usize> {
  let n: i64 = conn.query_row(
    "SELECT COUNT(*) FROM (
       SELECT DISTINCT fc, old_name, new_name, recorded_at FROM change_log
     )",
    [],
    |r| r.get(0),
  )?;
  Ok(n as usize)
}

/// Delete every log row that repeats an earlier one exactly, keeping the
/// first. Returns the number of rows left.
fn collapse_duplicate_logs(conn: &Connection) -> rusqlite::Result<usize> {
  conn.execute(
    "DELETE FROM change_log WHERE id NOT IN (
       SELECT MIN(id) FROM change_log
       GROUP BY fc, old_name, new_name, recorded_at
     )",
    [],
  )?;
  let n: i64 = conn.query_row("SELECT COUNT(*) FROM change_log", [], |r| r.get(0))?;
  Ok(n as usize)
}

/// Insert a blacklist row, or rename an existing FC in place.
fn upsert_blacklist_row(conn: &Connection, entry: &BlacklistEntry) -> rusqlite::Result<()> {
  conn.execute(
    "INSERT INTO blacklist (fc, name) VALUES (?1, ?2)
     ON CONFLICT (fc) DO UPDATE SET name = excluded.name",
    rusqlite::params![entry.fc, entry.name],
  )?;
  Ok(())
}

fn read_players(conn: &Connection) -> rusqlite::Result<Vec<Player>> {
  let mut stmt = conn.prepare("SELECT fc, name FROM players ORDER BY fc")?;
  stmt
    .query_map([], |row| Ok(Player { fc: row.get(0)?, name: row.get(1)? }))?
    .collect()
}

fn read_blacklist(conn: &Connection) -> rusqlite::Result<Vec<BlacklistEntry>> {
  let mut stmt = conn.prepare("SELECT fc, name FROM blacklist ORDER BY rowid")?;
  stmt
    .query_map([], |row| Ok(BlacklistEntry { fc: row.get(0)?, name: row.get(1)? }))?
    .collect()
}

fn read_logs(conn: &Connection) -> rusqlite::Result<Vec<RawLogEntry>> {
  let mut stmt = conn.prepare(
    "SELECT fc, old_name, new_name, recorded_at FROM change_log ORDER BY id",
  )?;
  stmt
    .query_map([], |row| {
      Ok(RawLogEntry {
        fc:          row.get(0)?,
        old_name:    row.get(1)?,
        new_name:    row.get(2)?,
        recorded_at: row.get(3)?,
      })
    })?
    .collect()
}

// ─── RosterStore impl ────────────────────────────────────────────────────────

impl RosterStore for SqliteStore {
  type Error = crate::Error;

  // ── Reads ─────────────────────────────────────────────────────────────────

  async fn snapshot(&self) -> Result<Snapshot> {
    let (players, blacklist, raw_logs) = self
      .conn
      .call(|conn| {
        let tx = conn.transaction()?;
        let players = read_players(&tx)?;
        let blacklist = read_blacklist(&tx)?;
        let logs = read_logs(&tx)?;
        tx.commit()?;
        Ok((players, blacklist, logs))
      })
      .await?;

    let logs = raw_logs
      .into_iter()
      .map(RawLogEntry::into_entry)
      .collect::<Result<_>>()?;

    Ok(Snapshot { players, blacklist, logs })
  }

  async fn get_player(&self, fc: Fc) -> Result<Option<Player>> {
    let player = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            "SELECT fc, name FROM players WHERE fc = ?1",
            rusqlite::params![fc],
            |row| Ok(Player { fc: row.get(0)?, name: row.get(1)? }),
          )
          .optional()?)
      })
      .await?;
    Ok(player)
  }

  // ── Writes ────────────────────────────────────────────────────────────────

  async fn record_observations(&self, batch: Vec<Observation>) -> Result<ReconcileReport> {
    let now = encode_dt(Utc::now());

    let report = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let mut report = ReconcileReport::default();
        for obs in &batch {
          let decision = apply_observation(&tx, obs, &now)?;
          report.record(&decision);
        }
        tx.commit()?;
        Ok(report)
      })
      .await?;

    Ok(report)
  }

  async fn merge_snapshot(&self, incoming: Snapshot) -> Result<MergeReport> {
    let now = encode_dt(Utc::now());
    let raw_logs: Vec<RawLogEntry> =
      incoming.logs.iter().map(RawLogEntry::from_entry).collect();
    let Snapshot { players, blacklist, .. } = incoming;

    let report = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let distinct_before = count_distinct_logs(&tx)?;

        let mut report = MergeReport::default();
        for player in players {
          let decision = apply_observation(&tx, &Observation::from(player), &now)?;
          report.players.record(&decision);
        }

        for raw in &raw_logs {
          append_log(&tx, raw)?;
        }
        let logs_after = collapse_duplicate_logs(&tx)?;
        report.logs_added = logs_after.saturating_sub(distinct_before);

        if !blacklist.is_empty() {
          tx.execute("DELETE FROM blacklist", [])?;
          // Later duplicates of the same FC win; the first keeps its place.
          for entry in &blacklist {
            upsert_blacklist_row(&tx, entry)?;
          }
          report.blacklist_replaced = true;
        }

        tx.commit()?;
        Ok(report)
      })
      .await?;

    Ok(report)
  }

  async fn upsert_blacklist(&self, entry: BlacklistEntry) -> Result<()> {
    self
      .conn
      .call(move |conn| {
        upsert_blacklist_row(conn, &entry)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}
