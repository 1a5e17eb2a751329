//! SQL schema for the fcwatch SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

CREATE TABLE IF NOT EXISTS players (
    fc    INTEGER PRIMARY KEY,
    name  TEXT NOT NULL
);

-- Independent of players: an FC may be blacklisted before it is observed.
-- Read back in rowid order, which is insertion order.
CREATE TABLE IF NOT EXISTS blacklist (
    fc    INTEGER NOT NULL UNIQUE,
    name  TEXT NOT NULL
);

-- Rows are never updated. A merge deletes exact repeats, keeping the lowest id.
-- fc is not a foreign key; orphaned entries are allowed.
CREATE TABLE IF NOT EXISTS change_log (
    id           INTEGER PRIMARY KEY AUTOINCREMENT,
    fc           INTEGER NOT NULL,
    old_name     TEXT NOT NULL,
    new_name     TEXT NOT NULL,
    recorded_at  TEXT              -- RFC 3339 UTC; NULL for legacy imports
);

CREATE INDEX IF NOT EXISTS change_log_fc_idx ON change_log(fc);

PRAGMA user_version = 1;
";
