//! Batch ingestion: `POST /log` and `POST /api/log`.
//!
//! Both routes run the same reconciliation; they differ only in the response
//! body. A batch is accepted or rejected as a whole: if any entry lacks an
//! integer `fc` or a string `name`, nothing is applied.

use axum::{Json, extract::State};
use bytes::Bytes;
use fcwatch_core::{player::Observation, snapshot::ReconcileReport, store::RosterStore};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::{AppState, error::Error};

/// Request body: `{"players": [{"fc": 123, "name": "..."}, ...]}`.
#[derive(Debug, Deserialize)]
pub struct LogBatch {
  pub players: Vec<Observation>,
}

impl LogBatch {
  pub fn parse(body: &[u8]) -> Result<Self, Error> {
    serde_json::from_slice(body).map_err(|e| Error::BadRequest(format!("Invalid data: {e}")))
  }
}

async fn reconcile<S>(state: &AppState<S>, body: &[u8]) -> Result<ReconcileReport, Error>
where
  S: RosterStore + Clone + 'static,
{
  let batch = LogBatch::parse(body)?;
  let size = batch.players.len();

  let report = state
    .store
    .record_observations(batch.players)
    .await
    .map_err(|e| Error::Store(Box::new(e)))?;

  tracing::info!(
    size,
    inserted = report.inserted,
    renamed = report.renamed,
    unchanged = report.unchanged,
    "reconciled batch"
  );
  Ok(report)
}

/// `POST /log` — plain-text acknowledgement.
pub async fn plain<S>(State(state): State<AppState<S>>, body: Bytes) -> Result<&'static str, Error>
where
  S: RosterStore + Clone + 'static,
{
  reconcile(&state, &body).await?;
  Ok("Logged")
}

/// `POST /api/log` — `{"success": true, ...counts}`.
pub async fn api<S>(State(state): State<AppState<S>>, body: Bytes) -> Result<Json<Value>, Error>
where
  S: RosterStore + Clone + 'static,
{
  let report = reconcile(&state, &body).await?;
  Ok(Json(json!({
    "success":   true,
    "inserted":  report.inserted,
    "renamed":   report.renamed,
    "unchanged": report.unchanged,
  })))
}
