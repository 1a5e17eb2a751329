//! Snapshot export and import between instances.

use axum::{
  Json,
  extract::{Multipart, State},
  http::header,
  response::IntoResponse,
};
use fcwatch_core::{snapshot::Snapshot, store::RosterStore};

use crate::{AppState, auth::Admin, error::Error};

/// `GET /download` — the full snapshot as a JSON attachment.
pub async fn download<S>(State(state): State<AppState<S>>) -> Result<impl IntoResponse, Error>
where
  S: RosterStore + Clone + 'static,
{
  let snapshot = state
    .store
    .snapshot()
    .await
    .map_err(|e| Error::Store(Box::new(e)))?;

  Ok((
    [(header::CONTENT_DISPOSITION, "attachment; filename=\"players.json\"")],
    Json(snapshot),
  ))
}

/// `POST /upload?token=…` — merge an uploaded snapshot.
///
/// The first multipart field is the snapshot document. It is read into memory,
/// so nothing is left on disk whatever the outcome.
pub async fn upload<S>(
  State(state): State<AppState<S>>,
  _admin: Admin,
  mut multipart: Multipart,
) -> Result<&'static str, Error>
where
  S: RosterStore + Clone + 'static,
{
  let field = multipart
    .next_field()
    .await
    .map_err(|e| Error::BadRequest(e.body_text()))?
    .ok_or_else(|| Error::BadRequest("No file uploaded".into()))?;

  let bytes = field
    .bytes()
    .await
    .map_err(|e| Error::BadRequest(e.body_text()))?;

  let incoming: Snapshot = serde_json::from_slice(&bytes)
    .map_err(|e| Error::BadRequest(format!("Invalid snapshot: {e}")))?;

  let report = state
    .store
    .merge_snapshot(incoming)
    .await
    .map_err(|e| Error::Store(Box::new(e)))?;

  tracing::info!(
    inserted = report.players.inserted,
    renamed = report.players.renamed,
    logs_added = report.logs_added,
    blacklist_replaced = report.blacklist_replaced,
    "merged uploaded snapshot"
  );
  Ok("Uploaded and merged")
}
