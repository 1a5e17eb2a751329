//! `POST /blacklist?token=…` — upsert a blacklist entry by FC.
//!
//! Accepts the admin page's form submission or a JSON body with the same
//! fields.

use axum::{
  Form, Json,
  extract::{FromRequest, Request, State},
  http::header,
};
use fcwatch_core::{
  player::{BlacklistEntry, Fc},
  store::RosterStore,
};
use serde::Deserialize;

use crate::{AppState, auth::Admin, error::Error};

#[derive(Debug, Deserialize)]
pub struct BlacklistBody {
  pub fc:   Fc,
  pub name: String,
}

impl TryFrom<BlacklistBody> for BlacklistEntry {
  type Error = Error;

  fn try_from(body: BlacklistBody) -> Result<Self, Self::Error> {
    let name = body.name.trim();
    if name.is_empty() {
      return Err(Error::BadRequest("Invalid data: name is empty".into()));
    }
    Ok(BlacklistEntry::new(body.fc, name))
  }
}

pub async fn upsert<S>(
  State(state): State<AppState<S>>,
  _admin: Admin,
  req: Request,
) -> Result<&'static str, Error>
where
  S: RosterStore + Clone + 'static,
{
  let is_json = req
    .headers()
    .get(header::CONTENT_TYPE)
    .and_then(|v| v.to_str().ok())
    .is_some_and(|ct| ct.starts_with("application/json"));

  let body = if is_json {
    let Json(body) = Json::<BlacklistBody>::from_request(req, &state)
      .await
      .map_err(|e| Error::BadRequest(e.body_text()))?;
    body
  } else {
    let Form(body) = Form::<BlacklistBody>::from_request(req, &state)
      .await
      .map_err(|e| Error::BadRequest(e.body_text()))?;
    body
  };

  let entry = BlacklistEntry::try_from(body)?;
  tracing::info!(fc = entry.fc, "blacklist upsert");

  state
    .store
    .upsert_blacklist(entry)
    .await
    .map_err(|e| Error::Store(Box::new(e)))?;

  Ok("Blacklist updated")
}
