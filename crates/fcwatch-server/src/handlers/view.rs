//! HTML pages.

use axum::{extract::State, response::Html};
use fcwatch_core::store::RosterStore;

use crate::{AppState, auth::Admin, error::Error, render};

/// `GET /` — the roster view.
pub async fn index<S>(State(state): State<AppState<S>>) -> Result<Html<String>, Error>
where
  S: RosterStore + Clone + 'static,
{
  let snapshot = state
    .store
    .snapshot()
    .await
    .map_err(|e| Error::Store(Box::new(e)))?;
  Ok(Html(render::index(&snapshot)))
}

/// `GET /admin?token=…` — blacklist and upload forms.
pub async fn admin(admin: Admin) -> Html<String> {
  Html(render::admin(&admin.token))
}
