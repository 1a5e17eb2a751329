//! Admin gate: a shared token passed as the `token` query parameter.
//!
//! Only an argon2 PHC hash of the token is configured; the comparison happens
//! inside `argon2`'s verifier, which compares digests in constant time.

use argon2::{Argon2, PasswordHash, PasswordVerifier};
use axum::{
  extract::{FromRequestParts, Query},
  http::request::Parts,
};
use fcwatch_core::store::RosterStore;
use serde::Deserialize;

use crate::{AppState, error::Error};

/// The admin credential for this server instance.
#[derive(Clone, Default)]
pub struct AdminConfig {
  /// PHC string produced by argon2, e.g. `$argon2id$v=19$…`. When `None`,
  /// every admin request is rejected.
  pub token_hash: Option<String>,
}

/// Present in a handler's arguments means the request carried a valid admin
/// token. Holds the token so pages can link back to gated endpoints.
pub struct Admin {
  pub token: String,
}

#[derive(Deserialize)]
struct TokenParam {
  token: Option<String>,
}

/// Check `token` against the configured hash.
pub fn verify_token(token: &str, config: &AdminConfig) -> Result<(), Error> {
  let hash = config.token_hash.as_deref().ok_or(Error::Unauthorized)?;
  let parsed = PasswordHash::new(hash).map_err(|_| Error::Unauthorized)?;

  Argon2::default()
    .verify_password(token.as_bytes(), &parsed)
    .map_err(|_| Error::Unauthorized)
}

impl<S> FromRequestParts<AppState<S>> for Admin
where
  S: RosterStore + Clone + 'static,
{
  type Rejection = Error;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S>,
  ) -> Result<Self, Self::Rejection> {
    let token = Query::<TokenParam>::try_from_uri(&parts.uri)
      .ok()
      .and_then(|Query(p)| p.token);

    let verified = token
      .ok_or(Error::Unauthorized)
      .and_then(|t| verify_token(&t, &state.admin).map(|()| t));

    match verified {
      Ok(token) => Ok(Admin { token }),
      Err(e) => {
        tracing::warn!(path = %parts.uri.path(), "rejected admin request");
        Err(e)
      }
    }
  }
}
