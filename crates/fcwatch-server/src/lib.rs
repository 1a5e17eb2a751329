//! HTTP layer for fcwatch.
//!
//! Exposes an axum [`Router`] backed by any [`RosterStore`]: batch ingestion,
//! the HTML roster view, the admin-gated blacklist, and snapshot
//! export/import.

pub mod auth;
pub mod error;
pub mod handlers;
pub mod render;

pub use error::Error;

use std::{path::PathBuf, sync::Arc};

use axum::{
  Router,
  extract::DefaultBodyLimit,
  routing::{get, post},
};
use fcwatch_core::store::RosterStore;
use serde::Deserialize;
use tower_http::trace::TraceLayer;

use auth::AdminConfig;
use handlers::{blacklist, log, transfer, view};

/// Upper bound on any request body, uploads included.
pub const MAX_BODY_BYTES: usize = 8 * 1024 * 1024;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Which [`RosterStore`] implementation backs the server.
#[derive(Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
  Sqlite,
  File,
}

/// Runtime server configuration, deserialised from `config.toml` and the
/// environment.
#[derive(Deserialize, Clone)]
pub struct ServerConfig {
  pub host:             String,
  pub port:             u16,
  pub backend:          Backend,
  /// SQLite database file or JSON document, depending on `backend`.
  pub store_path:       PathBuf,
  /// argon2 PHC hash of the admin token; admin routes are closed without it.
  pub admin_token_hash: Option<String>,
}

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
#[derive(Clone)]
pub struct AppState<S: RosterStore> {
  pub store: Arc<S>,
  pub admin: Arc<AdminConfig>,
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the axum [`Router`] for the server.
pub fn router<S>(state: AppState<S>) -> Router
where
  S: RosterStore + Clone + 'static,
{
  Router::new()
    .route("/",          get(view::index::<S>))
    .route("/admin",     get(view::admin))
    .route("/log",       post(log::plain::<S>))
    .route("/api/log",   post(log::api::<S>))
    .route("/blacklist", post(blacklist::upsert::<S>))
    .route("/download",  get(transfer::download::<S>))
    .route("/upload",    post(transfer::upload::<S>))
    .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}

// ─── Integration tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  use argon2::{Argon2, PasswordHasher, password_hash::SaltString};
  use axum::{
    body::Body,
    http::{Request, StatusCode, header},
  };
  use fcwatch_core::{
    player::{BlacklistEntry, Player},
    snapshot::Snapshot,
  };
  use fcwatch_store_file::FileStore;
  use fcwatch_store_sqlite::SqliteStore;
  use rand_core::OsRng;
  use tempfile::TempDir;
  use tower::ServiceExt as _;

  const TOKEN: &str = "s3cret";

  fn admin_config() -> Arc<AdminConfig> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
      .hash_password(TOKEN.as_bytes(), &salt)
      .unwrap()
      .to_string();
    Arc::new(AdminConfig { token_hash: Some(hash) })
  }

  async fn make_state() -> AppState<SqliteStore> {
    let store = SqliteStore::open_in_memory().await.unwrap();
    AppState { store: Arc::new(store), admin: admin_config() }
  }

  async fn make_file_state(dir: &TempDir, name: &str) -> AppState<FileStore> {
    let store = FileStore::open(dir.path().join(name)).await.unwrap();
    AppState { store: Arc::new(store), admin: admin_config() }
  }

  async fn send<S>(
    state:   AppState<S>,
    method:  &str,
    uri:     &str,
    headers: Vec<(header::HeaderName, &str)>,
    body:    impl Into<Body>,
  ) -> axum::response::Response
  where
    S: RosterStore + Clone + 'static,
  {
    let mut builder = Request::builder().method(method).uri(uri);
    for (k, v) in headers {
      builder = builder.header(k, v);
    }
    let req = builder.body(body.into()).unwrap();
    router(state).oneshot(req).await.unwrap()
  }

  async fn post_json<S>(state: AppState<S>, uri: &str, json: &str) -> axum::response::Response
  where
    S: RosterStore + Clone + 'static,
  {
    send(state, "POST", uri, vec![(header::CONTENT_TYPE, "application/json")], json.to_string()).await
  }

  async fn body_text(resp: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
  }

  fn multipart(boundary: &str, content: &str) -> String {
    format!(
      "--{boundary}\r\n\
       Content-Disposition: form-data; name=\"logFile\"; filename=\"players.json\"\r\n\
       Content-Type: application/json\r\n\
       \r\n\
       {content}\r\n\
       --{boundary}--\r\n"
    )
  }

  // ── Ingestion ───────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn log_acknowledges_and_stores() {
    let state = make_state().await;
    let resp  = post_json(
      state.clone(),
      "/log",
      r#"{"players":[{"fc":200,"name":"Bob"},{"fc":100,"name":"Alice"}]}"#,
    ).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_text(resp).await, "Logged");

    let snap = state.store.snapshot().await.unwrap();
    assert_eq!(snap.players, vec![Player::new(100, "Alice"), Player::new(200, "Bob")]);
  }

  #[tokio::test]
  async fn api_log_reports_counts() {
    let state = make_state().await;
    post_json(state.clone(), "/api/log", r#"{"players":[{"fc":100,"name":"Alice"}]}"#).await;

    let resp = post_json(
      state.clone(),
      "/api/log",
      r#"{"players":[{"fc":100,"name":"Alicia"},{"fc":200,"name":"Bob"}]}"#,
    ).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let json: serde_json::Value = serde_json::from_str(&body_text(resp).await).unwrap();
    assert_eq!(json["success"], true);
    assert_eq!(json["inserted"], 1);
    assert_eq!(json["renamed"], 1);

    let snap = state.store.snapshot().await.unwrap();
    assert_eq!(snap.logs.len(), 1);
    assert_eq!(snap.logs[0].to_string(), "100: Alice → Alicia");
  }

  #[tokio::test]
  async fn malformed_batch_is_rejected_whole() {
    let state = make_state().await;
    for body in [
      r#"{"players": "nope"}"#,
      r#"{"players":[{"fc":1,"name":"A"},{"fc":2}]}"#,
      r#"not json"#,
    ] {
      let resp = post_json(state.clone(), "/log", body).await;
      assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "body {body}");
    }
    assert!(state.store.snapshot().await.unwrap().players.is_empty());
  }

  // ── View ────────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn index_renders_html() {
    let state = make_state().await;
    post_json(state.clone(), "/log", r#"{"players":[{"fc":100,"name":"Alice"}]}"#).await;
    state.store.upsert_blacklist(BlacklistEntry::new(999, "ghost")).await.unwrap();

    let resp = send(state, "GET", "/", vec![], Body::empty()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let ct = resp.headers().get(header::CONTENT_TYPE).unwrap().to_str().unwrap().to_string();
    assert!(ct.starts_with("text/html"), "Content-Type: {ct}");

    let html = body_text(resp).await;
    assert!(html.contains("<li>100: Alice</li>"), "{html}");
    assert!(html.contains("999 (ghost): Unknown"), "{html}");
  }

  // ── Admin gate ──────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn blacklist_with_token_upserts_from_form() {
    let state = make_state().await;
    let resp  = send(
      state.clone(),
      "POST",
      &format!("/blacklist?token={TOKEN}"),
      vec![(header::CONTENT_TYPE, "application/x-www-form-urlencoded")],
      "fc=100&name=Alice",
    ).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = post_json(
      state.clone(),
      &format!("/blacklist?token={TOKEN}"),
      r#"{"fc":100,"name":"Alice (again)"}"#,
    ).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let snap = state.store.snapshot().await.unwrap();
    assert_eq!(snap.blacklist, vec![BlacklistEntry::new(100, "Alice (again)")]);
  }

  #[tokio::test]
  async fn blacklist_with_wrong_or_missing_token_is_forbidden() {
    let state = make_state().await;
    for uri in ["/blacklist", "/blacklist?token=guess", "/blacklist?token="] {
      let resp = send(
        state.clone(),
        "POST",
        uri,
        vec![(header::CONTENT_TYPE, "application/x-www-form-urlencoded")],
        "fc=100&name=Alice",
      ).await;
      assert_eq!(resp.status(), StatusCode::FORBIDDEN, "uri {uri}");
    }
    assert!(state.store.snapshot().await.unwrap().blacklist.is_empty());
  }

  #[tokio::test]
  async fn blacklist_rejects_invalid_fields() {
    let state = make_state().await;
    for body in ["fc=abc&name=Alice", "fc=100&name=%20%20", "name=Alice"] {
      let resp = send(
        state.clone(),
        "POST",
        &format!("/blacklist?token={TOKEN}"),
        vec![(header::CONTENT_TYPE, "application/x-www-form-urlencoded")],
        body,
      ).await;
      assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "body {body}");
    }
    assert!(state.store.snapshot().await.unwrap().blacklist.is_empty());
  }

  #[tokio::test]
  async fn admin_page_is_gated() {
    let state = make_state().await;
    let resp  = send(state.clone(), "GET", "/admin", vec![], Body::empty()).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let resp = send(state, "GET", &format!("/admin?token={TOKEN}"), vec![], Body::empty()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let html = body_text(resp).await;
    assert!(html.contains(&format!("/blacklist?token={TOKEN}")), "{html}");
  }

  #[tokio::test]
  async fn unconfigured_admin_rejects_all_tokens() {
    let mut state = make_state().await;
    state.admin = Arc::new(AdminConfig::default());
    let resp = send(state, "GET", &format!("/admin?token={TOKEN}"), vec![], Body::empty()).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
  }

  // ── Transfer ────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn download_returns_snapshot_attachment() {
    let state = make_state().await;
    post_json(state.clone(), "/log", r#"{"players":[{"fc":1,"name":"A"}]}"#).await;

    let resp = send(state, "GET", "/download", vec![], Body::empty()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let cd = resp.headers().get(header::CONTENT_DISPOSITION).unwrap().to_str().unwrap().to_string();
    assert!(cd.contains("players.json"), "{cd}");

    let json: serde_json::Value = serde_json::from_str(&body_text(resp).await).unwrap();
    assert_eq!(json["players"], serde_json::json!([{ "fc": 1, "name": "A" }]));
    assert_eq!(json["blacklist"], serde_json::json!([]));
    assert_eq!(json["logs"], serde_json::json!([]));
  }

  #[tokio::test]
  async fn upload_merges_snapshot() {
    let state = make_state().await;
    post_json(state.clone(), "/log", r#"{"players":[{"fc":1,"name":"A"}]}"#).await;

    let boundary = "X-FCWATCH-BOUNDARY";
    let content  = r#"{"players":[{"fc":1,"name":"A2"},{"fc":2,"name":"B"}],
                       "blacklist":[{"fc":2,"name":"bad"}],
                       "logs":["9: old → new"]}"#;
    let ct   = format!("multipart/form-data; boundary={boundary}");
    let resp = send(
      state.clone(),
      "POST",
      &format!("/upload?token={TOKEN}"),
      vec![(header::CONTENT_TYPE, ct.as_str())],
      multipart(boundary, content),
    ).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_text(resp).await, "Uploaded and merged");

    let snap = state.store.snapshot().await.unwrap();
    assert_eq!(snap.players, vec![Player::new(1, "A2"), Player::new(2, "B")]);
    assert_eq!(snap.blacklist, vec![BlacklistEntry::new(2, "bad")]);
    let lines: Vec<_> = snap.logs.iter().map(ToString::to_string).collect();
    assert_eq!(lines, ["1: A → A2", "9: old → new"]);
  }

  #[tokio::test]
  async fn upload_requires_token() {
    let state    = make_state().await;
    let boundary = "X-FCWATCH-BOUNDARY";
    let ct       = format!("multipart/form-data; boundary={boundary}");
    let resp     = send(
      state.clone(),
      "POST",
      "/upload",
      vec![(header::CONTENT_TYPE, ct.as_str())],
      multipart(boundary, r#"{"players":[],"blacklist":[{"fc":1,"name":"x"}]}"#),
    ).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    assert!(state.store.snapshot().await.unwrap().blacklist.is_empty());
  }

  #[tokio::test]
  async fn upload_without_field_is_bad_request() {
    let state    = make_state().await;
    let boundary = "X-FCWATCH-BOUNDARY";
    let ct       = format!("multipart/form-data; boundary={boundary}");
    let resp     = send(
      state.clone(),
      "POST",
      &format!("/upload?token={TOKEN}"),
      vec![(header::CONTENT_TYPE, ct.as_str())],
      format!("--{boundary}--\r\n"),
    ).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(state.store.snapshot().await.unwrap(), Snapshot::default());
  }

  #[tokio::test]
  async fn file_backend_download_then_upload_round_trips() {
    let dir    = tempfile::tempdir().unwrap();
    let source = make_file_state(&dir, "source.json").await;
    post_json(source.clone(), "/log", r#"{"players":[{"fc":2,"name":"B"},{"fc":1,"name":"A"}]}"#).await;
    post_json(source.clone(), "/log", r#"{"players":[{"fc":1,"name":"A2"}]}"#).await;
    source.store.upsert_blacklist(BlacklistEntry::new(7, "ghost")).await.unwrap();

    let resp = send(source.clone(), "GET", "/download", vec![], Body::empty()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let exported = body_text(resp).await;

    let target   = make_file_state(&dir, "target.json").await;
    let boundary = "X-FCWATCH-BOUNDARY";
    let ct       = format!("multipart/form-data; boundary={boundary}");
    let resp     = send(
      target.clone(),
      "POST",
      &format!("/upload?token={TOKEN}"),
      vec![(header::CONTENT_TYPE, ct.as_str())],
      multipart(boundary, &exported),
    ).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let expected = source.store.snapshot().await.unwrap();
    assert_eq!(expected.logs.len(), 1);
    assert_eq!(target.store.snapshot().await.unwrap(), expected);
  }

  #[tokio::test]
  async fn upload_rejects_invalid_snapshot() {
    let state    = make_state().await;
    let boundary = "X-FCWATCH-BOUNDARY";
    let ct       = format!("multipart/form-data; boundary={boundary}");
    let resp     = send(
      state.clone(),
      "POST",
      &format!("/upload?token={TOKEN}"),
      vec![(header::CONTENT_TYPE, ct.as_str())],
      multipart(boundary, r#"{"blacklist":[{"fc":1,"name":"x"}]}"#),
    ).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert!(state.store.snapshot().await.unwrap().blacklist.is_empty());
  }
}
