//! fcwatch server binary.
//!
//! Reads `config.toml` (or the path given with `--config`), overlays
//! `FCWATCH_*` environment variables and `PORT`, opens the configured store,
//! and serves HTTP.
//!
//! # Admin token hash generation
//!
//! To generate the argon2 PHC string for `admin_token_hash`:
//!
//! ```text
//! cargo run -p fcwatch-server --bin server -- --hash-token
//! ```

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use anyhow::Context as _;
use argon2::{Argon2, PasswordHasher, password_hash::SaltString};
use clap::Parser;
use fcwatch_core::store::RosterStore;
use fcwatch_server::{AppState, Backend, ServerConfig, auth::AdminConfig};
use fcwatch_store_file::FileStore;
use fcwatch_store_sqlite::SqliteStore;
use rand_core::OsRng;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "fcwatch player roster server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  /// Print the argon2 hash for an admin token entered on stdin and exit.
  #[arg(long)]
  hash_token: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  if cli.hash_token {
    let token = read_token()?;
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
      .hash_password(token.as_bytes(), &salt)
      .map_err(|e| anyhow::anyhow!("argon2 error: {e}"))?
      .to_string();
    println!("{hash}");
    return Ok(());
  }

  let server_cfg = load_config(&cli.config)?;
  let store_path = expand_tilde(&server_cfg.store_path);
  ensure_parent_dir(&store_path)?;

  let admin = AdminConfig { token_hash: server_cfg.admin_token_hash.clone() };
  if admin.token_hash.is_none() {
    tracing::warn!("admin_token_hash is not set; admin routes will reject every request");
  }

  let address = format!("{}:{}", server_cfg.host, server_cfg.port);

  match server_cfg.backend {
    Backend::Sqlite => {
      let store = SqliteStore::open(&store_path)
        .await
        .with_context(|| format!("failed to open SQLite store at {store_path:?}"))?;
      serve(store, admin, &address).await
    }
    Backend::File => {
      let store = FileStore::open(&store_path)
        .await
        .with_context(|| format!("failed to open roster document at {store_path:?}"))?;
      serve(store, admin, &address).await
    }
  }
}

/// Layer defaults, the TOML file, `FCWATCH_*` variables, and `PORT`.
fn load_config(path: &Path) -> anyhow::Result<ServerConfig> {
  let settings = config::Config::builder()
    .set_default("host", "0.0.0.0")?
    .set_default("port", 3000_i64)?
    .set_default("backend", "sqlite")?
    .set_default("store_path", "fcwatch.db")?
    .add_source(config::File::from(path).required(false))
    .add_source(config::Environment::with_prefix("FCWATCH"))
    .set_override_option("port", std::env::var("PORT").ok())?
    .build()
    .context("failed to read config file")?;

  settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")
}

async fn serve<S>(store: S, admin: AdminConfig, address: &str) -> anyhow::Result<()>
where
  S: RosterStore + Clone + 'static,
{
  let state = AppState {
    store: Arc::new(store),
    admin: Arc::new(admin),
  };
  let app = fcwatch_server::router(state);

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}

/// Read the admin token from one line of stdin.
fn read_token() -> anyhow::Result<String> {
  use std::io::{self, BufRead, Write};
  print!("Admin token: ");
  io::stdout().flush().ok();
  let mut line = String::new();
  io::stdin().lock().read_line(&mut line)?;
  Ok(
    line
      .trim_end_matches('\n')
      .trim_end_matches('\r')
      .to_string(),
  )
}

/// Create the directory that will hold the store file, if it is missing.
fn ensure_parent_dir(path: &Path) -> anyhow::Result<()> {
  if let Some(parent) = path.parent()
    && !parent.as_os_str().is_empty()
  {
    std::fs::create_dir_all(parent)
      .with_context(|| format!("failed to create store directory {parent:?}"))?;
  }
  Ok(())
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
