//! [`FileStore`] — the whole-document implementation of [`RosterStore`].

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use chrono::Utc;
use tokio::{fs, sync::Mutex};

use fcwatch_core::{
  player::{BlacklistEntry, Fc, Observation, Player},
  snapshot::{MergeReport, ReconcileReport, Snapshot},
  store::RosterStore,
};

use crate::{Error, Result};

/// A roster stored as one JSON document.
///
/// Cloning is cheap; clones share the writer lock.
#[derive(Clone)]
pub struct FileStore {
  path:  PathBuf,
  write: Arc<Mutex<()>>,
}

impl FileStore {
  /// Open the document at `path`, creating an empty one if it does not exist.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let store = Self {
      path:  path.as_ref().to_path_buf(),
      write: Arc::new(Mutex::new(())),
    };

    let exists = fs::try_exists(&store.path).await.map_err(|e| store.io(e))?;
    if !exists {
      tracing::info!(path = %store.path.display(), "creating empty roster document");
      store.save(&Snapshot::default()).await?;
    }

    // Fail fast on a corrupt document rather than on the first request.
    store.load().await?;
    Ok(store)
  }

  pub fn path(&self) -> &Path { &self.path }

  async fn load(&self) -> Result<Snapshot> {
    let bytes = fs::read(&self.path).await.map_err(|e| self.io(e))?;
    Ok(serde_json::from_slice(&bytes)?)
  }

  /// Replace the document atomically: write a sibling file, then rename it
  /// over the original.
  async fn save(&self, snapshot: &Snapshot) -> Result<()> {
    let bytes = serde_json::to_vec(snapshot)?;
    let tmp = self.tmp_path();
    fs::write(&tmp, bytes).await.map_err(|e| self.io(e))?;
    fs::rename(&tmp, &self.path).await.map_err(|e| self.io(e))?;
    Ok(())
  }

  /// Run `apply` against the current document and persist the result, with
  /// the writer lock held throughout.
  async fn modify<T, F>(&self, apply: F) -> Result<T>
  where
    F: FnOnce(&mut Snapshot) -> T,
  {
    let _guard = self.write.lock().await;
    let mut snapshot = self.load().await?;
    let out = apply(&mut snapshot);
    self.save(&snapshot).await?;
    Ok(out)
  }

  fn tmp_path(&self) -> PathBuf {
    let mut name = self.path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    self.path.with_file_name(name)
  }

  fn io(&self, source: std::io::Error) -> Error {
    Error::Io { path: self.path.display().to_string(), source }
  }
}

impl RosterStore for FileStore {
  type Error = Error;

  async fn snapshot(&self) -> Result<Snapshot> {
    let mut snapshot = self.load().await?;
    // Hand-edited documents may be unsorted.
    snapshot.sort_players();
    Ok(snapshot)
  }

  async fn get_player(&self, fc: Fc) -> Result<Option<Player>> {
    Ok(self.load().await?.player(fc).cloned())
  }

  async fn record_observations(&self, batch: Vec<Observation>) -> Result<ReconcileReport> {
    self.modify(|s| s.reconcile(batch, Utc::now())).await
  }

  async fn merge_snapshot(&self, incoming: Snapshot) -> Result<MergeReport> {
    self.modify(|s| s.merge(incoming, Utc::now())).await
  }

  async fn upsert_blacklist(&self, entry: BlacklistEntry) -> Result<()> {
    self.modify(|s| s.upsert_blacklist(entry)).await
  }
}
