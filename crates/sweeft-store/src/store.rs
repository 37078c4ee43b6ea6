//! [`ProfileStore`] — the device-profile implementation of
//! [`EntitlementStore`].
//!
//! Two storage scopes, mirroring the persisted-state contract:
//!
//! - **local** — one JSON value per well-known key, file-backed inside the
//!   profile directory; survives process restarts.
//! - **session** — in-process only; holds the best-effort "last purchase"
//!   record and dies with the store.
//!
//! Unparseable persisted data reads as empty, never as an error.

use std::{
  collections::HashMap,
  path::{Path, PathBuf},
  sync::{Arc, Mutex},
};

use sweeft_core::{project::Project, store::EntitlementStore};

use crate::{Error, Result};

/// Well-known local-scope key holding the JSON array of owned project ids.
pub const OWNED_KEY: &str = "sweeft_purchases_v1";

/// Session-scope key holding the JSON of the most recent purchase.
pub const LAST_PURCHASE_KEY: &str = "last_purchase";

// ─── Backend ─────────────────────────────────────────────────────────────────

enum Backend {
  /// One `<key>.json` file per key inside the profile directory.
  Disk(PathBuf),
  /// Key/value map — useful for testing.
  Memory(Mutex<HashMap<String, String>>),
}

impl Backend {
  fn key_path(dir: &Path, key: &str) -> PathBuf { dir.join(format!("{key}.json")) }

  async fn read(&self, key: &str) -> Result<Option<String>> {
    match self {
      Self::Disk(dir) => match tokio::fs::read_to_string(Self::key_path(dir, key)).await {
        Ok(raw) => Ok(Some(raw)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(Error::Io(e)),
      },
      Self::Memory(map) => Ok(map.lock().expect("storage lock").get(key).cloned()),
    }
  }

  /// Durable by the time this returns: written to a sibling temp file and
  /// renamed over the key file.
  async fn write(&self, key: &str, value: String) -> Result<()> {
    match self {
      Self::Disk(dir) => {
        let path = Self::key_path(dir, key);
        let tmp = dir.join(format!("{key}.json.tmp"));
        tokio::fs::write(&tmp, value).await?;
        tokio::fs::rename(&tmp, &path).await?;
        Ok(())
      }
      Self::Memory(map) => {
        map.lock().expect("storage lock").insert(key.to_string(), value);
        Ok(())
      }
    }
  }
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// A device-scoped entitlement store.
///
/// Cloning is cheap — backends are reference-counted, so clones observe the
/// same ownership set and session records.
#[derive(Clone)]
pub struct ProfileStore {
  local:   Arc<Backend>,
  session: Arc<Mutex<HashMap<String, String>>>,
}

impl ProfileStore {
  /// Open (or create) a profile directory at `dir`.
  pub async fn open(dir: impl Into<PathBuf>) -> Result<Self> {
    let dir = dir.into();
    tokio::fs::create_dir_all(&dir).await?;
    Ok(Self {
      local:   Arc::new(Backend::Disk(dir)),
      session: Arc::default(),
    })
  }

  /// Open an in-memory store — useful for testing.
  pub fn in_memory() -> Self {
    Self {
      local:   Arc::new(Backend::Memory(Mutex::default())),
      session: Arc::default(),
    }
  }

  /// The owned-id set as currently persisted. Corrupt or absent data reads
  /// as no entitlements.
  async fn owned_ids(&self) -> Result<Vec<String>> {
    let Some(raw) = self.local.read(OWNED_KEY).await? else {
      return Ok(Vec::new());
    };
    Ok(serde_json::from_str(&raw).unwrap_or_default())
  }

  fn session_put(&self, key: &str, value: String) {
    self
      .session
      .lock()
      .expect("session lock")
      .insert(key.to_string(), value);
  }

  fn session_get(&self, key: &str) -> Option<String> {
    self.session.lock().expect("session lock").get(key).cloned()
  }
}

// ─── EntitlementStore impl ───────────────────────────────────────────────────

impl EntitlementStore for ProfileStore {
  type Error = Error;

  async fn has(&self, project_id: &str) -> Result<bool> {
    Ok(self.owned_ids().await?.iter().any(|id| id == project_id))
  }

  async fn record(&self, project: &Project) -> Result<()> {
    let mut owned = self.owned_ids().await?;
    if !owned.iter().any(|id| id == &project.id) {
      owned.push(project.id.clone());
      self
        .local
        .write(OWNED_KEY, serde_json::to_string(&owned)?)
        .await?;
    }

    // Refreshed unconditionally so "retry last download" targets the most
    // recent successful transaction, owned-already or not.
    self.session_put(LAST_PURCHASE_KEY, serde_json::to_string(project)?);
    Ok(())
  }

  async fn owned(&self) -> Result<Vec<String>> { self.owned_ids().await }

  async fn last_purchase(&self) -> Result<Option<Project>> {
    Ok(
      self
        .session_get(LAST_PURCHASE_KEY)
        .and_then(|raw| serde_json::from_str(&raw).ok()),
    )
  }
}
