//! Integration tests for `ProfileStore` against memory and disk backends.

use std::path::PathBuf;

use sweeft_core::{project::Project, store::EntitlementStore};
use uuid::Uuid;

use crate::{ProfileStore, store::OWNED_KEY};

fn project(id: &str, name: &str) -> Project {
  Project {
    id:          id.into(),
    name:        name.into(),
    department:  "Department of Computer Science".into(),
    school:      "SCHOOL OF APPLIED SCIENCE AND TECHNOLOGY".into(),
    description: "desc".into(),
    price:       2500,
    asset_ref:   format!("drive-{id}"),
  }
}

fn scratch_dir() -> PathBuf {
  std::env::temp_dir().join(format!("sweeft-store-test-{}", Uuid::new_v4()))
}

// ─── Ownership set ───────────────────────────────────────────────────────────

#[tokio::test]
async fn fresh_store_owns_nothing() {
  let s = ProfileStore::in_memory();
  assert!(!s.has("P1").await.unwrap());
  assert!(s.owned().await.unwrap().is_empty());
  assert!(s.last_purchase().await.unwrap().is_none());
}

#[tokio::test]
async fn record_then_has() {
  let s = ProfileStore::in_memory();
  s.record(&project("P1", "A")).await.unwrap();

  assert!(s.has("P1").await.unwrap());
  assert!(!s.has("P2").await.unwrap());
  assert_eq!(s.owned().await.unwrap(), ["P1"]);
}

#[tokio::test]
async fn double_record_does_not_duplicate_the_persisted_id() {
  let s = ProfileStore::in_memory();
  s.record(&project("P1", "A")).await.unwrap();
  s.record(&project("P1", "A")).await.unwrap();

  assert!(s.has("P1").await.unwrap());
  assert_eq!(s.owned().await.unwrap(), ["P1"]);
}

#[tokio::test]
async fn ownership_grows_in_recording_order() {
  let s = ProfileStore::in_memory();
  s.record(&project("P2", "B")).await.unwrap();
  s.record(&project("P1", "A")).await.unwrap();
  s.record(&project("P3", "C")).await.unwrap();

  assert_eq!(s.owned().await.unwrap(), ["P2", "P1", "P3"]);
}

// ─── Last purchase ───────────────────────────────────────────────────────────

#[tokio::test]
async fn rerecording_an_owned_id_still_refreshes_last_purchase() {
  let s = ProfileStore::in_memory();
  s.record(&project("P1", "A")).await.unwrap();
  s.record(&project("P2", "B")).await.unwrap();

  // The legitimate "download again" path for an already-owned item.
  s.record(&project("P1", "A")).await.unwrap();

  let last = s.last_purchase().await.unwrap().unwrap();
  assert_eq!(last.id, "P1");
  assert_eq!(s.owned().await.unwrap(), ["P1", "P2"]);
}

// ─── Durability ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn ownership_survives_a_reopen() {
  let dir = scratch_dir();

  {
    let s = ProfileStore::open(&dir).await.unwrap();
    s.record(&project("P1", "A")).await.unwrap();
  }

  let reopened = ProfileStore::open(&dir).await.unwrap();
  assert!(reopened.has("P1").await.unwrap());

  tokio::fs::remove_dir_all(&dir).await.ok();
}

#[tokio::test]
async fn last_purchase_does_not_survive_a_reopen() {
  let dir = scratch_dir();

  {
    let s = ProfileStore::open(&dir).await.unwrap();
    s.record(&project("P1", "A")).await.unwrap();
    assert!(s.last_purchase().await.unwrap().is_some());
  }

  // Shorter-lived scope: gone with the previous store instance.
  let reopened = ProfileStore::open(&dir).await.unwrap();
  assert!(reopened.last_purchase().await.unwrap().is_none());

  tokio::fs::remove_dir_all(&dir).await.ok();
}

#[tokio::test]
async fn corrupt_persisted_data_reads_as_no_entitlements() {
  let dir = scratch_dir();
  tokio::fs::create_dir_all(&dir).await.unwrap();
  tokio::fs::write(dir.join(format!("{OWNED_KEY}.json")), "{not json]")
    .await
    .unwrap();

  let s = ProfileStore::open(&dir).await.unwrap();
  assert!(s.owned().await.unwrap().is_empty());
  assert!(!s.has("P1").await.unwrap());

  // Recording over the corrupt value heals the key.
  s.record(&project("P1", "A")).await.unwrap();
  assert_eq!(s.owned().await.unwrap(), ["P1"]);

  tokio::fs::remove_dir_all(&dir).await.ok();
}
