//! Tests for StateManager

use super::*;
use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use tempfile::tempdir;

fn sample_state() -> SyncState {
    SyncState {
        last_sync_date: NaiveDate::from_ymd_opt(2024, 1, 15),
        total_processed: 2500,
        last_cursor: Some(2500),
    }
}

// ============================================================================
// Construction Tests
// ============================================================================

#[test]
fn test_state_manager_in_memory() {
    let manager = StateManager::in_memory();
    assert!(manager.is_in_memory());
}

#[tokio::test]
async fn test_state_manager_from_json() {
    let manager = StateManager::from_json(
        r#"{"last_sync_date": "20240115", "total_processed": 2500, "last_cursor": 2500}"#,
    )
    .unwrap();

    assert!(manager.is_in_memory());
    assert_eq!(manager.get().await, sample_state());
}

#[tokio::test]
async fn test_state_manager_from_empty_json() {
    let manager = StateManager::from_json("{}").unwrap();
    assert!(manager.get().await.is_empty());

    let manager = StateManager::from_json("  ").unwrap();
    assert!(manager.get().await.is_empty());
}

#[test]
fn test_state_manager_from_invalid_json() {
    let err = StateManager::from_json("{ invalid json }").unwrap_err();
    assert!(matches!(err, crate::error::Error::State { .. }));
}

#[tokio::test]
async fn test_from_file_existing_and_missing() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("state.json");

    let missing = StateManager::from_file(&path).unwrap();
    assert!(!missing.is_in_memory());
    assert_eq!(missing.path(), path.as_path());
    assert!(missing.get().await.is_empty());

    std::fs::write(&path, r#"{"last_sync_date": "2024-01-15T00:00:00Z"}"#).unwrap();
    let existing = StateManager::from_file(&path).unwrap();
    assert_eq!(
        existing.get().await.last_sync_date,
        NaiveDate::from_ymd_opt(2024, 1, 15)
    );
}

#[test]
fn test_from_file_invalid_json() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("invalid.json");
    std::fs::write(&path, "{ invalid json }").unwrap();

    assert!(StateManager::from_file(&path).is_err());
}

// ============================================================================
// Checkpoint Tests
// ============================================================================

#[tokio::test]
async fn test_checkpoint_in_memory() {
    let manager = StateManager::in_memory();
    manager.checkpoint(&sample_state()).await.unwrap();

    assert_eq!(manager.get().await, sample_state());
}

#[tokio::test]
async fn test_clone_shares_state() {
    let manager = StateManager::in_memory();
    let cloned = manager.clone();

    manager.checkpoint(&sample_state()).await.unwrap();

    assert_eq!(cloned.get().await, sample_state());
}

#[tokio::test]
async fn test_checkpoint_persists_to_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("state.json");

    let manager = StateManager::from_file(&path).unwrap();
    manager.checkpoint(&sample_state()).await.unwrap();

    let reloaded = StateManager::from_file(&path).unwrap();
    assert_eq!(reloaded.get().await, sample_state());
}

#[tokio::test]
async fn test_saved_file_uses_iso_date() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("state.json");

    let manager = StateManager::from_file(&path).unwrap();
    manager.checkpoint(&sample_state()).await.unwrap();

    let contents = std::fs::read_to_string(&path).unwrap();
    let value: serde_json::Value = serde_json::from_str(&contents).unwrap();
    assert_eq!(value["last_sync_date"], "2024-01-15");
    assert!(!dir.path().join("state.tmp").exists());
}

#[tokio::test]
async fn test_checkpoint_to_missing_directory_fails() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("missing").join("state.json");

    let manager = StateManager::from_file(&path).unwrap();
    let err = manager.checkpoint(&sample_state()).await.unwrap_err();

    assert!(matches!(err, crate::error::Error::State { .. }));
}
