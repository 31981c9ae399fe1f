// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Credential store backend tests (file and object storage).

use object_store::memory::InMemory;
use std::sync::Arc;
use strong_sync::error::AppError;
use strong_sync::store::{keys, CredentialStore, FileTokenStore, ObjectTokenStore};

mod common;
use common::{expiring_token, valid_token};

#[tokio::test]
async fn test_file_store_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileTokenStore::new(dir.path().join("strava").join("storage.json"));

    assert!(!store.is_present().await);
    assert!(store.get_token().await.is_err());

    let token = valid_token("access-1");
    store.set_token(&token).await.unwrap();

    assert!(store.is_present().await);
    assert_eq!(store.get_token().await.unwrap(), token);
}

#[tokio::test]
async fn test_file_store_rewrite_truncates() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileTokenStore::new(dir.path().join("storage.json"));

    let mut long = valid_token("a-very-long-access-token-value-that-takes-up-space");
    long.refresh_token = "r".repeat(256);
    store.set_token(&long).await.unwrap();

    let short = valid_token("b");
    store.set_token(&short).await.unwrap();

    assert_eq!(store.get_token().await.unwrap(), short);
}

#[cfg(unix)]
#[tokio::test]
async fn test_file_store_permissions() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempfile::tempdir().unwrap();
    let store = FileTokenStore::new(dir.path().join("storage.json"));
    store.set_token(&valid_token("access")).await.unwrap();

    let mode = std::fs::metadata(store.path()).unwrap().permissions().mode();
    assert_eq!(mode & 0o777, 0o600);
}

#[tokio::test]
async fn test_file_store_rejects_bad_tokens() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileTokenStore::new(dir.path().join("storage.json"));

    let mut expired = valid_token("access");
    expired.expiry = Some(chrono::Utc::now() - chrono::Duration::minutes(1));
    assert!(matches!(
        store.set_token(&expired).await,
        Err(AppError::Credential(_))
    ));

    let mut missing = valid_token("access");
    missing.access_token.clear();
    assert!(store.set_token(&missing).await.is_err());

    // Nothing was written
    assert!(!store.is_present().await);
}

#[tokio::test]
async fn test_file_store_reads_existing_token_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("storage.json");
    std::fs::write(
        &path,
        r#"{"access_token":"1234567890","token_type":"Bearer","refresh_token":"0987654321","expiry":"2023-10-31T16:56:05.570863-04:00"}"#,
    )
    .unwrap();

    let token = FileTokenStore::new(&path).get_token().await.unwrap();
    assert_eq!(token.access_token, "1234567890");
    assert_eq!(token.refresh_token, "0987654321");
    assert!(!token.is_valid());
}

#[tokio::test]
async fn test_file_store_concurrent_access() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(FileTokenStore::new(dir.path().join("storage.json")));
    store.set_token(&valid_token("seed")).await.unwrap();

    let mut handles = Vec::new();
    for i in 0..16 {
        let store = store.clone();
        handles.push(tokio::spawn(async move {
            if i % 2 == 0 {
                store.set_token(&valid_token(&format!("writer-{}", i))).await.unwrap();
            } else {
                // Every read sees a complete record
                let token = store.get_token().await.unwrap();
                assert!(!token.access_token.is_empty());
            }
        }));
    }

    for handle in handles {
        handle.await.unwrap();
    }
}

#[tokio::test]
async fn test_object_store_roundtrip() {
    let store = ObjectTokenStore::new(Arc::new(InMemory::new()), "strava/storage.json");

    assert!(!store.is_present().await);
    assert!(matches!(store.get_token().await, Err(AppError::Storage(_))));

    let token = expiring_token("access-2");
    store.set_token(&token).await.unwrap();

    assert!(store.is_present().await);
    assert_eq!(store.get_token().await.unwrap(), token);
}

#[tokio::test]
async fn test_object_store_keys_are_independent() {
    let backing = Arc::new(InMemory::new());
    let strava = ObjectTokenStore::new(backing.clone(), keys::STRAVA);
    let gdrive = ObjectTokenStore::new(backing, keys::GDRIVE);

    strava.set_token(&valid_token("strava")).await.unwrap();

    assert!(strava.is_present().await);
    assert!(!gdrive.is_present().await);
}

#[tokio::test]
async fn test_object_store_rejects_expired() {
    let store = ObjectTokenStore::new(Arc::new(InMemory::new()), "strava/storage.json");

    let mut expired = valid_token("access");
    expired.expiry = Some(chrono::Utc::now() - chrono::Duration::minutes(1));

    assert!(store.set_token(&expired).await.is_err());
    assert!(!store.is_present().await);
}

#[tokio::test]
async fn test_gdrive_token_under_its_own_key() {
    let dir = tempfile::tempdir().unwrap();
    let strava = FileTokenStore::new(dir.path().join(keys::STRAVA));
    let gdrive = FileTokenStore::new(dir.path().join(keys::GDRIVE));

    let token = valid_token("ya29.drive-access");
    gdrive.set_token(&token).await.unwrap();

    assert_eq!(gdrive.get_token().await.unwrap(), token);
    assert!(gdrive.path().ends_with("gdrive/storage.json"));
    assert!(!strava.is_present().await);
}
