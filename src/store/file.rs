// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Token storage in a local JSON file.

use crate::error::AppError;
use crate::models::Token;
use crate::store::{ensure_storable, CredentialStore};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tokio::sync::RwLock;

/// Token file guarded by a reader/writer lock.
///
/// Readers never observe a partially written file: every write holds the
/// write lock while the file is truncated and rewritten.
pub struct FileTokenStore {
    path: PathBuf,
    lock: RwLock<()>,
}

impl FileTokenStore {
    /// Store at an explicit path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: RwLock::new(()),
        }
    }

    /// Store at `relative` under the user's home directory.
    pub fn in_home_dir(relative: impl AsRef<Path>) -> Result<Self, AppError> {
        let home = dirs::home_dir()
            .ok_or_else(|| AppError::Storage("could not determine home directory".to_string()))?;
        Ok(Self::new(home.join(relative)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl CredentialStore for FileTokenStore {
    async fn get_token(&self) -> Result<Token, AppError> {
        let _guard = self.lock.read().await;

        let data = tokio::fs::read(&self.path).await.map_err(|e| {
            AppError::Storage(format!("failed to read {}: {}", self.path.display(), e))
        })?;

        serde_json::from_slice(&data).map_err(|e| {
            AppError::Storage(format!("failed to decode {}: {}", self.path.display(), e))
        })
    }

    async fn set_token(&self, token: &Token) -> Result<(), AppError> {
        ensure_storable(token)?;

        let data = serde_json::to_vec(token)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to encode token: {}", e)))?;

        let _guard = self.lock.write().await;

        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                AppError::Storage(format!("unable to create directory: {}", e))
            })?;
        }

        let mut options = tokio::fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        options.mode(0o600);

        let mut file = options
            .open(&self.path)
            .await
            .map_err(|e| AppError::Storage(format!("unable to store token: {}", e)))?;

        file.write_all(&data)
            .await
            .map_err(|e| AppError::Storage(format!("unable to store token: {}", e)))?;
        file.flush()
            .await
            .map_err(|e| AppError::Storage(format!("unable to store token: {}", e)))?;

        tracing::debug!(path = %self.path.display(), "Stored token file");
        Ok(())
    }

    async fn is_present(&self) -> bool {
        let _guard = self.lock.read().await;
        tokio::fs::metadata(&self.path).await.is_ok()
    }
}
