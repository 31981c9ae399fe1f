// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Token storage as an object in remote object storage (S3 and compatibles).

use crate::error::AppError;
use crate::models::Token;
use crate::store::{ensure_storable, CredentialStore};
use async_trait::async_trait;
use object_store::path::Path;
use object_store::{ObjectStore, PutPayload};
use std::sync::Arc;

/// Token stored under one object key.
#[derive(Clone)]
pub struct ObjectTokenStore {
    store: Arc<dyn ObjectStore>,
    key: Path,
}

impl ObjectTokenStore {
    pub fn new(store: Arc<dyn ObjectStore>, key: &str) -> Self {
        Self {
            store,
            key: Path::from(key),
        }
    }

    /// S3 bucket backend configured from the standard `AWS_*` environment.
    pub fn s3(bucket: &str, key: &str) -> Result<Self, AppError> {
        let s3 = object_store::aws::AmazonS3Builder::from_env()
            .with_bucket_name(bucket)
            .build()
            .map_err(|e| AppError::Storage(format!("failed to configure S3 bucket {}: {}", bucket, e)))?;

        tracing::info!(bucket, key, "Using S3 token storage");
        Ok(Self::new(Arc::new(s3), key))
    }
}

#[async_trait]
impl CredentialStore for ObjectTokenStore {
    async fn get_token(&self) -> Result<Token, AppError> {
        let result = self.store.get(&self.key).await.map_err(|e| {
            tracing::warn!(key = %self.key, error = %e, "Failed to get token object");
            AppError::Storage(format!("error getting object {}: {}", self.key, e))
        })?;

        let bytes = result.bytes().await.map_err(|e| {
            AppError::Storage(format!("error reading object {}: {}", self.key, e))
        })?;

        serde_json::from_slice(&bytes).map_err(|e| {
            AppError::Storage(format!("failed to decode object {}: {}", self.key, e))
        })
    }

    async fn set_token(&self, token: &Token) -> Result<(), AppError> {
        ensure_storable(token)?;

        let data = serde_json::to_vec(token)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to encode token: {}", e)))?;

        self.store
            .put(&self.key, PutPayload::from(data))
            .await
            .map_err(|e| {
                tracing::error!(key = %self.key, error = %e, "Failed to upload token object");
                AppError::Storage(format!("error uploading token to {}: {}", self.key, e))
            })?;

        Ok(())
    }

    async fn is_present(&self) -> bool {
        self.store.get(&self.key).await.is_ok()
    }
}
