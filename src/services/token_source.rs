// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Access token retrieval with transparent refresh.
//!
//! [`StorageTokenSource`] consults the credential store before touching the
//! network and persists every token it obtains, so a restarted process
//! resumes with the last token instead of a new browser authorization.

use crate::error::AppError;
use crate::models::Token;
use crate::services::oauth::OAuthProvider;
use crate::store::CredentialStore;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Anything that can hand out a currently valid token.
#[async_trait]
pub trait TokenSource: Send + Sync {
    async fn token(&self) -> Result<Token, AppError>;
}

/// Keeps the current token and refreshes it through the OAuth provider once
/// it expires.
pub struct RefreshTokenSource {
    provider: OAuthProvider,
    current: Mutex<Option<Token>>,
}

impl RefreshTokenSource {
    pub fn new(provider: OAuthProvider, seed: Option<Token>) -> Self {
        Self {
            provider,
            current: Mutex::new(seed),
        }
    }
}

#[async_trait]
impl TokenSource for RefreshTokenSource {
    async fn token(&self) -> Result<Token, AppError> {
        // Held across the refresh so concurrent callers wait for one grant
        let mut current = self.current.lock().await;

        let refresh_token = match current.as_ref() {
            Some(token) if token.is_valid() => return Ok(token.clone()),
            Some(token) if !token.refresh_token.is_empty() => token.refresh_token.clone(),
            _ => {
                return Err(AppError::Credential(
                    "no refresh token available; authorization required".to_string(),
                ))
            }
        };

        tracing::info!("Access token expired, refreshing");
        let refreshed = self.provider.refresh(&refresh_token).await?;
        *current = Some(refreshed.clone());

        Ok(refreshed)
    }
}

/// Store-first decorator around another token source.
pub struct StorageTokenSource<S> {
    store: Arc<dyn CredentialStore>,
    inner: S,
}

impl<S: TokenSource> StorageTokenSource<S> {
    pub fn new(store: Arc<dyn CredentialStore>, inner: S) -> Self {
        Self { store, inner }
    }
}

#[async_trait]
impl<S: TokenSource> TokenSource for StorageTokenSource<S> {
    async fn token(&self) -> Result<Token, AppError> {
        match self.store.get_token().await {
            Ok(token) if token.is_valid() => return Ok(token),
            Ok(_) => tracing::debug!("Stored token expired"),
            Err(e) => tracing::debug!(error = %e, "No usable stored token"),
        }

        let token = self.inner.token().await?;
        self.store.set_token(&token).await?;

        tracing::info!("Persisted new access token");
        Ok(token)
    }
}

/// Build the store-backed refreshing source for `provider`.
///
/// When `seed` is missing or no longer valid, the refresher starts from the
/// stored token so its refresh token can be used.
pub async fn storage_token_source(
    provider: OAuthProvider,
    store: Arc<dyn CredentialStore>,
    seed: Option<Token>,
) -> StorageTokenSource<RefreshTokenSource> {
    let seed = match seed {
        Some(token) if token.is_valid() => Some(token),
        other => store.get_token().await.ok().or(other),
    };

    StorageTokenSource::new(store, RefreshTokenSource::new(provider, seed))
}
