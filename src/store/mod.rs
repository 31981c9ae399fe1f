// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Durable OAuth token storage.
//!
//! One token record per external service, stored either as a local file or
//! as an object in remote object storage.

pub mod file;
pub mod object;

pub use file::FileTokenStore;
pub use object::ObjectTokenStore;

use crate::error::AppError;
use crate::models::Token;
use async_trait::async_trait;

/// Storage keys (file paths relative to the home directory, or object keys).
pub mod keys {
    pub const STRAVA: &str = "strava/storage.json";
    pub const GDRIVE: &str = "gdrive/storage.json";
}

/// Persistence for a single service's token.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Read the stored token.
    async fn get_token(&self) -> Result<Token, AppError>;

    /// Replace the stored token. Incomplete or expired tokens are rejected.
    async fn set_token(&self, token: &Token) -> Result<(), AppError>;

    /// Whether a token has been stored.
    async fn is_present(&self) -> bool;
}

/// Reject tokens that must never be persisted.
pub(crate) fn ensure_storable(token: &Token) -> Result<(), AppError> {
    if token.access_token.is_empty() {
        return Err(AppError::Credential("bad token: missing access token".to_string()));
    }
    if token.refresh_token.is_empty() {
        return Err(AppError::Credential("bad token: missing refresh token".to_string()));
    }
    if token.is_expired() {
        return Err(AppError::Credential("bad token: already expired".to_string()));
    }
    Ok(())
}
