// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! OAuth 2.0 provider configuration for the services we authorize against.
//!
//! Covers consent URL generation, authorization code exchange and refresh
//! token grants. The browser redirect itself is handled in `routes::auth`.

use crate::error::AppError;
use crate::models::Token;
use chrono::{DateTime, TimeDelta, Utc};
use serde::Deserialize;

pub const STRAVA_AUTHORIZE_URL: &str = "https://www.strava.com/oauth/authorize";
pub const STRAVA_TOKEN_URL: &str = "https://www.strava.com/oauth/token";
pub const STRAVA_SCOPES: &str = "activity:write,activity:read";

pub const GDRIVE_AUTHORIZE_URL: &str = "https://accounts.google.com/o/oauth2/auth";
pub const GDRIVE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
pub const GDRIVE_SCOPES: &str = "https://www.googleapis.com/auth/drive.readonly";

/// Services with an OAuth flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceKind {
    /// Fitness-activity service (upload target)
    Strava,
    /// Storage service holding the workout export
    GoogleDrive,
}

impl ServiceKind {
    fn endpoints(self) -> (&'static str, &'static str, &'static str) {
        match self {
            ServiceKind::Strava => (STRAVA_AUTHORIZE_URL, STRAVA_TOKEN_URL, STRAVA_SCOPES),
            ServiceKind::GoogleDrive => (GDRIVE_AUTHORIZE_URL, GDRIVE_TOKEN_URL, GDRIVE_SCOPES),
        }
    }
}

/// OAuth client credentials and endpoints for one service.
#[derive(Clone)]
pub struct OAuthProvider {
    http: reqwest::Client,
    service: ServiceKind,
    client_id: String,
    client_secret: String,
    redirect_url: String,
    authorize_url: String,
    token_url: String,
    scopes: String,
}

impl std::fmt::Debug for OAuthProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OAuthProvider")
            .field("service", &self.service)
            .field("client_id", &self.client_id)
            .field("redirect_url", &self.redirect_url)
            .finish_non_exhaustive()
    }
}

impl OAuthProvider {
    /// Create a provider. Client id, secret and redirect URL are required.
    pub fn new(
        service: ServiceKind,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        redirect_url: impl Into<String>,
    ) -> Result<Self, AppError> {
        let client_id = client_id.into();
        let client_secret = client_secret.into();
        let redirect_url = redirect_url.into();

        if client_id.is_empty() {
            return Err(AppError::BadRequest("client id is required".to_string()));
        }
        if client_secret.is_empty() {
            return Err(AppError::BadRequest("client secret is required".to_string()));
        }
        if redirect_url.is_empty() {
            return Err(AppError::BadRequest("redirect url is required".to_string()));
        }

        let (authorize_url, token_url, scopes) = service.endpoints();

        Ok(Self {
            http: reqwest::Client::new(),
            service,
            client_id,
            client_secret,
            redirect_url,
            authorize_url: authorize_url.to_string(),
            token_url: token_url.to_string(),
            scopes: scopes.to_string(),
        })
    }

    /// Override the token endpoint (used by tests).
    pub fn with_token_url(mut self, token_url: impl Into<String>) -> Self {
        self.token_url = token_url.into();
        self
    }

    pub fn service(&self) -> ServiceKind {
        self.service
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    /// Secret bytes, also used to sign the OAuth state parameter.
    pub fn client_secret(&self) -> &[u8] {
        self.client_secret.as_bytes()
    }

    /// Consent page URL the user opens in a browser.
    pub fn auth_code_url(&self, state: &str) -> String {
        format!(
            "{}?client_id={}&redirect_uri={}&response_type=code&scope={}&state={}",
            self.authorize_url,
            urlencoding::encode(&self.client_id),
            urlencoding::encode(&self.redirect_url),
            urlencoding::encode(&self.scopes),
            urlencoding::encode(state)
        )
    }

    /// Exchange an authorization code for a token.
    pub async fn exchange_code(&self, code: &str) -> Result<Token, AppError> {
        let response = self
            .http
            .post(&self.token_url)
            .form(&[
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("code", code),
                ("grant_type", "authorization_code"),
                ("redirect_uri", self.redirect_url.as_str()),
            ])
            .send()
            .await
            .map_err(|e| AppError::Credential(format!("Token exchange failed: {}", e)))?;

        let token_response = read_token_response(response, "Token exchange").await?;
        Ok(token_response.into_token(Utc::now(), None))
    }

    /// Refresh an expired access token.
    ///
    /// A response without a refresh token keeps the previous one.
    pub async fn refresh(&self, refresh_token: &str) -> Result<Token, AppError> {
        let response = self
            .http
            .post(&self.token_url)
            .form(&[
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("refresh_token", refresh_token),
                ("grant_type", "refresh_token"),
            ])
            .send()
            .await
            .map_err(|e| AppError::Credential(format!("Token refresh request failed: {}", e)))?;

        let token_response = read_token_response(response, "Token refresh").await?;
        Ok(token_response.into_token(Utc::now(), Some(refresh_token)))
    }
}

async fn read_token_response(
    response: reqwest::Response,
    operation: &str,
) -> Result<TokenResponse, AppError> {
    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        tracing::error!(status = %status, body = %body, "{} failed", operation);
        return Err(AppError::Credential(format!(
            "{} failed with status {}: {}",
            operation, status, body
        )));
    }

    response
        .json()
        .await
        .map_err(|e| AppError::Credential(format!("Failed to parse token response: {}", e)))
}

/// Token endpoint response. Strava reports `expires_at`, Google `expires_in`.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_at: Option<i64>,
    #[serde(default)]
    pub expires_in: Option<i64>,
}

impl TokenResponse {
    /// Convert to a [`Token`], falling back to `previous_refresh` when the
    /// response carries no refresh token.
    pub fn into_token(self, now: DateTime<Utc>, previous_refresh: Option<&str>) -> Token {
        let expiry = match (self.expires_at, self.expires_in) {
            (Some(at), _) => DateTime::from_timestamp(at, 0),
            // Out-of-range lifetimes: treat huge values as non-expiring and
            // huge negative ones as already expired
            (None, Some(secs)) => TimeDelta::try_seconds(secs)
                .and_then(|lifetime| now.checked_add_signed(lifetime))
                .or(if secs < 0 { Some(now) } else { None }),
            (None, None) => None,
        };

        Token {
            access_token: self.access_token,
            token_type: self.token_type.unwrap_or_else(|| "Bearer".to_string()),
            refresh_token: self
                .refresh_token
                .filter(|t| !t.is_empty())
                .or_else(|| previous_refresh.map(str::to_string))
                .unwrap_or_default(),
            expiry,
        }
    }
}
