// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use async_trait::async_trait;
use chrono::{Duration, Utc};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use strong_sync::config::Config;
use strong_sync::error::AppError;
use strong_sync::models::{RemoteActivity, Token};
use strong_sync::routes::create_router;
use strong_sync::services::{ActivityService, OAuthProvider, ServiceKind, TokenSource};
use strong_sync::store::CredentialStore;
use strong_sync::AppState;
use tokio::sync::Notify;

/// Export header row.
#[allow(dead_code)]
pub const HEADER: [&str; 12] = [
    "Date",
    "Workout Name",
    "Duration",
    "Exercise Name",
    "Set Order",
    "Weight",
    "Reps",
    "Distance",
    "Seconds",
    "Notes",
    "Workout Notes",
    "RPE",
];

/// Build export rows (header first) from string slices.
#[allow(dead_code)]
pub fn rows(data: &[[&str; 12]]) -> Vec<Vec<String>> {
    std::iter::once(&HEADER)
        .chain(data.iter())
        .map(|row| row.iter().map(|s| s.to_string()).collect())
        .collect()
}

/// A token that stays valid for hours.
#[allow(dead_code)]
pub fn valid_token(access: &str) -> Token {
    Token {
        access_token: access.to_string(),
        token_type: "Bearer".to_string(),
        refresh_token: format!("{}-refresh", access),
        expiry: Some(Utc::now() + Duration::hours(6)),
    }
}

/// A token inside the refresh margin (still storable, no longer valid).
#[allow(dead_code)]
pub fn expiring_token(access: &str) -> Token {
    Token {
        expiry: Some(Utc::now() + Duration::seconds(30)),
        ..valid_token(access)
    }
}

/// Strava provider with test credentials.
#[allow(dead_code)]
pub fn test_provider() -> OAuthProvider {
    let config = Config::test_default();
    OAuthProvider::new(
        ServiceKind::Strava,
        config.strava_client_id,
        config.strava_client_secret,
        config.redirect_url,
    )
    .expect("test provider")
}

/// Create a test app over the given store.
#[allow(dead_code)]
pub fn create_test_app(
    store: Arc<dyn CredentialStore>,
    oauth: OAuthProvider,
) -> (axum::Router, Arc<AppState>) {
    let state = Arc::new(AppState {
        config: Config::test_default(),
        oauth,
        store,
        token_ready: Notify::new(),
    });

    (create_router(state.clone()), state)
}

/// Token source returning a fixed token and counting calls.
#[allow(dead_code)]
pub struct CountingTokenSource {
    pub token: Result<Token, String>,
    pub calls: AtomicUsize,
}

#[allow(dead_code)]
impl CountingTokenSource {
    pub fn ok(token: Token) -> Self {
        Self {
            token: Ok(token),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            token: Err(message.to_string()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TokenSource for CountingTokenSource {
    async fn token(&self) -> Result<Token, AppError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.token.clone().map_err(AppError::Credential)
    }
}

/// In-memory activity service recording uploads.
#[allow(dead_code)]
#[derive(Default)]
pub struct FakeActivityService {
    pub remote: Mutex<Vec<RemoteActivity>>,
    pub created: Mutex<Vec<RemoteActivity>>,
    /// Fail the upload with this start date
    pub fail_on: Option<String>,
    pub list_calls: AtomicUsize,
}

#[allow(dead_code)]
impl FakeActivityService {
    pub fn with_remote(remote: Vec<RemoteActivity>) -> Self {
        Self {
            remote: Mutex::new(remote),
            ..Default::default()
        }
    }

    pub fn created(&self) -> Vec<RemoteActivity> {
        self.created.lock().unwrap().clone()
    }
}

#[async_trait]
impl ActivityService for FakeActivityService {
    async fn list_activities(&self, _access_token: &str) -> Result<Vec<RemoteActivity>, AppError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.remote.lock().unwrap().clone())
    }

    async fn create_activity(
        &self,
        _access_token: &str,
        activity: &RemoteActivity,
    ) -> Result<(), AppError> {
        if self.fail_on.as_deref() == Some(activity.start_date_local.as_str()) {
            return Err(AppError::StravaApi("HTTP 500: boom".to_string()));
        }
        self.created.lock().unwrap().push(activity.clone());
        self.remote.lock().unwrap().push(activity.clone());
        Ok(())
    }
}

/// `ActivityService` through a shared reference, so tests can inspect the
/// fake after handing it to a `Reconciler`.
#[allow(dead_code)]
pub struct Shared(pub Arc<FakeActivityService>);

#[async_trait]
impl ActivityService for Shared {
    async fn list_activities(&self, access_token: &str) -> Result<Vec<RemoteActivity>, AppError> {
        self.0.list_activities(access_token).await
    }

    async fn create_activity(
        &self,
        access_token: &str,
        activity: &RemoteActivity,
    ) -> Result<(), AppError> {
        self.0.create_activity(access_token, activity).await
    }
}
