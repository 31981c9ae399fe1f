// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! strong-sync: upload Strong workouts to Strava
//!
//! This crate aggregates the Strong app's CSV export into workout sessions,
//! uploads the sessions Strava does not have yet, and keeps the OAuth token
//! in durable storage so runs can be unattended.

pub mod config;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod store;
pub mod time_utils;

use config::Config;
use services::OAuthProvider;
use std::sync::Arc;
use store::CredentialStore;
use tokio::sync::Notify;

/// Shared state of the redirect listener.
pub struct AppState {
    pub config: Config,
    pub oauth: OAuthProvider,
    pub store: Arc<dyn CredentialStore>,
    /// Signalled once the redirect handler has stored a token.
    pub token_ready: Notify,
}
