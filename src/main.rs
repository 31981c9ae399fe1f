// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! strong-sync
//!
//! Reads the Strong CSV export, waits for Strava authorization if no token
//! is stored yet, then uploads every workout Strava does not have.

use std::sync::Arc;
use strong_sync::{
    config::{Config, TokenBackend},
    error::AppError,
    models::latest_workout,
    services::{
        aggregate, read_records, storage_token_source, CancelFlag, OAuthProvider, Reconciler,
        ServiceKind, StravaClient, SyncReport,
    },
    store::{CredentialStore, FileTokenStore, ObjectTokenStore},
    AppState,
};
use tokio::sync::Notify;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging
    init_logging()?;

    // Load configuration from environment
    let config = Config::from_env()?;
    tracing::info!(port = config.port, env = %config.environment, "Starting strong-sync");

    // Aggregate the workout export
    tracing::info!(path = %config.workout_csv_path, "Loading workout export");
    let file = std::fs::File::open(&config.workout_csv_path)?;
    let records = read_records(file)?;
    let workouts = aggregate(&records)?;
    tracing::info!(count = workouts.len(), "Workouts aggregated");
    if let Some(latest) = latest_workout(&workouts) {
        tracing::info!(
            name = %latest.name,
            start_time = %latest.start_time,
            sets = latest.set_count(),
            "Most recent workout in export"
        );
    }

    let store = build_store(&config.token_backend)?;
    let oauth = OAuthProvider::new(
        ServiceKind::Strava,
        config.strava_client_id.clone(),
        config.strava_client_secret.clone(),
        config.redirect_url.clone(),
    )?;

    let state = Arc::new(AppState {
        config: config.clone(),
        oauth: oauth.clone(),
        store: store.clone(),
        token_ready: Notify::new(),
    });

    // Without a stored token, run the redirect listener until the browser
    // authorization completes.
    let server = if store.is_present().await {
        None
    } else {
        let app = strong_sync::routes::create_router(state.clone());
        let addr = format!("0.0.0.0:{}", config.port);
        let listener = tokio::net::TcpListener::bind(&addr).await?;
        tracing::info!(address = %addr, "Redirect listener started");

        let handle = tokio::spawn(async move { axum::serve(listener, app).await });
        tracing::info!(
            url = %format!("http://localhost:{}/v1/authorize", config.port),
            "No stored token; open this URL to authorize Strava"
        );

        tokio::select! {
            _ = state.token_ready.notified() => {}
            _ = tokio::signal::ctrl_c() => {
                tracing::warn!("Interrupted while waiting for authorization");
                return Ok(());
            }
        }
        Some(handle)
    };

    let cancel = CancelFlag::new();
    let ctrl_c_flag = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            ctrl_c_flag.cancel();
        }
    });

    let tokens = storage_token_source(oauth, store, None).await;
    let reconciler = Reconciler::new(StravaClient::new());

    let result = reconciler.run(&tokens, &workouts, &cancel).await;

    if let Some(handle) = server {
        handle.abort();
    }

    match result {
        Ok(SyncReport::NothingToUpload) => {
            tracing::info!("Strava is up to date, no activities to post");
            Ok(())
        }
        Ok(SyncReport::Uploaded(activities)) => {
            tracing::info!(count = activities.len(), "Uploaded new workouts to Strava");
            Ok(())
        }
        Err(e) => {
            if e.requires_reauthorization() {
                tracing::error!(error = %e, "Strava authorization is no longer valid; remove the stored token and re-run to authorize");
            } else {
                tracing::error!(error = %e, "Error uploading Strava activities");
            }
            Err(e.into())
        }
    }
}

fn build_store(backend: &TokenBackend) -> Result<Arc<dyn CredentialStore>, AppError> {
    let store: Arc<dyn CredentialStore> = match backend {
        TokenBackend::File { path } => {
            let store = if std::path::Path::new(path).is_absolute() {
                FileTokenStore::new(path)
            } else {
                FileTokenStore::in_home_dir(path)?
            };
            tracing::info!(path = %store.path().display(), "Using file token storage");
            Arc::new(store)
        }
        TokenBackend::S3 { bucket, key } => Arc::new(ObjectTokenStore::s3(bucket, key)?),
    };
    Ok(store)
}

/// Initialize structured JSON logging.
fn init_logging() -> Result<(), Box<dyn std::error::Error>> {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("strong_sync=debug".parse()?)
                .add_directive("info".parse()?),
        )
        .with(format)
        .init();

    Ok(())
}
