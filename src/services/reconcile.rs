// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Reconciliation of local workouts against remote activities.
//!
//! A workout is uploaded only when no remote activity shares its formatted
//! start time. Uploads are sequential; the first failure stops the run and
//! names the activity so the operator can retry.

use crate::error::AppError;
use crate::models::{RemoteActivity, Workout};
use crate::services::strava::ActivityService;
use crate::services::token_source::TokenSource;
use crate::time_utils::canonical_activity_date_time;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Activities missing remotely, or nothing to do.
#[derive(Debug, Clone, PartialEq)]
pub enum Reconciliation {
    NothingToUpload,
    Upload(Vec<RemoteActivity>),
}

/// Outcome of a successful run.
#[derive(Debug, Clone, PartialEq)]
pub enum SyncReport {
    /// Every local workout already exists remotely.
    NothingToUpload,
    /// These activities were created, in order.
    Uploaded(Vec<RemoteActivity>),
}

/// Cooperative cancellation checked before each network call.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Dedup keys of the remote activities.
pub fn remote_keys(remote: &[RemoteActivity]) -> HashSet<String> {
    remote
        .iter()
        .map(|a| canonical_activity_date_time(&a.start_date_local))
        .collect()
}

/// Convert the workouts absent from `remote`, preserving local order.
pub fn reconcile(local: &[Workout], remote: &[RemoteActivity]) -> Reconciliation {
    let existing = remote_keys(remote);

    let new_activities: Vec<RemoteActivity> = local
        .iter()
        .map(RemoteActivity::from)
        .filter(|activity| !existing.contains(&activity.start_date_local))
        .collect();

    if new_activities.is_empty() {
        Reconciliation::NothingToUpload
    } else {
        Reconciliation::Upload(new_activities)
    }
}

/// Drives one reconciliation run against an activity service.
pub struct Reconciler<A> {
    service: A,
}

impl<A: ActivityService> Reconciler<A> {
    pub fn new(service: A) -> Self {
        Self { service }
    }

    /// List, dedup and upload.
    pub async fn run(
        &self,
        tokens: &dyn TokenSource,
        workouts: &[Workout],
        cancel: &CancelFlag,
    ) -> Result<SyncReport, AppError> {
        check_cancelled(cancel, 0)?;

        let token = tokens.token().await?;
        // A refresh may have taken a while
        check_cancelled(cancel, 0)?;
        let remote = self.service.list_activities(&token.access_token).await?;

        let pending = match reconcile(workouts, &remote) {
            Reconciliation::NothingToUpload => {
                tracing::info!(
                    local = workouts.len(),
                    remote = remote.len(),
                    "No new activities to upload"
                );
                return Ok(SyncReport::NothingToUpload);
            }
            Reconciliation::Upload(pending) => pending,
        };

        tracing::info!(count = pending.len(), "Uploading new activities");
        self.upload(tokens, pending, cancel).await
    }

    /// Upload in order, stopping at the first failure.
    pub async fn upload(
        &self,
        tokens: &dyn TokenSource,
        activities: Vec<RemoteActivity>,
        cancel: &CancelFlag,
    ) -> Result<SyncReport, AppError> {
        let mut uploaded = Vec::with_capacity(activities.len());

        for activity in activities {
            check_cancelled(cancel, uploaded.len())?;

            let result = match tokens.token().await {
                Ok(token) => {
                    check_cancelled(cancel, uploaded.len())?;
                    self.service
                        .create_activity(&token.access_token, &activity)
                        .await
                }
                Err(e) => Err(e),
            };

            if let Err(e) = result {
                tracing::error!(
                    name = %activity.name,
                    start_date_local = %activity.start_date_local,
                    error = %e,
                    "Upload failed, skipping remaining activities"
                );
                return Err(AppError::Upload {
                    name: activity.name,
                    start_date_local: activity.start_date_local,
                    uploaded: uploaded.len(),
                    source: Box::new(e),
                });
            }

            uploaded.push(activity);
        }

        Ok(SyncReport::Uploaded(uploaded))
    }
}

fn check_cancelled(cancel: &CancelFlag, uploaded: usize) -> Result<(), AppError> {
    if cancel.is_cancelled() {
        tracing::warn!(uploaded, "Reconciliation cancelled");
        return Err(AppError::Cancelled { uploaded });
    }
    Ok(())
}
