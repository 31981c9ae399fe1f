// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Strava API client for listing and creating activities.
//!
//! Handles:
//! - Paginated listing of the athlete's activities
//! - Manual activity creation
//! - Rate limit and token rejection detection

use crate::error::AppError;
use crate::models::RemoteActivity;
use async_trait::async_trait;
use serde::Deserialize;

/// Default Strava API base URL.
pub const STRAVA_API_BASE_URL: &str = "https://www.strava.com/api/v3";

/// Page size for activity listing (Strava's maximum).
pub const ACTIVITIES_PER_PAGE: u32 = 200;

/// The remote side of a reconciliation run.
#[async_trait]
pub trait ActivityService: Send + Sync {
    /// List every activity of the authenticated athlete.
    async fn list_activities(&self, access_token: &str) -> Result<Vec<RemoteActivity>, AppError>;

    /// Create one activity.
    async fn create_activity(
        &self,
        access_token: &str,
        activity: &RemoteActivity,
    ) -> Result<(), AppError>;
}

/// Strava API client.
#[derive(Clone)]
pub struct StravaClient {
    http: reqwest::Client,
    base_url: String,
}

impl Default for StravaClient {
    fn default() -> Self {
        Self::new()
    }
}

impl StravaClient {
    /// Create a new Strava client against the public API.
    pub fn new() -> Self {
        Self::with_base_url(STRAVA_API_BASE_URL)
    }

    /// Create a client against another base URL (used by tests).
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// List one page of activities.
    pub async fn list_activities_page(
        &self,
        access_token: &str,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<RemoteActivity>, AppError> {
        let url = format!("{}/athlete/activities", self.base_url);

        let response = self
            .http
            .get(&url)
            .bearer_auth(access_token)
            .query(&[("per_page", per_page.to_string()), ("page", page.to_string())])
            .send()
            .await
            .map_err(|e| AppError::StravaApi(format!("List activities request failed: {}", e)))?;

        check_response_json(response).await
    }

    /// Check response status and return error if not successful.
    async fn check_response(response: reqwest::Response) -> Result<reqwest::Response, AppError> {
        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        // Rate limit - the caller retries on the next run
        if status.as_u16() == 429 {
            tracing::warn!(body = %body, "Strava rate limit hit (429)");
        }

        // Unauthorized - the token was revoked or has expired early
        if status.as_u16() == 401 {
            return Err(AppError::Credential(format!(
                "{} (HTTP {}: {})",
                AppError::STRAVA_TOKEN_ERROR,
                status,
                body
            )));
        }

        Err(AppError::StravaApi(format!("HTTP {}: {}", status, body)))
    }
}

#[async_trait]
impl ActivityService for StravaClient {
    async fn list_activities(&self, access_token: &str) -> Result<Vec<RemoteActivity>, AppError> {
        let mut all = Vec::new();
        let mut page = 1;

        loop {
            tracing::info!(page, "Fetching Strava athlete activities");
            let activities = self
                .list_activities_page(access_token, page, ACTIVITIES_PER_PAGE)
                .await?;

            if activities.is_empty() {
                break;
            }

            all.extend(activities);
            page += 1;
        }

        tracing::info!(count = all.len(), "Fetched Strava activities");
        Ok(all)
    }

    async fn create_activity(
        &self,
        access_token: &str,
        activity: &RemoteActivity,
    ) -> Result<(), AppError> {
        let url = format!("{}/activities", self.base_url);

        let response = self
            .http
            .post(&url)
            .bearer_auth(access_token)
            .json(activity)
            .send()
            .await
            .map_err(|e| AppError::StravaApi(format!("Create activity request failed: {}", e)))?;

        Self::check_response(response).await?;

        tracing::info!(
            name = %activity.name,
            start_date_local = %activity.start_date_local,
            "Created Strava activity"
        );
        Ok(())
    }
}

/// Check response and parse JSON body.
pub(crate) async fn check_response_json<T: for<'de> Deserialize<'de>>(
    response: reqwest::Response,
) -> Result<T, AppError> {
    let response = StravaClient::check_response(response).await?;

    response
        .json()
        .await
        .map_err(|e| AppError::StravaApi(format!("JSON parse error: {}", e)))
}
