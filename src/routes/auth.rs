// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Strava OAuth authorization routes.

use axum::{
    extract::{Query, State},
    response::Redirect,
    routing::get,
    Router,
};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use subtle::ConstantTimeEq;

use crate::error::{AppError, Result};
use crate::AppState;

// Type alias for HMAC-SHA256
type HmacSha256 = Hmac<Sha256>;

/// How long a consent-page state parameter stays acceptable.
const STATE_MAX_AGE_MILLIS: u128 = 10 * 60 * 1000;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/v1/authorize", get(authorize))
        .route("/v1/redirect", get(redirect))
}

/// Start OAuth flow - redirect to the Strava consent page.
async fn authorize(State(state): State<Arc<AppState>>) -> Result<Redirect> {
    let oauth_state = sign_state(state.oauth.client_secret(), now_millis()?)?;
    let auth_url = state.oauth.auth_code_url(&oauth_state);

    tracing::info!(
        service = ?state.oauth.service(),
        client_id = %state.oauth.client_id(),
        "Starting OAuth flow, redirecting to consent page"
    );

    Ok(Redirect::temporary(&auth_url))
}

/// OAuth redirect - exchange the code, persist the token, wake the
/// reconciliation waiting for it.
async fn redirect(
    State(state): State<Arc<AppState>>,
    Query(params): Query<Vec<(String, String)>>,
) -> Result<&'static str> {
    if let Some(error) = single_value(&params, "error").ok().flatten() {
        tracing::warn!(error = %error, "OAuth error from Strava");
        return Err(AppError::BadRequest(format!("authorization denied: {}", error)));
    }

    let code = parse_code(&params)?;

    let oauth_state = single_value(&params, "state")?
        .ok_or_else(|| AppError::BadRequest("state parameter not found in request query".to_string()))?;
    if !verify_state(&oauth_state, state.oauth.client_secret(), now_millis()?) {
        tracing::warn!("Invalid, expired or tampered OAuth state parameter");
        return Err(AppError::BadRequest("invalid state parameter".to_string()));
    }

    tracing::info!("Exchanging authorization code for tokens");
    let token = state.oauth.exchange_code(&code).await?;
    state.store.set_token(&token).await?;

    tracing::info!("OAuth successful, token stored");
    state.token_ready.notify_one();

    Ok("redirect successful")
}

/// Extract the authorization code: present exactly once and non-empty.
pub fn parse_code(params: &[(String, String)]) -> Result<String> {
    match single_value(params, "code")? {
        None => Err(AppError::BadRequest(
            "code parameter not found in request query".to_string(),
        )),
        Some(code) if code.is_empty() => Err(AppError::BadRequest(
            "code value cannot be empty".to_string(),
        )),
        Some(code) => Ok(code),
    }
}

fn single_value(params: &[(String, String)], name: &str) -> Result<Option<String>> {
    let mut values = params.iter().filter(|(k, _)| k == name).map(|(_, v)| v);

    match (values.next(), values.next()) {
        (None, _) => Ok(None),
        (Some(value), None) => Ok(Some(value.clone())),
        (Some(_), Some(_)) => Err(AppError::BadRequest(format!(
            "too many values for the {} parameter",
            name
        ))),
    }
}

fn now_millis() -> Result<u128> {
    Ok(SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("System time error: {}", e)))?
        .as_millis())
}

/// Sign a timestamped state parameter: base64("timestamp_hex|signature_hex").
pub fn sign_state(secret: &[u8], timestamp_millis: u128) -> Result<String> {
    let payload = format!("{:x}", timestamp_millis);
    let signature = hex::encode(signature(secret, &payload)?);

    Ok(URL_SAFE_NO_PAD.encode(format!("{}|{}", payload, signature).as_bytes()))
}

/// Verify the HMAC signature and age of a state parameter.
pub fn verify_state(state: &str, secret: &[u8], now_millis: u128) -> bool {
    let Some(state_str) = URL_SAFE_NO_PAD
        .decode(state)
        .ok()
        .and_then(|bytes| String::from_utf8(bytes).ok())
    else {
        return false;
    };

    let Some((timestamp_hex, signature_hex)) = state_str.split_once('|') else {
        return false;
    };

    let Ok(expected) = signature(secret, timestamp_hex) else {
        return false;
    };
    let Ok(provided) = hex::decode(signature_hex) else {
        return false;
    };
    if !bool::from(provided.ct_eq(&expected)) {
        tracing::error!("OAuth state signature mismatch! Potential tampering.");
        return false;
    }

    match u128::from_str_radix(timestamp_hex, 16) {
        Ok(issued) => issued <= now_millis && now_millis - issued <= STATE_MAX_AGE_MILLIS,
        Err(_) => false,
    }
}

fn signature(secret: &[u8], payload: &str) -> Result<Vec<u8>> {
    let mut mac = HmacSha256::new_from_slice(secret)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("HMAC init failed: {}", e)))?;
    mac.update(payload.as_bytes());
    Ok(mac.finalize().into_bytes().to_vec())
}
