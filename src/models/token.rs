// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! OAuth token model persisted by the credential stores.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Margin before token expiration when we proactively refresh (5 minutes).
pub const TOKEN_REFRESH_MARGIN_SECS: i64 = 5 * 60;

/// OAuth credential pair with expiry.
///
/// Serialized as `{"access_token", "token_type", "refresh_token", "expiry"}`
/// with an RFC 3339 expiry, one JSON record per service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub access_token: String,
    #[serde(default)]
    pub token_type: String,
    #[serde(default)]
    pub refresh_token: String,
    /// When the access token expires; `None` means it never does
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry: Option<DateTime<Utc>>,
}

impl Token {
    /// Token is usable for requests: has an access token and does not
    /// expire within the refresh margin.
    pub fn is_valid(&self) -> bool {
        self.is_valid_at(Utc::now())
    }

    /// [`Token::is_valid`] against an explicit clock.
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        if self.access_token.is_empty() {
            return false;
        }
        match self.expiry {
            Some(expiry) => now + Duration::seconds(TOKEN_REFRESH_MARGIN_SECS) < expiry,
            None => true,
        }
    }

    /// Expiry lies strictly in the past.
    pub fn is_expired(&self) -> bool {
        matches!(self.expiry, Some(expiry) if expiry <= Utc::now())
    }
}
