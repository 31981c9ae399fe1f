// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application configuration loaded from environment variables.

use crate::store::keys;
use std::env;

/// Where the Strava token is persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenBackend {
    /// JSON file at `path` (relative paths resolve under the home directory)
    File { path: String },
    /// Object `key` in an S3 bucket
    S3 { bucket: String, key: String },
}

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Strava OAuth client ID (public)
    pub strava_client_id: String,
    /// Strava OAuth client secret
    pub strava_client_secret: String,
    /// OAuth redirect URL registered with Strava
    pub redirect_url: String,
    /// Redirect listener port
    pub port: u16,
    /// Path to the Strong CSV export
    pub workout_csv_path: String,
    /// Deployment environment reported by the health check
    pub environment: String,
    pub token_backend: TokenBackend,
}

impl Config {
    /// Default config for testing only.
    pub fn test_default() -> Self {
        Self {
            strava_client_id: "test_client_id".to_string(),
            strava_client_secret: "test_secret".to_string(),
            redirect_url: "http://localhost:4001/v1/redirect".to_string(),
            port: 4001,
            workout_csv_path: "./strong.csv".to_string(),
            environment: "test".to_string(),
            token_backend: TokenBackend::File {
                path: keys::STRAVA.to_string(),
            },
        }
    }

    /// Load configuration from environment variables.
    ///
    /// A `.env` file in the working directory is loaded first if present.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let token_backend = match env::var("TOKEN_BACKEND")
            .unwrap_or_else(|_| "file".to_string())
            .as_str()
        {
            "file" => TokenBackend::File {
                path: env::var("TOKEN_PATH").unwrap_or_else(|_| keys::STRAVA.to_string()),
            },
            "s3" => TokenBackend::S3 {
                bucket: env::var("TOKEN_BUCKET").map_err(|_| ConfigError::Missing("TOKEN_BUCKET"))?,
                key: env::var("TOKEN_OBJECT_KEY").unwrap_or_else(|_| keys::STRAVA.to_string()),
            },
            other => return Err(ConfigError::Invalid("TOKEN_BACKEND", other.to_string())),
        };

        let port = match env::var("PORT") {
            Ok(value) => value
                .parse()
                .map_err(|_| ConfigError::Invalid("PORT", value))?,
            Err(_) => 4001,
        };

        Ok(Self {
            strava_client_id: env::var("STRAVA_CLIENT_ID")
                .map(|v| v.trim().to_string())
                .map_err(|_| ConfigError::Missing("STRAVA_CLIENT_ID"))?,
            strava_client_secret: env::var("STRAVA_CLIENT_SECRET")
                .map(|v| v.trim().to_string())
                .map_err(|_| ConfigError::Missing("STRAVA_CLIENT_SECRET"))?,
            redirect_url: env::var("STRAVA_REDIRECT_URL")
                .unwrap_or_else(|_| "http://localhost:4001/v1/redirect".to_string()),
            port,
            workout_csv_path: env::var("WORKOUT_CSV_PATH")
                .unwrap_or_else(|_| "./strong.csv".to_string()),
            environment: env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
            token_backend,
        })
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {0}: {1:?}")]
    Invalid(&'static str, String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_from_env() {
        // Set required env vars for test
        env::set_var("STRAVA_CLIENT_ID", "test_id");
        env::set_var("STRAVA_CLIENT_SECRET", " test_secret\n");
        env::remove_var("TOKEN_BACKEND");
        env::remove_var("TOKEN_PATH");
        env::remove_var("PORT");

        let config = Config::from_env().expect("Config should load");

        assert_eq!(config.strava_client_id, "test_id");
        assert_eq!(config.strava_client_secret, "test_secret");
        assert_eq!(config.port, 4001);
        assert_eq!(
            config.token_backend,
            TokenBackend::File {
                path: "strava/storage.json".to_string()
            }
        );
    }
}
