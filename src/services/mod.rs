// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod aggregator;
pub mod oauth;
pub mod reconcile;
pub mod strava;
pub mod token_source;

pub use aggregator::{aggregate, read_records};
pub use oauth::{OAuthProvider, ServiceKind};
pub use reconcile::{reconcile, CancelFlag, Reconciler, Reconciliation, SyncReport};
pub use strava::{ActivityService, StravaClient};
pub use token_source::{storage_token_source, RefreshTokenSource, StorageTokenSource, TokenSource};
