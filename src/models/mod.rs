// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod activity;
pub mod token;
pub mod workout;

pub use activity::{RemoteActivity, WEIGHT_TRAINING};
pub use token::Token;
pub use workout::{latest_workout, Exercise, Set, Workout};
