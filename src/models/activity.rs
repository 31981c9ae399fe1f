// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Strava activity model for listing and upload.

use crate::models::Workout;
use crate::time_utils::format_activity_date_time;
use serde::{Deserialize, Serialize};

/// Sport type assigned to every uploaded workout.
pub const WEIGHT_TRAINING: &str = "WeightTraining";

/// An activity as Strava lists and creates it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteActivity {
    /// Activity name/title
    pub name: String,
    /// Sport type (WeightTraining, Run, Ride, etc.)
    pub sport_type: String,
    /// Local start time (`YYYY-MM-DDTHH:MM:SSZ`); the dedup key
    pub start_date_local: String,
    /// Elapsed time in seconds
    pub elapsed_time: i64,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    /// Distance in meters
    #[serde(default)]
    pub distance: f64,
    #[serde(default)]
    pub trainer: bool,
    #[serde(default)]
    pub commute: bool,
}

impl From<&Workout> for RemoteActivity {
    fn from(workout: &Workout) -> Self {
        Self {
            name: workout.name.clone(),
            sport_type: WEIGHT_TRAINING.to_string(),
            start_date_local: format_activity_date_time(workout.start_time),
            // Saturates for hand-built workouts; parsed durations always fit
            elapsed_time: i64::try_from(workout.duration.as_secs()).unwrap_or(i64::MAX),
            description: workout.description(),
            distance: 0.0,
            trainer: false,
            commute: false,
        }
    }
}
