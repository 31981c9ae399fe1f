// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Strong export aggregation.
//!
//! Turns the flat CSV export (one row per set) into [`Workout`] sessions:
//! - Reads raw rows from any reader
//! - Parses and validates every field, naming the offending row and column
//! - Merges rows sharing a start time into one session, in first-seen order

use crate::error::AppError;
use crate::models::{Exercise, Set, Workout};
use crate::time_utils::parse_export_date_time;
use std::collections::HashMap;
use std::io::Read;
use std::time::Duration;

/// Number of columns in a Strong export row.
pub const EXPECTED_COLUMNS: usize = 12;

mod column {
    pub const DATE: usize = 0;
    pub const WORKOUT_NAME: usize = 1;
    pub const DURATION: usize = 2;
    pub const EXERCISE_NAME: usize = 3;
    pub const SET_ORDER: usize = 4;
    pub const WEIGHT: usize = 5;
    pub const REPS: usize = 6;
    pub const DISTANCE: usize = 7;
    pub const SECONDS: usize = 8;
    pub const NOTES: usize = 9;
    pub const WORKOUT_NOTES: usize = 10;
    pub const RPE: usize = 11;
}

/// Read every CSV row, header included.
///
/// Rows with a different field count are returned as-is so that
/// [`aggregate`] can reject them with the row number.
pub fn read_records<R: Read>(input: R) -> Result<Vec<Vec<String>>, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(input);

    reader
        .records()
        .map(|record| {
            record
                .map(|r| r.iter().map(str::to_string).collect())
                .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to read CSV: {}", e)))
        })
        .collect()
}

/// Aggregate export rows into workouts.
///
/// The first row is the header and is skipped. Rows whose raw date string is
/// identical are merged into one workout; name and duration come from the
/// first such row. Output order is the first-seen order of each date.
pub fn aggregate<R: AsRef<[String]>>(rows: &[R]) -> Result<Vec<Workout>, AppError> {
    let mut workouts: Vec<Workout> = Vec::new();
    let mut index_by_date: HashMap<&str, usize> = HashMap::new();

    for (i, row) in rows.iter().enumerate().skip(1) {
        let row = row.as_ref();
        let row_number = i + 1;
        let parsed = parse_row(row_number, row)?;

        let date = row[column::DATE].as_str();
        match index_by_date.get(date) {
            Some(&idx) => workouts[idx].exercises.push(parsed.exercise),
            None => {
                index_by_date.insert(date, workouts.len());
                workouts.push(Workout {
                    name: parsed.name,
                    start_time: parsed.start_time,
                    duration: parsed.duration,
                    exercises: vec![parsed.exercise],
                });
            }
        }
    }

    tracing::debug!(
        rows = rows.len().saturating_sub(1),
        workouts = workouts.len(),
        "Aggregated export rows"
    );

    Ok(workouts)
}

/// Fields of a single row before merging.
struct ParsedRow {
    name: String,
    start_time: chrono::NaiveDateTime,
    duration: Duration,
    exercise: Exercise,
}

fn parse_row(row_number: usize, row: &[String]) -> Result<ParsedRow, AppError> {
    if row.len() != EXPECTED_COLUMNS {
        return Err(AppError::parse(
            row_number,
            "row",
            format!("expected {} fields, got {}", EXPECTED_COLUMNS, row.len()),
        ));
    }

    let start_time = parse_export_date_time(&row[column::DATE])
        .map_err(|e| AppError::parse(row_number, "date", format!("{:?}: {}", row[column::DATE], e)))?;

    let duration = parse_workout_duration(&row[column::DURATION])
        .map_err(|msg| AppError::parse(row_number, "duration", msg))?;

    let set = Set {
        order: parse_required_int(row_number, "set order", &row[column::SET_ORDER])?,
        weight: parse_optional_float(row_number, "weight", &row[column::WEIGHT])?,
        reps: parse_required_int(row_number, "reps", &row[column::REPS])?,
        distance: parse_optional_float(row_number, "distance", &row[column::DISTANCE])?,
        duration: parse_set_duration(row_number, &row[column::SECONDS])?,
        notes: row[column::NOTES].clone(),
        session_notes: row[column::WORKOUT_NOTES].clone(),
        perceived_exertion: parse_optional_float(row_number, "rpe", &row[column::RPE])?,
    };

    Ok(ParsedRow {
        name: row[column::WORKOUT_NAME].clone(),
        start_time,
        duration,
        exercise: Exercise {
            name: row[column::EXERCISE_NAME].clone(),
            sets: vec![set],
        },
    })
}

/// Parse the session duration text: `""`, `"30m"`, `"1h"` or `"1h 30m"`.
pub fn parse_workout_duration(text: &str) -> Result<Duration, String> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(Duration::ZERO);
    }

    let parts: Vec<&str> = text.split(' ').collect();
    let minutes = match parts.as_slice() {
        [single] => {
            if let Some(m) = single.strip_suffix('m') {
                Some(parse_count(m, text)?)
            } else if let Some(h) = single.strip_suffix('h') {
                parse_count(h, text)?.checked_mul(60)
            } else {
                return Err(format!("unrecognized duration {:?}", text));
            }
        }
        [hours, minutes] => {
            let h = hours
                .strip_suffix('h')
                .ok_or_else(|| format!("unrecognized duration {:?}", text))?;
            let m = minutes
                .strip_suffix('m')
                .ok_or_else(|| format!("unrecognized duration {:?}", text))?;
            let (h, m) = (parse_count(h, text)?, parse_count(m, text)?);
            h.checked_mul(60).and_then(|h| h.checked_add(m))
        }
        _ => return Err(format!("unrecognized duration {:?}", text)),
    };

    // Uploaded as a signed elapsed time, so it must fit in an i64
    minutes
        .and_then(|m| m.checked_mul(60))
        .filter(|secs| i64::try_from(*secs).is_ok())
        .map(Duration::from_secs)
        .ok_or_else(|| format!("unrecognized duration {:?}: out of range", text))
}

fn parse_count(digits: &str, text: &str) -> Result<u64, String> {
    digits
        .parse::<u64>()
        .map_err(|e| format!("unrecognized duration {:?}: {}", text, e))
}

fn parse_required_int(row_number: usize, field: &'static str, value: &str) -> Result<u32, AppError> {
    value
        .trim()
        .parse::<u32>()
        .map_err(|e| AppError::parse(row_number, field, format!("{:?}: {}", value, e)))
}

fn parse_optional_float(
    row_number: usize,
    field: &'static str,
    value: &str,
) -> Result<f64, AppError> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(0.0);
    }

    let parsed = value
        .parse::<f64>()
        .map_err(|e| AppError::parse(row_number, field, format!("{:?}: {}", value, e)))?;

    if !parsed.is_finite() || parsed < 0.0 {
        return Err(AppError::parse(
            row_number,
            field,
            format!("{:?}: must be a non-negative number", value),
        ));
    }

    Ok(parsed)
}

fn parse_set_duration(row_number: usize, value: &str) -> Result<Duration, AppError> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(Duration::ZERO);
    }

    value
        .parse::<u64>()
        .map(Duration::from_secs)
        .map_err(|e| AppError::parse(row_number, "seconds", format!("{:?}: {}", value, e)))
}
