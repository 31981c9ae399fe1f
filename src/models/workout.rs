// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Workout session model assembled from the Strong export.

use chrono::NaiveDateTime;
use std::fmt::Write as _;
use std::time::Duration;

/// One training session.
#[derive(Debug, Clone, PartialEq)]
pub struct Workout {
    /// Session label (e.g. "Day A")
    pub name: String,
    /// Local start time; unique per session in the export
    pub start_time: NaiveDateTime,
    /// Elapsed wall time of the whole session
    pub duration: Duration,
    /// Exercises in first-appearance order
    pub exercises: Vec<Exercise>,
}

/// One movement within a session.
#[derive(Debug, Clone, PartialEq)]
pub struct Exercise {
    pub name: String,
    pub sets: Vec<Set>,
}

/// One performed set.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Set {
    /// Set order within its exercise (1-based)
    pub order: u32,
    /// Resistance used, in the export's unit (usually pounds)
    pub weight: f64,
    pub reps: u32,
    pub distance: f64,
    /// Set duration
    pub duration: Duration,
    pub notes: String,
    pub session_notes: String,
    /// Perceived exertion (RPE)
    pub perceived_exertion: f64,
}

impl Workout {
    /// Build the activity description listing every set.
    ///
    /// Each distinct exercise name is printed once, followed by all of its
    /// sets in order; exercises are separated by a blank line.
    ///
    /// ```text
    ///
    /// Squat (Barbell)
    /// Set 1: 45.0# x 5
    /// Set 2: 75.0# x 5
    ///
    /// Deadlift (Barbell)
    /// Set 1: 200.0# x 3
    /// ```
    pub fn description(&self) -> String {
        let mut grouped: Vec<(&str, Vec<&Set>)> = Vec::new();

        for exercise in &self.exercises {
            match grouped.iter_mut().find(|(name, _)| *name == exercise.name) {
                Some((_, sets)) => sets.extend(exercise.sets.iter()),
                None => grouped.push((&exercise.name, exercise.sets.iter().collect())),
            }
        }

        let blocks: Vec<String> = grouped
            .into_iter()
            .map(|(name, sets)| {
                let mut block = format!("{}\n", name);
                for set in sets {
                    // Writing to a String cannot fail
                    let _ = writeln!(
                        block,
                        "Set {}: {:.1}# x {}",
                        set.order, set.weight, set.reps
                    );
                }
                block
            })
            .collect();

        format!("\n{}", blocks.join("\n"))
    }

    /// Total number of sets across all exercises.
    pub fn set_count(&self) -> usize {
        self.exercises.iter().map(|e| e.sets.len()).sum()
    }
}

/// Most recent workout by start time.
pub fn latest_workout(workouts: &[Workout]) -> Option<&Workout> {
    workouts.iter().max_by_key(|w| w.start_time)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time_utils::parse_export_date_time;

    fn exercise(name: &str, order: u32, weight: f64, reps: u32) -> Exercise {
        Exercise {
            name: name.to_string(),
            sets: vec![Set {
                order,
                weight,
                reps,
                ..Default::default()
            }],
        }
    }

    fn workout(start: &str, exercises: Vec<Exercise>) -> Workout {
        Workout {
            name: "Day A".to_string(),
            start_time: parse_export_date_time(start).unwrap(),
            duration: Duration::from_secs(3600),
            exercises,
        }
    }

    #[test]
    fn test_description_groups_repeated_exercises() {
        let w = workout(
            "2022-01-16 08:00:00",
            vec![
                exercise("Squat (Barbell)", 1, 45.0, 5),
                exercise("Squat (Barbell)", 2, 75.0, 5),
                exercise("Squat (Barbell)", 3, 95.0, 3),
                exercise("Deadlift (Barbell)", 3, 200.0, 3),
                exercise("Deadlift (Barbell)", 3, 300.0, 3),
            ],
        );

        let expected = "\nSquat (Barbell)\nSet 1: 45.0# x 5\nSet 2: 75.0# x 5\nSet 3: 95.0# x 3\n\nDeadlift (Barbell)\nSet 3: 200.0# x 3\nSet 3: 300.0# x 3\n";
        assert_eq!(w.description(), expected);
    }

    #[test]
    fn test_description_merges_non_adjacent_names() {
        let w = workout(
            "2022-01-16 08:00:00",
            vec![
                exercise("Squat", 1, 45.0, 5),
                exercise("Bench", 1, 65.0, 5),
                exercise("Squat", 2, 50.0, 5),
            ],
        );

        assert_eq!(
            w.description(),
            "\nSquat\nSet 1: 45.0# x 5\nSet 2: 50.0# x 5\n\nBench\nSet 1: 65.0# x 5\n"
        );
    }

    #[test]
    fn test_description_rounds_to_one_decimal() {
        let w = workout(
            "2022-11-14 07:15:24",
            vec![exercise("Squat (Barbell)", 2, 74.99999999999999, 5)],
        );
        assert_eq!(w.description(), "\nSquat (Barbell)\nSet 2: 75.0# x 5\n");
    }

    #[test]
    fn test_latest_workout() {
        let workouts = vec![
            workout("2022-11-14 07:15:24", vec![]),
            workout("2022-11-16 06:00:00", vec![]),
            workout("2022-11-15 07:15:24", vec![]),
        ];

        let latest = latest_workout(&workouts).unwrap();
        assert_eq!(
            latest.start_time,
            parse_export_date_time("2022-11-16 06:00:00").unwrap()
        );
        assert!(latest_workout(&[]).is_none());
    }
}
