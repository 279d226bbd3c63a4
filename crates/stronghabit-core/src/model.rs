//! Core data model: exercises, per-user stats, and next-day targets.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A tracked exercise with a daily rep target.
///
/// Progress is per-day: `current_reps` is zeroed by every daily rollover
/// while `id` and `created_at` stay stable for the exercise's lifetime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exercise {
    pub id: String,
    pub name: String,
    /// Daily goal in reps, always at least 1.
    pub target_reps: u32,
    /// Reps logged toward today's target.
    pub current_reps: u32,
    pub created_at: DateTime<Utc>,
}

impl Exercise {
    /// Create a new exercise with a fresh id and zero progress.
    pub fn new(name: impl Into<String>, target_reps: u32) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
            target_reps: target_reps.max(1),
            current_reps: 0,
            created_at: Utc::now(),
        }
    }

    /// An exercise is complete once progress reaches the target.
    pub fn is_completed(&self) -> bool {
        self.current_reps >= self.target_reps
    }

    /// Apply a signed progress delta, clamping at zero.
    pub fn adjust_progress(&mut self, delta: i64) {
        let next = self.current_reps as i64 + delta;
        self.current_reps = next.max(0) as u32;
    }
}

/// Streak and rollover bookkeeping for a single user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserStats {
    /// Consecutive fully-completed days.
    pub streak: u32,
    /// When the most recent daily rollover ran.
    pub last_reset: DateTime<Utc>,
    /// When the most recent completion celebration fired.
    pub last_celebration: Option<DateTime<Utc>>,
}

impl UserStats {
    /// Fresh stats for a user with no stored record.
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            streak: 0,
            last_reset: now,
            last_celebration: None,
        }
    }
}

/// Requested targets for tomorrow, keyed by exercise id.
///
/// An entry is only honored for an exercise that finishes today completed;
/// the daily rollover consumes and clears the whole map.
pub type NextDayTargets = HashMap<String, u32>;

/// Count of exercises still short of their target.
pub fn incomplete_count(exercises: &[Exercise]) -> usize {
    exercises.iter().filter(|e| !e.is_completed()).count()
}

/// True when the list is non-empty and every exercise is complete.
pub fn all_completed(exercises: &[Exercise]) -> bool {
    !exercises.is_empty() && exercises.iter().all(Exercise::is_completed)
}

/// Total reps logged across all exercises today.
pub fn total_reps(exercises: &[Exercise]) -> u32 {
    exercises.iter().map(|e| e.current_reps).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_test_exercise(target: u32, current: u32) -> Exercise {
        let mut exercise = Exercise::new("Push-ups", target);
        exercise.current_reps = current;
        exercise
    }

    #[test]
    fn completion_requires_reaching_target() {
        assert!(!make_test_exercise(10, 9).is_completed());
        assert!(make_test_exercise(10, 10).is_completed());
        assert!(make_test_exercise(10, 11).is_completed());
    }

    #[test]
    fn progress_clamps_at_zero() {
        let mut exercise = make_test_exercise(10, 2);
        exercise.adjust_progress(-5);
        assert_eq!(exercise.current_reps, 0);
        exercise.adjust_progress(3);
        assert_eq!(exercise.current_reps, 3);
    }

    #[test]
    fn new_exercise_floors_target_at_one() {
        assert_eq!(Exercise::new("Squats", 0).target_reps, 1);
        assert_eq!(Exercise::new("Squats", 25).target_reps, 25);
    }

    #[test]
    fn empty_list_is_never_all_completed() {
        assert!(!all_completed(&[]));
    }

    #[test]
    fn aggregates_over_mixed_list() {
        let exercises = vec![
            make_test_exercise(10, 10),
            make_test_exercise(5, 2),
            make_test_exercise(8, 0),
        ];
        assert_eq!(incomplete_count(&exercises), 2);
        assert!(!all_completed(&exercises));
        assert_eq!(total_reps(&exercises), 12);

        let done = vec![make_test_exercise(10, 10), make_test_exercise(5, 7)];
        assert!(all_completed(&done));
        assert_eq!(incomplete_count(&done), 0);
    }
}
