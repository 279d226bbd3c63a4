//! Daily rollover transform for exercises and next-day targets.
//!
//! At each day boundary every exercise is rewritten for the new day:
//!
//! - Completed, with a requested next-day target: adopt that target
//! - Completed, no request: keep the same target
//! - Incomplete: decay the target one step, never below the floor
//! - Progress returns to zero in all three cases
//!
//! # Usage
//!
//! ```rust,ignore
//! let policy = RolloverPolicy::default();
//! let fresh = rollover(&exercises, &targets, &policy);
//! ```

use serde::{Deserialize, Serialize};

use crate::model::{Exercise, NextDayTargets};

/// Policy knobs for the daily rollover transform.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RolloverPolicy {
    /// How many reps an incomplete exercise loses at rollover.
    pub decay_step: u32,
    /// Targets never decay below this floor.
    pub decay_floor: u32,
}

impl Default for RolloverPolicy {
    fn default() -> Self {
        Self {
            decay_step: 1,
            decay_floor: 1,
        }
    }
}

impl RolloverPolicy {
    pub fn with_decay_step(mut self, step: u32) -> Self {
        self.decay_step = step;
        self
    }

    pub fn with_decay_floor(mut self, floor: u32) -> Self {
        self.decay_floor = floor;
        self
    }
}

/// Apply the rollover transform to every exercise, preserving order.
///
/// Next-day target entries are honored only for exercises that finished
/// the day completed; an entry for an incomplete exercise is ignored and
/// the normal decay applies. Not idempotent for incomplete exercises
/// (each call decays again), so callers gate invocations on `is_new_day`.
pub fn rollover(
    exercises: &[Exercise],
    next_day_targets: &NextDayTargets,
    policy: &RolloverPolicy,
) -> Vec<Exercise> {
    exercises
        .iter()
        .map(|exercise| {
            let mut fresh = exercise.clone();
            if exercise.is_completed() {
                if let Some(&requested) = next_day_targets.get(&exercise.id) {
                    fresh.target_reps = requested;
                }
            } else {
                fresh.target_reps = exercise
                    .target_reps
                    .saturating_sub(policy.decay_step)
                    .max(policy.decay_floor);
            }
            fresh.current_reps = 0;
            fresh
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn make_test_exercise(id: &str, target: u32, current: u32) -> Exercise {
        let mut exercise = Exercise::new(id, target);
        exercise.id = id.to_string();
        exercise.current_reps = current;
        exercise
    }

    #[test]
    fn completed_with_request_adopts_new_target() {
        let exercises = vec![make_test_exercise("a", 10, 10)];
        let mut targets = NextDayTargets::new();
        targets.insert("a".to_string(), 15);

        let fresh = rollover(&exercises, &targets, &RolloverPolicy::default());
        assert_eq!(fresh[0].target_reps, 15);
        assert_eq!(fresh[0].current_reps, 0);
    }

    #[test]
    fn completed_without_request_keeps_target() {
        let exercises = vec![make_test_exercise("a", 12, 14)];
        let fresh = rollover(&exercises, &NextDayTargets::new(), &RolloverPolicy::default());
        assert_eq!(fresh[0].target_reps, 12);
        assert_eq!(fresh[0].current_reps, 0);
    }

    #[test]
    fn incomplete_decays_by_one() {
        let exercises = vec![make_test_exercise("a", 10, 4)];
        let fresh = rollover(&exercises, &NextDayTargets::new(), &RolloverPolicy::default());
        assert_eq!(fresh[0].target_reps, 9);
        assert_eq!(fresh[0].current_reps, 0);
    }

    #[test]
    fn decay_never_goes_below_floor() {
        let exercises = vec![make_test_exercise("a", 1, 0)];
        let fresh = rollover(&exercises, &NextDayTargets::new(), &RolloverPolicy::default());
        assert_eq!(fresh[0].target_reps, 1);
    }

    #[test]
    fn request_for_incomplete_exercise_is_ignored() {
        let exercises = vec![make_test_exercise("a", 10, 3)];
        let mut targets = NextDayTargets::new();
        targets.insert("a".to_string(), 20);

        let fresh = rollover(&exercises, &targets, &RolloverPolicy::default());
        assert_eq!(fresh[0].target_reps, 9);
    }

    #[test]
    fn order_and_identity_are_preserved() {
        let exercises = vec![
            make_test_exercise("a", 5, 5),
            make_test_exercise("b", 8, 2),
            make_test_exercise("c", 3, 3),
        ];
        let fresh = rollover(&exercises, &NextDayTargets::new(), &RolloverPolicy::default());
        let ids: Vec<&str> = fresh.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
        assert_eq!(fresh[1].name, exercises[1].name);
    }

    #[test]
    fn empty_list_stays_empty() {
        assert!(rollover(&[], &NextDayTargets::new(), &RolloverPolicy::default()).is_empty());
    }

    #[test]
    fn custom_policy_changes_decay() {
        let policy = RolloverPolicy::default().with_decay_step(3).with_decay_floor(2);
        let exercises = vec![make_test_exercise("a", 4, 0)];
        let fresh = rollover(&exercises, &NextDayTargets::new(), &policy);
        assert_eq!(fresh[0].target_reps, 2);
    }

    proptest! {
        #[test]
        fn rollover_zeroes_progress_and_keeps_targets_positive(
            target in 1u32..200,
            current in 0u32..250,
            requested in 1u32..300,
            with_request in proptest::bool::ANY,
        ) {
            let exercises = vec![make_test_exercise("a", target, current)];
            let mut targets = NextDayTargets::new();
            if with_request {
                targets.insert("a".to_string(), requested);
            }
            let fresh = rollover(&exercises, &targets, &RolloverPolicy::default());
            prop_assert_eq!(fresh[0].current_reps, 0);
            prop_assert!(fresh[0].target_reps >= 1);
        }
    }
}
