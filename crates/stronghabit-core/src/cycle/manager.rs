//! Daily cycle manager: rollover, streak decay, completion celebrations.
//!
//! The manager owns no timer. A host invokes [`DailyCycleManager::run`] on a
//! periodic tick (and on startup) with an explicit `now`, which keeps every
//! day-boundary decision testable without a clock.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::CoreError;
use crate::events::Event;
use crate::model::{all_completed, total_reps, Exercise, UserStats};
use crate::storage::HabitStore;

use super::day::{full_days_between, is_new_day, start_of_day};
use super::rollover::{rollover, RolloverPolicy};

/// Payload for a completion celebration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Celebration {
    pub new_streak: u32,
    pub exercises_done: usize,
    pub total_reps: u32,
}

/// Decide whether today's full completion should celebrate.
///
/// Celebrates at most once per local calendar day: a second full completion
/// on the same date (after un-checking and re-checking, say) is a no-op.
/// An empty exercise list never celebrates.
pub fn evaluate_completion(
    exercises: &[Exercise],
    stats: &UserStats,
    now: DateTime<Utc>,
) -> Option<Celebration> {
    if !all_completed(exercises) {
        return None;
    }
    if let Some(last) = stats.last_celebration {
        if !is_new_day(last, now) {
            return None;
        }
    }
    Some(Celebration {
        new_streak: stats.streak + 1,
        exercises_done: exercises.len(),
        total_reps: total_reps(exercises),
    })
}

/// Apply the missed-day rule: more than one full day since the last
/// rollover wipes the streak to zero. One missed check-in within the
/// same day, or a rollover that ran yesterday, leaves it untouched.
pub fn decay_streak_if_missed(stats: &UserStats, now: DateTime<Utc>) -> UserStats {
    let mut fresh = stats.clone();
    if full_days_between(stats.last_reset, now) > 1 {
        fresh.streak = 0;
    }
    fresh
}

/// Drives the daily cycle against a persistence backend.
pub struct DailyCycleManager {
    store: Arc<dyn HabitStore>,
    policy: RolloverPolicy,
}

impl DailyCycleManager {
    pub fn new(store: Arc<dyn HabitStore>) -> Self {
        Self::with_policy(store, RolloverPolicy::default())
    }

    pub fn with_policy(store: Arc<dyn HabitStore>, policy: RolloverPolicy) -> Self {
        Self { store, policy }
    }

    /// One periodic trigger: streak decay first (it reads the pre-rollover
    /// `last_reset`), then the day-boundary rollover, then the completion
    /// celebration against whatever state the day was left in. Returns the
    /// events that fired, oldest first.
    pub async fn run(&self, now: DateTime<Utc>) -> Result<Vec<Event>, CoreError> {
        let mut events = Vec::new();
        if let Some(event) = self.decay_streak(now).await? {
            events.push(event);
        }
        if let Some(event) = self.check(now).await? {
            events.push(event);
        }
        if let Some(celebration) = self.celebrate_if_complete(now).await? {
            events.push(Event::CelebrationTriggered {
                new_streak: celebration.new_streak,
                exercises_done: celebration.exercises_done,
                total_reps: celebration.total_reps,
                at: now,
            });
        }
        Ok(events)
    }

    /// Run the day-boundary check. When a new local calendar day has begun,
    /// every exercise is rolled over, all next-day targets are consumed, and
    /// `last_reset` moves to the start of the current day. The new state is
    /// committed in a single storage operation; on failure nothing moves.
    pub async fn check(&self, now: DateTime<Utc>) -> Result<Option<Event>, CoreError> {
        let stats = self.store.load_stats().await?;
        if !is_new_day(stats.last_reset, now) {
            return Ok(None);
        }
        let exercises = self.store.load_exercises().await?;
        let targets = self.store.next_day_targets().await?;
        let fresh = rollover(&exercises, &targets, &self.policy);

        let mut updated = stats;
        updated.last_reset = start_of_day(now);
        self.store.commit_rollover(&fresh, &updated).await?;

        Ok(Some(Event::DayRolledOver {
            exercises: fresh,
            cleared_targets: targets.len(),
            at: now,
        }))
    }

    /// Apply the missed-day streak rule, persisting only when it fires.
    pub async fn decay_streak(&self, now: DateTime<Utc>) -> Result<Option<Event>, CoreError> {
        let stats = self.store.load_stats().await?;
        let fresh = decay_streak_if_missed(&stats, now);
        if fresh.streak == stats.streak {
            return Ok(None);
        }
        self.store.save_stats(&fresh).await?;
        Ok(Some(Event::StreakReset {
            previous_streak: stats.streak,
            at: now,
        }))
    }

    /// Evaluate the once-per-day completion celebration, persisting the
    /// bumped streak and celebration time when it fires.
    pub async fn celebrate_if_complete(
        &self,
        now: DateTime<Utc>,
    ) -> Result<Option<Celebration>, CoreError> {
        let exercises = self.store.load_exercises().await?;
        let stats = self.store.load_stats().await?;
        let Some(celebration) = evaluate_completion(&exercises, &stats, now) else {
            return Ok(None);
        };
        let mut updated = stats;
        updated.streak = celebration.new_streak;
        updated.last_celebration = Some(now);
        self.store.save_stats(&updated).await?;
        Ok(Some(celebration))
    }

    /// Stats as the user should see them: the missed-day rule is applied
    /// (and persisted) before returning.
    pub async fn load_stats(&self, now: DateTime<Utc>) -> Result<UserStats, CoreError> {
        self.decay_streak(now).await?;
        Ok(self.store.load_stats().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::LocalStore;
    use chrono::{Duration, Local, TimeZone};

    fn local_dt(day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
        Local
            .with_ymd_and_hms(2024, 5, day, hour, minute, 0)
            .earliest()
            .unwrap()
            .with_timezone(&Utc)
    }

    fn make_test_exercise(id: &str, target: u32, current: u32) -> Exercise {
        let mut exercise = Exercise::new(id, target);
        exercise.id = id.to_string();
        exercise.current_reps = current;
        exercise
    }

    fn make_test_stats(last_reset: DateTime<Utc>) -> UserStats {
        UserStats {
            streak: 3,
            last_reset,
            last_celebration: None,
        }
    }

    #[test]
    fn empty_list_never_celebrates() {
        let stats = make_test_stats(Utc::now());
        assert!(evaluate_completion(&[], &stats, Utc::now()).is_none());
    }

    #[test]
    fn full_completion_celebrates_with_bumped_streak() {
        let exercises = vec![
            make_test_exercise("a", 10, 10),
            make_test_exercise("b", 5, 6),
        ];
        let stats = make_test_stats(local_dt(15, 0, 0));
        let celebration = evaluate_completion(&exercises, &stats, local_dt(15, 18, 0));
        assert_eq!(
            celebration,
            Some(Celebration {
                new_streak: 4,
                exercises_done: 2,
                total_reps: 16,
            })
        );
    }

    #[test]
    fn second_completion_on_same_date_is_silent() {
        let exercises = vec![make_test_exercise("a", 10, 10)];
        let mut stats = make_test_stats(local_dt(15, 0, 0));
        stats.last_celebration = Some(local_dt(15, 9, 0));
        assert!(evaluate_completion(&exercises, &stats, local_dt(15, 21, 0)).is_none());
    }

    #[test]
    fn completion_on_a_later_date_celebrates_again() {
        let exercises = vec![make_test_exercise("a", 10, 10)];
        let mut stats = make_test_stats(local_dt(15, 0, 0));
        stats.last_celebration = Some(local_dt(15, 9, 0));
        assert!(evaluate_completion(&exercises, &stats, local_dt(16, 8, 0)).is_some());
    }

    #[test]
    fn incomplete_list_does_not_celebrate() {
        let exercises = vec![
            make_test_exercise("a", 10, 10),
            make_test_exercise("b", 5, 4),
        ];
        let stats = make_test_stats(local_dt(15, 0, 0));
        assert!(evaluate_completion(&exercises, &stats, local_dt(15, 18, 0)).is_none());
    }

    #[test]
    fn two_missed_days_wipe_the_streak() {
        let stats = make_test_stats(local_dt(10, 0, 0));
        let fresh = decay_streak_if_missed(&stats, local_dt(12, 8, 0));
        assert_eq!(fresh.streak, 0);
    }

    #[test]
    fn one_elapsed_day_keeps_the_streak() {
        let stats = make_test_stats(local_dt(10, 0, 0));
        let fresh = decay_streak_if_missed(&stats, local_dt(11, 6, 0));
        assert_eq!(fresh.streak, 3);
        let same_day = decay_streak_if_missed(&stats, local_dt(10, 23, 0));
        assert_eq!(same_day.streak, 3);
    }

    async fn seeded_store(last_reset: DateTime<Utc>) -> Arc<LocalStore> {
        let store = Arc::new(LocalStore::open_memory().unwrap());
        store
            .save_exercise(&make_test_exercise("done", 10, 10))
            .await
            .unwrap();
        store
            .save_exercise(&make_test_exercise("short", 10, 4))
            .await
            .unwrap();
        store.save_stats(&make_test_stats(last_reset)).await.unwrap();
        store
    }

    #[tokio::test]
    async fn check_rolls_over_on_a_new_day() {
        let store = seeded_store(local_dt(15, 22, 0)).await;
        store.set_next_day_target("done", 15).await.unwrap();
        let manager = DailyCycleManager::new(store.clone());

        let now = local_dt(16, 0, 5);
        let event = manager.check(now).await.unwrap();
        assert!(matches!(event, Some(Event::DayRolledOver { cleared_targets: 1, .. })));

        let exercises = store.load_exercises().await.unwrap();
        let done = exercises.iter().find(|e| e.id == "done").unwrap();
        let short = exercises.iter().find(|e| e.id == "short").unwrap();
        assert_eq!((done.target_reps, done.current_reps), (15, 0));
        assert_eq!((short.target_reps, short.current_reps), (9, 0));

        assert!(store.next_day_targets().await.unwrap().is_empty());
        let stats = store.load_stats().await.unwrap();
        assert_eq!(stats.last_reset, start_of_day(now));
    }

    #[tokio::test]
    async fn check_is_a_noop_within_the_same_day() {
        let store = seeded_store(local_dt(15, 8, 0)).await;
        let manager = DailyCycleManager::new(store.clone());

        assert!(manager.check(local_dt(15, 23, 30)).await.unwrap().is_none());
        let exercises = store.load_exercises().await.unwrap();
        assert_eq!(exercises.iter().find(|e| e.id == "done").unwrap().current_reps, 10);
    }

    #[tokio::test]
    async fn run_decays_before_rolling_over() {
        let store = seeded_store(local_dt(12, 8, 0)).await;
        let manager = DailyCycleManager::new(store.clone());

        let events = manager.run(local_dt(15, 9, 0)).await.unwrap();
        assert_eq!(events.len(), 2);
        assert!(matches!(events[0], Event::StreakReset { previous_streak: 3, .. }));
        assert!(matches!(events[1], Event::DayRolledOver { .. }));
        assert_eq!(store.load_stats().await.unwrap().streak, 0);
    }

    #[tokio::test]
    async fn run_celebrates_when_everything_is_complete() {
        let store = Arc::new(LocalStore::open_memory().unwrap());
        store
            .save_exercise(&make_test_exercise("a", 5, 5))
            .await
            .unwrap();
        store
            .save_exercise(&make_test_exercise("b", 8, 9))
            .await
            .unwrap();
        store
            .save_stats(&make_test_stats(local_dt(15, 0, 0)))
            .await
            .unwrap();
        let manager = DailyCycleManager::new(store.clone());

        let events = manager.run(local_dt(15, 19, 0)).await.unwrap();
        assert_eq!(events.len(), 1);
        assert!(matches!(
            events[0],
            Event::CelebrationTriggered {
                new_streak: 4,
                exercises_done: 2,
                total_reps: 14,
                ..
            }
        ));
        assert_eq!(store.load_stats().await.unwrap().streak, 4);
    }

    #[tokio::test]
    async fn celebrate_persists_once_per_day() {
        let store = Arc::new(LocalStore::open_memory().unwrap());
        store
            .save_exercise(&make_test_exercise("a", 5, 5))
            .await
            .unwrap();
        store
            .save_stats(&make_test_stats(local_dt(15, 0, 0)))
            .await
            .unwrap();
        let manager = DailyCycleManager::new(store.clone());

        let now = local_dt(15, 12, 0);
        let first = manager.celebrate_if_complete(now).await.unwrap();
        assert_eq!(first.map(|c| c.new_streak), Some(4));

        let stats = store.load_stats().await.unwrap();
        assert_eq!(stats.streak, 4);
        assert_eq!(stats.last_celebration, Some(now));

        let second = manager
            .celebrate_if_complete(now + Duration::hours(2))
            .await
            .unwrap();
        assert!(second.is_none());
    }

    #[tokio::test]
    async fn load_stats_applies_the_missed_day_rule() {
        let store = seeded_store(local_dt(10, 8, 0)).await;
        let manager = DailyCycleManager::new(store.clone());

        let stats = manager.load_stats(local_dt(15, 8, 0)).await.unwrap();
        assert_eq!(stats.streak, 0);
        assert_eq!(store.load_stats().await.unwrap().streak, 0);
    }
}
