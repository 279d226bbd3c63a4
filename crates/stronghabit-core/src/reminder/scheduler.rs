//! Tick-driven reminder scheduling with randomized spacing.
//!
//! The scheduler owns all of its state: the active-hours window, the time of
//! the last reminder, and the RNG the spacing draws come from. A host calls
//! [`ReminderScheduler::tick`] on a periodic timer with an explicit `now` and
//! the current exercise set; the scheduler answers with a [`TickDecision`]
//! and leaves delivery to the caller.

use chrono::{DateTime, Duration, Local, Timelike, Utc};
use rand::prelude::*;
use rand_pcg::Mcg128Xsl64;
use serde::{Deserialize, Serialize};

use crate::model::{incomplete_count, Exercise};

use super::messages;

/// Spacing and active-hours settings for reminders.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReminderConfig {
    /// First local hour (inclusive) reminders may fire.
    pub start_hour: u8,
    /// Local hour (exclusive) after which reminders stop.
    pub end_hour: u8,
    /// Minimum minutes between two reminders.
    pub min_interval_mins: u32,
    /// Maximum minutes between two reminders.
    pub max_interval_mins: u32,
    /// Random seed for reproducibility (None = random)
    pub seed: Option<u64>,
}

impl Default for ReminderConfig {
    fn default() -> Self {
        Self {
            start_hour: 9,
            end_hour: 21,
            min_interval_mins: 60,
            max_interval_mins: 90,
            seed: None,
        }
    }
}

/// What a single scheduler tick decided.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickDecision {
    /// Outside the active window, or nothing to remind about.
    Idle,
    /// No reminder due yet; the external indicator should show this count.
    UpdateIndicator { incomplete: u32 },
    /// Everything is complete; any indicator should be cleared.
    ClearIndicator,
    /// Emit a reminder carrying this message and count.
    Remind { message: String, incomplete: u32 },
}

/// Decides, on each tick, whether a reminder is due.
pub struct ReminderScheduler {
    config: ReminderConfig,
    last_notification: Option<DateTime<Utc>>,
    rng: Mcg128Xsl64,
}

impl ReminderScheduler {
    pub fn new() -> Self {
        Self::with_config(ReminderConfig::default())
    }

    pub fn with_config(config: ReminderConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => Mcg128Xsl64::seed_from_u64(seed),
            None => Mcg128Xsl64::from_entropy(),
        };
        Self {
            config,
            last_notification: None,
            rng,
        }
    }

    /// Replace the active-hours window without touching spacing state.
    pub fn configure(&mut self, start_hour: u8, end_hour: u8) {
        self.config.start_hour = start_hour;
        self.config.end_hour = end_hour;
    }

    /// Record when the most recent reminder went out (possibly on another
    /// surface).
    pub fn set_last_notification(&mut self, at: DateTime<Utc>) {
        self.last_notification = Some(at);
    }

    pub fn last_notification(&self) -> Option<DateTime<Utc>> {
        self.last_notification
    }

    /// True iff `now`'s local hour falls inside the active window.
    /// A window with `start_hour > end_hour` wraps past midnight.
    pub fn in_active_hours(&self, now: DateTime<Utc>) -> bool {
        let hour = now.with_timezone(&Local).hour();
        let start = u32::from(self.config.start_hour);
        let end = u32::from(self.config.end_hour);
        if start > end {
            hour >= start || hour < end
        } else {
            hour >= start && hour < end
        }
    }

    /// Run one reminder decision against the current exercise set.
    ///
    /// Emits immediately when no reminder has ever been sent; afterwards a
    /// fresh threshold is drawn from the spacing window on every tick, so
    /// gaps shorter than the minimum never remind and gaps longer than the
    /// maximum always do.
    pub fn tick(&mut self, now: DateTime<Utc>, exercises: &[Exercise]) -> TickDecision {
        if !self.in_active_hours(now) {
            return TickDecision::Idle;
        }
        if exercises.is_empty() {
            return TickDecision::Idle;
        }
        let incomplete = incomplete_count(exercises) as u32;
        if incomplete == 0 {
            return TickDecision::ClearIndicator;
        }
        if let Some(last) = self.last_notification {
            if now - last < self.random_threshold() {
                return TickDecision::UpdateIndicator { incomplete };
            }
        }
        let message = messages::reminder_message(&mut self.rng, incomplete);
        self.last_notification = Some(now);
        TickDecision::Remind {
            message,
            incomplete,
        }
    }

    /// Draw a spacing threshold uniformly from the configured window.
    fn random_threshold(&mut self) -> Duration {
        let lo = i64::from(self.config.min_interval_mins.min(self.config.max_interval_mins)) * 60;
        let hi = i64::from(self.config.min_interval_mins.max(self.config.max_interval_mins)) * 60;
        Duration::seconds(self.rng.gen_range(lo..=hi))
    }
}

impl Default for ReminderScheduler {
    fn default() -> Self {
        Self::new()
    }
}
