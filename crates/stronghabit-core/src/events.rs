//! Event types emitted by the daily cycle and the reminder worker.
//!
//! Every user-visible state change produces an Event. The CLI prints them;
//! a host embedding the core can forward them to its own surface.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::Exercise;

/// A state change produced by the cycle manager or reminder worker.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    /// A day boundary was crossed and every exercise was reset.
    DayRolledOver {
        exercises: Vec<Exercise>,
        cleared_targets: usize,
        at: DateTime<Utc>,
    },
    /// A fully missed day wiped the streak.
    StreakReset {
        previous_streak: u32,
        at: DateTime<Utc>,
    },
    /// All exercises were completed for the first time today.
    CelebrationTriggered {
        new_streak: u32,
        exercises_done: usize,
        total_reps: u32,
        at: DateTime<Utc>,
    },
    /// A reminder notification went out.
    ReminderSent {
        incomplete_count: u32,
        message: String,
        at: DateTime<Utc>,
    },
    /// The external indicator was set to a new count (zero clears it).
    IndicatorUpdated {
        count: u32,
        at: DateTime<Utc>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_tag_with_variant_name() {
        let event = Event::StreakReset {
            previous_streak: 4,
            at: Utc::now(),
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"type\":\"StreakReset\""));
        assert!(json.contains("\"previous_streak\":4"));
    }
}
