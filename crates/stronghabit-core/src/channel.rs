//! Message protocol between the reminder worker and the foreground context.
//!
//! The worker runs detached and has no storage handle of its own, so
//! exercise reads go through an explicit request/response exchange rather
//! than a shared-memory read. The same tagged payloads double as the wire
//! format when the two ends live in different processes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::Exercise;

/// Messages exchanged over the worker/foreground channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChannelMessage {
    /// Worker to foreground: send me the current exercise set.
    GetExerciseData,
    /// Foreground to worker: the current exercise set.
    ExerciseDataResponse { exercises: Vec<Exercise> },
    /// Host to worker: begin reminder ticks within the given window.
    StartSmartReminders { start_hour: u8, end_hour: u8 },
    /// Host to worker: suspend reminder ticks.
    StopSmartReminders,
    /// Host to worker: a reminder was delivered elsewhere at this time.
    UpdateLastNotificationTime { timestamp: DateTime<Utc> },
}
