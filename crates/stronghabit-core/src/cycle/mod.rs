mod day;
mod manager;
mod rollover;

pub use day::{full_days_between, is_new_day, start_of_day};
pub use manager::{decay_streak_if_missed, evaluate_completion, Celebration, DailyCycleManager};
pub use rollover::{rollover, RolloverPolicy};
