//! # StrongHabit Core Library
//!
//! This library provides the core business logic for the StrongHabit daily
//! exercise tracker. It implements a CLI-first philosophy where all operations
//! are available via a standalone CLI binary, with any GUI being a thin layer
//! over the same core library.
//!
//! ## Architecture
//!
//! - **Daily Cycle**: A calendar-date-based rollover engine that requires the
//!   caller to periodically invoke `run()` for day-boundary processing
//! - **Reminders**: A randomized-interval scheduler plus a detached worker that
//!   fetches exercise state over a message channel
//! - **Storage**: SQLite-based exercise storage, a hosted HTTP backend, and
//!   TOML-based configuration
//! - **Notifications**: Pluggable delivery with tag-based replacement and an
//!   incomplete-count indicator
//!
//! ## Key Components
//!
//! - [`DailyCycleManager`]: Day rollover, streak upkeep, and celebrations
//! - [`ReminderScheduler`]: Decides when a nudge is due
//! - [`LocalStore`] / [`RemoteStore`]: Exercise and stats persistence
//! - [`Config`]: Application configuration management
//! - [`Notifier`]: Trait for notification delivery backends

pub mod channel;
pub mod cycle;
pub mod error;
pub mod events;
pub mod model;
pub mod notify;
pub mod reminder;
pub mod storage;

pub use channel::ChannelMessage;
pub use cycle::{
    decay_streak_if_missed, evaluate_completion, full_days_between, is_new_day, rollover,
    start_of_day, Celebration, DailyCycleManager, RolloverPolicy,
};
pub use error::{
    ChannelError, ConfigError, CoreError, NotifyError, Result, StorageError,
};
pub use events::Event;
pub use model::{Exercise, NextDayTargets, UserStats};
pub use notify::{ConsoleNotifier, Notification, Notifier, PermissionStatus};
pub use reminder::{
    DataRequest, ReminderConfig, ReminderScheduler, ReminderWorker, TickDecision, WorkerHandle,
};
pub use storage::{
    open_store, Config, CycleConfig, HabitStore, Identity, LocalStore, MigrationReport,
    NotificationsConfig, RemindersConfig, RemoteStore, StorageBackend, StorageConfig,
};
