pub mod messages;

mod scheduler;
mod worker;

pub use scheduler::{ReminderConfig, ReminderScheduler, TickDecision};
pub use worker::{DataRequest, ReminderWorker, WorkerHandle};
