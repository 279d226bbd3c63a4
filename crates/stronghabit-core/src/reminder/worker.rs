//! Detached reminder worker.
//!
//! Hosts a [`ReminderScheduler`] in its own tokio task. The worker holds no
//! storage handle: each tick asks the foreground context for the current
//! exercise set over the message channel, and a missing or late response
//! degrades that tick to a no-op. Control messages (start, stop, last
//! notification updates) arrive on the same channel type.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use crate::channel::ChannelMessage;
use crate::error::ChannelError;
use crate::events::Event;
use crate::model::Exercise;
use crate::notify::{Notification, Notifier};

use super::messages;
use super::scheduler::{ReminderConfig, ReminderScheduler, TickDecision};

/// How long a tick waits for the foreground to answer a data request.
const DATA_REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// A data request paired with its reply channel.
#[derive(Debug)]
pub struct DataRequest {
    pub request: ChannelMessage,
    pub respond_to: oneshot::Sender<ChannelMessage>,
}

/// Handle to a running reminder worker.
pub struct WorkerHandle {
    control: mpsc::Sender<ChannelMessage>,
    /// Events the worker emitted (reminders sent, indicator changes).
    pub events: mpsc::Receiver<Event>,
    task: JoinHandle<()>,
}

impl WorkerHandle {
    /// Send a control message to the worker.
    pub async fn send(&self, message: ChannelMessage) -> Result<(), ChannelError> {
        self.control
            .send(message)
            .await
            .map_err(|_| ChannelError::Closed)
    }

    /// Stop the worker task.
    pub fn stop(self) {
        self.task.abort();
    }
}

/// The detached execution context owning the reminder scheduler.
pub struct ReminderWorker {
    scheduler: ReminderScheduler,
    poll_interval: Duration,
    data_requests: mpsc::Sender<DataRequest>,
    notifier: Arc<dyn Notifier>,
    running: bool,
}

impl ReminderWorker {
    pub fn new(
        config: ReminderConfig,
        poll_interval: Duration,
        data_requests: mpsc::Sender<DataRequest>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            scheduler: ReminderScheduler::with_config(config),
            poll_interval,
            data_requests,
            notifier,
            running: false,
        }
    }

    /// Seed the scheduler with a delivery time persisted by a previous run.
    pub fn restore_last_notification(&mut self, at: DateTime<Utc>) {
        self.scheduler.set_last_notification(at);
    }

    /// Spawn the worker on the current runtime.
    ///
    /// The worker starts suspended; send `StartSmartReminders` through the
    /// handle to begin ticking.
    pub fn spawn(mut self) -> WorkerHandle {
        let (control_tx, mut control_rx) = mpsc::channel(16);
        let (event_tx, event_rx) = mpsc::channel(64);

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(self.poll_interval);
            // The first interval tick completes immediately; skip it so the
            // worker does not remind the instant it starts.
            ticker.tick().await;
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        if !self.running {
                            continue;
                        }
                        if let Some(event) = self.run_tick(Utc::now()).await {
                            let _ = event_tx.send(event).await;
                        }
                    }
                    message = control_rx.recv() => {
                        match message {
                            Some(message) => self.handle_control(message),
                            None => break,
                        }
                    }
                }
            }
        });

        WorkerHandle {
            control: control_tx,
            events: event_rx,
            task,
        }
    }

    fn handle_control(&mut self, message: ChannelMessage) {
        match message {
            ChannelMessage::StartSmartReminders {
                start_hour,
                end_hour,
            } => {
                self.scheduler.configure(start_hour, end_hour);
                self.running = true;
            }
            ChannelMessage::StopSmartReminders => {
                self.running = false;
            }
            ChannelMessage::UpdateLastNotificationTime { timestamp } => {
                self.scheduler.set_last_notification(timestamp);
            }
            other => {
                tracing::debug!(?other, "ignoring unexpected control message");
            }
        }
    }

    /// One worker tick: fetch data, decide, deliver.
    ///
    /// Every failure path is non-fatal; the worker stays alive for the next
    /// tick. Returns the event the tick produced, if any.
    async fn run_tick(&mut self, now: DateTime<Utc>) -> Option<Event> {
        let exercises = match self.fetch_exercises().await {
            Ok(exercises) => exercises,
            Err(error) => {
                tracing::debug!(%error, "no exercise data this tick");
                return None;
            }
        };
        match self.scheduler.tick(now, &exercises) {
            TickDecision::Remind {
                message,
                incomplete,
            } => {
                let note = Notification::new(
                    messages::REMINDER_TITLE,
                    &message,
                    messages::REMINDER_TAG,
                )
                .with_metadata("incomplete_count", incomplete.into());
                if let Err(error) = self.notifier.deliver(&note) {
                    tracing::warn!(%error, "reminder delivery failed");
                }
                Some(Event::ReminderSent {
                    incomplete_count: incomplete,
                    message,
                    at: now,
                })
            }
            TickDecision::UpdateIndicator { incomplete } => {
                if let Err(error) = self.notifier.set_indicator_count(incomplete) {
                    tracing::warn!(%error, "indicator update failed");
                }
                Some(Event::IndicatorUpdated {
                    count: incomplete,
                    at: now,
                })
            }
            TickDecision::ClearIndicator => {
                if let Err(error) = self.notifier.set_indicator_count(0) {
                    tracing::warn!(%error, "indicator clear failed");
                }
                Some(Event::IndicatorUpdated { count: 0, at: now })
            }
            TickDecision::Idle => None,
        }
    }

    async fn fetch_exercises(&self) -> Result<Vec<Exercise>, ChannelError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.data_requests
            .send(DataRequest {
                request: ChannelMessage::GetExerciseData,
                respond_to: reply_tx,
            })
            .await
            .map_err(|_| ChannelError::Closed)?;

        let response = tokio::time::timeout(DATA_REQUEST_TIMEOUT, reply_rx)
            .await
            .map_err(ChannelError::from)?
            .map_err(|_| ChannelError::Closed)?;

        match response {
            ChannelMessage::ExerciseDataResponse { exercises } => Ok(exercises),
            other => {
                tracing::debug!(?other, "unexpected data response");
                Ok(Vec::new())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::ConsoleNotifier;
    use chrono::{Local, TimeZone};

    fn local_dt(day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
        Local
            .with_ymd_and_hms(2024, 5, day, hour, minute, 0)
            .earliest()
            .unwrap()
            .with_timezone(&Utc)
    }

    fn make_test_exercise(target: u32, current: u32) -> Exercise {
        let mut exercise = Exercise::new("Push-ups", target);
        exercise.current_reps = current;
        exercise
    }

    fn seeded_config() -> ReminderConfig {
        ReminderConfig {
            seed: Some(42),
            ..Default::default()
        }
    }

    fn started_worker(
        notifier: Arc<ConsoleNotifier>,
    ) -> (ReminderWorker, mpsc::Receiver<DataRequest>) {
        let (data_tx, data_rx) = mpsc::channel(4);
        let mut worker = ReminderWorker::new(
            seeded_config(),
            Duration::from_secs(900),
            data_tx,
            notifier,
        );
        worker.handle_control(ChannelMessage::StartSmartReminders {
            start_hour: 9,
            end_hour: 21,
        });
        (worker, data_rx)
    }

    fn answer_requests(mut data_rx: mpsc::Receiver<DataRequest>, exercises: Vec<Exercise>) {
        tokio::spawn(async move {
            while let Some(request) = data_rx.recv().await {
                assert_eq!(request.request, ChannelMessage::GetExerciseData);
                let _ = request
                    .respond_to
                    .send(ChannelMessage::ExerciseDataResponse {
                        exercises: exercises.clone(),
                    });
            }
        });
    }

    #[tokio::test]
    async fn tick_fetches_data_and_delivers_a_reminder() {
        let notifier = Arc::new(ConsoleNotifier::new());
        let (mut worker, data_rx) = started_worker(notifier.clone());
        answer_requests(data_rx, vec![make_test_exercise(10, 2)]);

        let event = worker.run_tick(local_dt(15, 12, 0)).await;
        assert!(matches!(event, Some(Event::ReminderSent { incomplete_count: 1, .. })));

        let pending = notifier.pending_by_tag(messages::REMINDER_TAG);
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].title, messages::REMINDER_TITLE);
        assert_eq!(
            pending[0].metadata.get("incomplete_count"),
            Some(&serde_json::Value::from(1u32))
        );
    }

    #[tokio::test]
    async fn missing_responder_degrades_the_tick_to_a_noop() {
        let notifier = Arc::new(ConsoleNotifier::new());
        let (mut worker, data_rx) = started_worker(notifier.clone());
        // Nobody answers: dropping the receiver closes the request channel.
        drop(data_rx);

        let event = worker.run_tick(local_dt(15, 12, 0)).await;
        assert!(event.is_none());
        assert!(notifier.pending_by_tag(messages::REMINDER_TAG).is_empty());
    }

    #[tokio::test]
    async fn all_complete_clears_the_indicator() {
        let notifier = Arc::new(ConsoleNotifier::new());
        notifier.set_indicator_count(3).unwrap();
        let (mut worker, data_rx) = started_worker(notifier.clone());
        answer_requests(data_rx, vec![make_test_exercise(5, 5)]);

        let event = worker.run_tick(local_dt(15, 12, 0)).await;
        assert!(matches!(event, Some(Event::IndicatorUpdated { count: 0, .. })));
        assert_eq!(notifier.indicator_count(), 0);
    }

    #[tokio::test]
    async fn control_messages_drive_the_scheduler() {
        let notifier = Arc::new(ConsoleNotifier::new());
        let (mut worker, data_rx) = started_worker(notifier.clone());
        answer_requests(data_rx, vec![make_test_exercise(10, 2)]);

        // A reminder delivered elsewhere 10 minutes ago suppresses this tick.
        let now = local_dt(15, 12, 0);
        worker.handle_control(ChannelMessage::UpdateLastNotificationTime {
            timestamp: now - chrono::Duration::minutes(10),
        });
        let event = worker.run_tick(now).await;
        assert!(matches!(event, Some(Event::IndicatorUpdated { count: 1, .. })));

        worker.handle_control(ChannelMessage::StopSmartReminders);
        assert!(!worker.running);
    }

    #[tokio::test]
    async fn spawned_worker_honors_start_and_stop() {
        let notifier = Arc::new(ConsoleNotifier::new());
        let (data_tx, data_rx) = mpsc::channel(4);
        answer_requests(data_rx, vec![make_test_exercise(10, 0)]);

        let worker = ReminderWorker::new(
            seeded_config(),
            Duration::from_secs(900),
            data_tx,
            notifier,
        );
        let handle = worker.spawn();
        handle
            .send(ChannelMessage::StartSmartReminders {
                start_hour: 0,
                end_hour: 24,
            })
            .await
            .unwrap();
        handle.send(ChannelMessage::StopSmartReminders).await.unwrap();
        handle.stop();
    }
}
