//! Long-running host for the daily cycle loop and the reminder worker.
//!
//! `stronghabit daemon run` owns the two periodic loops: a cycle tick that
//! drives [`DailyCycleManager::run`] plus the completion celebration, and a
//! detached [`ReminderWorker`] whose exercise-data requests are answered here
//! from the configured store. The loops share no state beyond the store.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use clap::Subcommand;
use tokio::sync::mpsc;

use stronghabit_core::model::incomplete_count;
use stronghabit_core::reminder::{messages, DataRequest, ReminderWorker};
use stronghabit_core::storage::local::KV_LAST_REMINDER;
use stronghabit_core::storage::open_store;
use stronghabit_core::{
    Celebration, ChannelMessage, Config, ConsoleNotifier, DailyCycleManager, Event, LocalStore,
    Notification, Notifier, PermissionStatus,
};

#[derive(Subcommand)]
pub enum DaemonAction {
    /// Run the daemon in the foreground
    Run,
}

pub async fn run(action: DaemonAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        DaemonAction::Run => run_daemon().await,
    }
}

async fn run_daemon() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = Config::load_or_default();
    let store = open_store(&config)?;
    // Device-local operational state (reminder bookkeeping, migration marker)
    // lives in the local database whichever backend holds the exercises.
    let device = Arc::new(LocalStore::open()?);

    let notifier = if config.notifications.enabled {
        Arc::new(ConsoleNotifier::new())
    } else {
        Arc::new(ConsoleNotifier::disabled())
    };
    let status = notifier.request_permission();
    if status != PermissionStatus::Granted {
        tracing::warn!(?status, "notification emission disabled");
    }

    let (data_tx, mut data_rx) = mpsc::channel::<DataRequest>(16);
    let mut worker = ReminderWorker::new(
        config.reminder_config(),
        Duration::from_secs(config.reminders.poll_interval_mins * 60),
        data_tx,
        notifier.clone(),
    );
    if let Some(at) = device
        .kv_get(KV_LAST_REMINDER)?
        .and_then(|raw| DateTime::parse_from_rfc3339(&raw).ok())
    {
        worker.restore_last_notification(at.with_timezone(&Utc));
    }

    let mut handle = worker.spawn();
    if config.reminders.enabled {
        handle
            .send(ChannelMessage::StartSmartReminders {
                start_hour: config.reminders.start_hour,
                end_hour: config.reminders.end_hour,
            })
            .await?;
    }

    // Foreground responder: answers the worker's data requests from the store.
    let responder_store = store.clone();
    tokio::spawn(async move {
        while let Some(request) = data_rx.recv().await {
            match request.request {
                ChannelMessage::GetExerciseData => {
                    let exercises = match responder_store.load_exercises().await {
                        Ok(exercises) => exercises,
                        Err(error) => {
                            tracing::warn!(%error, "exercise load failed, responding empty");
                            Vec::new()
                        }
                    };
                    let _ = request
                        .respond_to
                        .send(ChannelMessage::ExerciseDataResponse { exercises });
                }
                other => tracing::debug!(?other, "unexpected data request"),
            }
        }
    });

    let manager = DailyCycleManager::new(store);
    let mut cycle_tick =
        tokio::time::interval(Duration::from_secs(config.cycle.check_interval_secs));
    tracing::info!(
        backend = ?config.storage.backend,
        check_interval_secs = config.cycle.check_interval_secs,
        "daemon started"
    );

    loop {
        tokio::select! {
            _ = cycle_tick.tick() => {
                match manager.run(Utc::now()).await {
                    Ok(events) => announce_cycle_events(&config, notifier.as_ref(), &events),
                    Err(error) => tracing::warn!(%error, "cycle check failed"),
                }
            }
            event = handle.events.recv() => {
                match event {
                    Some(event) => record_worker_event(&device, &event),
                    None => {
                        tracing::warn!("reminder worker stopped");
                        break;
                    }
                }
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("shutdown requested");
                break;
            }
        }
    }

    handle.stop();
    Ok(())
}

fn announce_cycle_events(config: &Config, notifier: &dyn Notifier, events: &[Event]) {
    for event in events {
        match event {
            Event::DayRolledOver {
                exercises,
                cleared_targets,
                ..
            } => {
                tracing::info!(
                    exercises = exercises.len(),
                    cleared_targets,
                    "day rolled over"
                );
                if config.notifications.badge {
                    let count = incomplete_count(exercises) as u32;
                    if let Err(error) = notifier.set_indicator_count(count) {
                        tracing::warn!(%error, "indicator update failed");
                    }
                }
            }
            Event::StreakReset {
                previous_streak, ..
            } => {
                tracing::info!(previous_streak, "streak reset after missed days");
                let note = Notification::new(
                    messages::ENCOURAGEMENT_TITLE,
                    messages::encouragement_message(&mut rand::thread_rng()),
                    messages::ENCOURAGEMENT_TAG,
                );
                if let Err(error) = notifier.deliver(&note) {
                    tracing::warn!(%error, "encouragement delivery failed");
                }
            }
            Event::CelebrationTriggered {
                new_streak,
                exercises_done,
                total_reps,
                ..
            } => {
                let celebration = Celebration {
                    new_streak: *new_streak,
                    exercises_done: *exercises_done,
                    total_reps: *total_reps,
                };
                announce_celebration(config, notifier, &celebration);
            }
            _ => {}
        }
    }
}

fn announce_celebration(config: &Config, notifier: &dyn Notifier, celebration: &Celebration) {
    tracing::info!(streak = celebration.new_streak, "all exercises complete");
    if config.notifications.celebrations {
        let note = Notification::new(
            messages::COMPLETION_TITLE,
            messages::completion_message(celebration.exercises_done, celebration.total_reps),
            messages::COMPLETION_TAG,
        );
        if let Err(error) = notifier.deliver(&note) {
            tracing::warn!(%error, "celebration delivery failed");
        }
    }
    if config.notifications.milestones {
        if let Some(milestone) = messages::milestone_for(celebration.new_streak) {
            let note = Notification::new(
                messages::milestone_title(&milestone),
                milestone.message,
                messages::MILESTONE_TAG,
            );
            if let Err(error) = notifier.deliver(&note) {
                tracing::warn!(%error, "milestone delivery failed");
            }
        }
    }
    if config.notifications.badge {
        if let Err(error) = notifier.set_indicator_count(0) {
            tracing::warn!(%error, "indicator clear failed");
        }
    }
}

fn record_worker_event(device: &LocalStore, event: &Event) {
    match event {
        Event::ReminderSent {
            incomplete_count: count,
            at,
            ..
        } => {
            tracing::info!(incomplete = count, "reminder sent");
            if let Err(error) = device.kv_set(KV_LAST_REMINDER, &at.to_rfc3339()) {
                tracing::warn!(%error, "failed to persist last notification time");
            }
        }
        Event::IndicatorUpdated { count, .. } => {
            tracing::debug!(count, "indicator updated");
        }
        _ => {}
    }
}
