//! One-time migration from the local store to the remote backend.

use chrono::Utc;
use serde::Serialize;

use crate::error::StorageError;

use super::local::{LocalStore, KV_MIGRATED_AT};
use super::HabitStore;

/// Summary of a migration run.
#[derive(Debug, Clone, Serialize)]
pub struct MigrationReport {
    pub exercises_moved: usize,
    pub targets_moved: usize,
    pub stats_moved: bool,
    pub already_migrated: bool,
}

/// Copy all local data into the remote store, once.
///
/// A kv marker in the local store makes repeat invocations no-ops, so a
/// second device (or a re-run after switching backends) cannot double-seed
/// the remote account. The marker is written only after every copy
/// succeeded; a failed run can simply be retried.
pub async fn migrate_local_to_remote(
    local: &LocalStore,
    remote: &dyn HabitStore,
) -> Result<MigrationReport, StorageError> {
    if local.kv_get(KV_MIGRATED_AT)?.is_some() {
        return Ok(MigrationReport {
            exercises_moved: 0,
            targets_moved: 0,
            stats_moved: false,
            already_migrated: true,
        });
    }

    let exercises = local.load_exercises().await?;
    for exercise in &exercises {
        remote.save_exercise(exercise).await?;
    }

    let targets = local.next_day_targets().await?;
    for (id, target) in &targets {
        remote.set_next_day_target(id, *target).await?;
    }

    let stats = local.load_stats().await?;
    remote.save_stats(&stats).await?;

    local.kv_set(KV_MIGRATED_AT, &Utc::now().to_rfc3339())?;
    Ok(MigrationReport {
        exercises_moved: exercises.len(),
        targets_moved: targets.len(),
        stats_moved: true,
        already_migrated: false,
    })
}
