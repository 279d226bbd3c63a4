mod config;
mod identity;
pub mod local;
pub mod migrate;
pub mod remote;

pub use config::{
    Config, CycleConfig, NotificationsConfig, RemindersConfig, StorageBackend, StorageConfig,
};
pub use identity::Identity;
pub use local::LocalStore;
pub use migrate::{migrate_local_to_remote, MigrationReport};
pub use remote::RemoteStore;

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::{ConfigError, CoreError, StorageError};
use crate::model::{Exercise, NextDayTargets, UserStats};

/// Returns `~/.config/stronghabit[-dev]/` based on STRONGHABIT_ENV.
///
/// Set STRONGHABIT_ENV=dev to use development data directory.
///
/// # Errors
/// Returns an error if the home directory cannot be determined or if
/// creating the config directory fails.
pub fn data_dir() -> Result<PathBuf, Box<dyn std::error::Error>> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("STRONGHABIT_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("stronghabit-dev")
    } else {
        base_dir.join("stronghabit")
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// Persistence seam shared by the local and remote backends.
///
/// An implementation is scoped to one user at construction time; every
/// method operates on that user's rows. Missing stats rows surface as
/// defaults, never as errors.
#[async_trait]
pub trait HabitStore: Send + Sync {
    async fn load_exercises(&self) -> Result<Vec<Exercise>, StorageError>;

    /// Insert or fully replace one exercise.
    async fn save_exercise(&self, exercise: &Exercise) -> Result<(), StorageError>;

    /// Overwrite today's progress for one exercise.
    async fn update_progress(&self, id: &str, current_reps: u32) -> Result<(), StorageError>;

    async fn delete_exercise(&self, id: &str) -> Result<(), StorageError>;

    async fn load_stats(&self) -> Result<UserStats, StorageError>;

    async fn save_stats(&self, stats: &UserStats) -> Result<(), StorageError>;

    async fn next_day_targets(&self) -> Result<NextDayTargets, StorageError>;

    async fn set_next_day_target(&self, id: &str, target_reps: u32) -> Result<(), StorageError>;

    /// Persist a completed rollover: the new exercise set and stats land
    /// together and every next-day target is cleared. Backends make this as
    /// atomic as they can; on failure the caller keeps its pre-rollover
    /// state and retries on the next trigger.
    async fn commit_rollover(
        &self,
        exercises: &[Exercise],
        stats: &UserStats,
    ) -> Result<(), StorageError>;
}

/// Open the store selected by `config.storage.backend`.
///
/// The remote backend requires a stored identity (`stronghabit auth login`).
pub fn open_store(config: &Config) -> Result<Arc<dyn HabitStore>, CoreError> {
    match config.storage.backend {
        StorageBackend::Local => Ok(Arc::new(LocalStore::open()?)),
        StorageBackend::Remote => {
            let identity = Identity::load()?.ok_or(StorageError::NotAuthenticated)?;
            let base = url::Url::parse(&config.storage.remote_url).map_err(|e| {
                ConfigError::InvalidValue {
                    key: "storage.remote_url".to_string(),
                    message: e.to_string(),
                }
            })?;
            Ok(Arc::new(RemoteStore::new(base, identity)))
        }
    }
}
