//! SQLite-based exercise and stats storage.
//!
//! Provides persistent storage for:
//! - Exercises and daily progress
//! - Streak stats and rollover bookkeeping
//! - Next-day target requests
//! - Key-value store for device-local state

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};

use crate::error::StorageError;
use crate::model::{Exercise, NextDayTargets, UserStats};

use super::{data_dir, HabitStore};

/// kv key recording a completed migration to the remote backend.
pub const KV_MIGRATED_AT: &str = "migrated_to_remote_at";
/// kv key persisting the reminder worker's last delivery time.
pub const KV_LAST_REMINDER: &str = "last_notification_time";

/// Parse datetime from RFC3339 string with fallback to current time
fn parse_datetime_fallback(dt_str: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(dt_str)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| {
            tracing::warn!(value = dt_str, "malformed timestamp in store, using now");
            Utc::now()
        })
}

/// Build an Exercise from a database row
fn row_to_exercise(row: &rusqlite::Row) -> Result<Exercise, rusqlite::Error> {
    let created_at_str: String = row.get(4)?;
    Ok(Exercise {
        id: row.get(0)?,
        name: row.get(1)?,
        target_reps: row.get(2)?,
        current_reps: row.get(3)?,
        created_at: parse_datetime_fallback(&created_at_str),
    })
}

/// SQLite store for exercises, stats and device-local state.
///
/// The connection sits behind a mutex so one store can be shared across
/// daemon tasks.
pub struct LocalStore {
    conn: Mutex<Connection>,
}

impl LocalStore {
    /// Open the database at `~/.config/stronghabit/stronghabit.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self, StorageError> {
        let dir = data_dir().map_err(|e| StorageError::DataDir(e.to_string()))?;
        Self::open_at(&dir.join("stronghabit.db"))
    }

    /// Open the database at a specific path.
    pub fn open_at(path: &Path) -> Result<Self, StorageError> {
        let conn = Connection::open(path).map_err(|source| StorageError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.migrate()?;
        Ok(store)
    }

    /// Open an in-memory database (for tests).
    #[cfg(test)]
    pub fn open_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory()?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.migrate()?;
        Ok(store)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, StorageError> {
        self.conn.lock().map_err(|_| StorageError::Locked)
    }

    fn migrate(&self) -> Result<(), StorageError> {
        let conn = self.lock()?;
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL)",
        )?;
        let version: i64 = conn
            .query_row("SELECT COALESCE(MAX(version), 0) FROM schema_version", [], |row| {
                row.get(0)
            })
            .map_err(|e| StorageError::MigrationFailed(e.to_string()))?;

        if version < 1 {
            conn.execute_batch(
                "CREATE TABLE IF NOT EXISTS exercises (
                    id           TEXT PRIMARY KEY,
                    name         TEXT NOT NULL,
                    target_reps  INTEGER NOT NULL,
                    current_reps INTEGER NOT NULL DEFAULT 0,
                    created_at   TEXT NOT NULL
                );

                CREATE TABLE IF NOT EXISTS user_stats (
                    id               INTEGER PRIMARY KEY CHECK (id = 1),
                    streak           INTEGER NOT NULL DEFAULT 0,
                    last_reset       TEXT NOT NULL,
                    last_celebration TEXT
                );

                CREATE TABLE IF NOT EXISTS next_day_targets (
                    exercise_id TEXT PRIMARY KEY,
                    target_reps INTEGER NOT NULL
                );

                CREATE TABLE IF NOT EXISTS kv (
                    key   TEXT PRIMARY KEY,
                    value TEXT NOT NULL
                );

                -- Create index for the insertion-ordered listing
                CREATE INDEX IF NOT EXISTS idx_exercises_created_at ON exercises(created_at);

                INSERT INTO schema_version (version) VALUES (1);",
            )
            .map_err(|e| StorageError::MigrationFailed(e.to_string()))?;
        }
        Ok(())
    }

    /// Get a value from the kv store.
    pub fn kv_get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare("SELECT value FROM kv WHERE key = ?1")?;
        let result = stmt.query_row(params![key], |row| row.get::<_, String>(0));
        match result {
            Ok(v) => Ok(Some(v)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Set a value in the kv store.
    pub fn kv_set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }
}

#[async_trait]
impl HabitStore for LocalStore {
    async fn load_exercises(&self) -> Result<Vec<Exercise>, StorageError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT id, name, target_reps, current_reps, created_at
             FROM exercises ORDER BY created_at ASC, id ASC",
        )?;
        let rows = stmt.query_map([], row_to_exercise)?;
        let mut exercises = Vec::new();
        for row in rows {
            exercises.push(row?);
        }
        Ok(exercises)
    }

    async fn save_exercise(&self, exercise: &Exercise) -> Result<(), StorageError> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT OR REPLACE INTO exercises (id, name, target_reps, current_reps, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                exercise.id,
                exercise.name,
                exercise.target_reps,
                exercise.current_reps,
                exercise.created_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    async fn update_progress(&self, id: &str, current_reps: u32) -> Result<(), StorageError> {
        let conn = self.lock()?;
        let changed = conn.execute(
            "UPDATE exercises SET current_reps = ?2 WHERE id = ?1",
            params![id, current_reps],
        )?;
        if changed == 0 {
            return Err(StorageError::QueryFailed(format!("no exercise with id {id}")));
        }
        Ok(())
    }

    async fn delete_exercise(&self, id: &str) -> Result<(), StorageError> {
        let conn = self.lock()?;
        conn.execute("DELETE FROM exercises WHERE id = ?1", params![id])?;
        conn.execute(
            "DELETE FROM next_day_targets WHERE exercise_id = ?1",
            params![id],
        )?;
        Ok(())
    }

    async fn load_stats(&self) -> Result<UserStats, StorageError> {
        let conn = self.lock()?;
        let result = conn.query_row(
            "SELECT streak, last_reset, last_celebration FROM user_stats WHERE id = 1",
            [],
            |row| {
                let last_reset: String = row.get(1)?;
                let last_celebration: Option<String> = row.get(2)?;
                Ok(UserStats {
                    streak: row.get(0)?,
                    last_reset: parse_datetime_fallback(&last_reset),
                    last_celebration: last_celebration
                        .map(|value| parse_datetime_fallback(&value)),
                })
            },
        );
        match result {
            Ok(stats) => Ok(stats),
            // A user with no stored record starts from defaults.
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(UserStats::new(Utc::now())),
            Err(e) => Err(e.into()),
        }
    }

    async fn save_stats(&self, stats: &UserStats) -> Result<(), StorageError> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT OR REPLACE INTO user_stats (id, streak, last_reset, last_celebration)
             VALUES (1, ?1, ?2, ?3)",
            params![
                stats.streak,
                stats.last_reset.to_rfc3339(),
                stats.last_celebration.map(|at| at.to_rfc3339()),
            ],
        )?;
        Ok(())
    }

    async fn next_day_targets(&self) -> Result<NextDayTargets, StorageError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare("SELECT exercise_id, target_reps FROM next_day_targets")?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, u32>(1)?))
        })?;
        let mut targets = NextDayTargets::new();
        for row in rows {
            let (id, target) = row?;
            targets.insert(id, target);
        }
        Ok(targets)
    }

    async fn set_next_day_target(&self, id: &str, target_reps: u32) -> Result<(), StorageError> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT OR REPLACE INTO next_day_targets (exercise_id, target_reps) VALUES (?1, ?2)",
            params![id, target_reps],
        )?;
        Ok(())
    }

    async fn commit_rollover(
        &self,
        exercises: &[Exercise],
        stats: &UserStats,
    ) -> Result<(), StorageError> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        for exercise in exercises {
            tx.execute(
                "INSERT OR REPLACE INTO exercises (id, name, target_reps, current_reps, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    exercise.id,
                    exercise.name,
                    exercise.target_reps,
                    exercise.current_reps,
                    exercise.created_at.to_rfc3339(),
                ],
            )?;
        }
        tx.execute("DELETE FROM next_day_targets", [])?;
        tx.execute(
            "INSERT OR REPLACE INTO user_stats (id, streak, last_reset, last_celebration)
             VALUES (1, ?1, ?2, ?3)",
            params![
                stats.streak,
                stats.last_reset.to_rfc3339(),
                stats.last_celebration.map(|at| at.to_rfc3339()),
            ],
        )?;
        tx.commit()?;
        Ok(())
    }
}
