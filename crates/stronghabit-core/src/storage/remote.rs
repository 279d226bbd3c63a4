//! HTTP-backed remote store.
//!
//! Speaks a PostgREST-style REST dialect: one endpoint per table, rows
//! filtered with `column=eq.value` query parameters, upserts through
//! `Prefer: resolution=merge-duplicates`. Every row is partitioned by the
//! authenticated user's id, so one hosted backend serves many users.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::StorageError;
use crate::model::{Exercise, NextDayTargets, UserStats};

use super::{HabitStore, Identity};

/// REST row shape for the exercises table.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ExerciseRow {
    id: String,
    user_id: String,
    name: String,
    target_reps: u32,
    current_reps: u32,
    created_at: DateTime<Utc>,
}

impl ExerciseRow {
    fn from_exercise(exercise: &Exercise, user_id: &str) -> Self {
        Self {
            id: exercise.id.clone(),
            user_id: user_id.to_string(),
            name: exercise.name.clone(),
            target_reps: exercise.target_reps,
            current_reps: exercise.current_reps,
            created_at: exercise.created_at,
        }
    }

    fn into_exercise(self) -> Exercise {
        Exercise {
            id: self.id,
            name: self.name,
            target_reps: self.target_reps,
            current_reps: self.current_reps,
            created_at: self.created_at,
        }
    }
}

/// REST row shape for the user_stats table.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct StatsRow {
    user_id: String,
    streak: u32,
    last_reset: DateTime<Utc>,
    last_celebration: Option<DateTime<Utc>>,
}

/// REST row shape for the next_day_targets table.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct TargetRow {
    exercise_id: String,
    user_id: String,
    target_reps: u32,
}

/// Remote store bound to one authenticated user.
pub struct RemoteStore {
    base: Url,
    identity: Identity,
    client: reqwest::Client,
}

impl RemoteStore {
    pub fn new(base: Url, identity: Identity) -> Self {
        Self {
            base,
            identity,
            client: reqwest::Client::new(),
        }
    }

    fn table_url(&self, table: &str, filters: &[(&str, &str)]) -> String {
        let mut url = format!(
            "{}/rest/v1/{}",
            self.base.as_str().trim_end_matches('/'),
            table
        );
        if !filters.is_empty() {
            let query: Vec<String> = filters
                .iter()
                .map(|(key, value)| format!("{key}={}", urlencoding::encode(value)))
                .collect();
            url.push_str(&format!("?{}", query.join("&")));
        }
        url
    }

    fn user_filter(&self) -> String {
        format!("eq.{}", self.identity.user_id)
    }

    async fn fetch_rows<T: DeserializeOwned>(&self, url: String) -> Result<Vec<T>, StorageError> {
        let response = self
            .client
            .get(&url)
            .header("apikey", &self.identity.access_token)
            .bearer_auth(&self.identity.access_token)
            .send()
            .await?;
        let response = ensure_success(response).await?;
        Ok(response.json::<Vec<T>>().await?)
    }

    async fn upsert<T: Serialize>(&self, table: &str, rows: &[T]) -> Result<(), StorageError> {
        let response = self
            .client
            .post(self.table_url(table, &[]))
            .header("apikey", &self.identity.access_token)
            .bearer_auth(&self.identity.access_token)
            .header("Prefer", "resolution=merge-duplicates")
            .json(rows)
            .send()
            .await?;
        ensure_success(response).await?;
        Ok(())
    }

    async fn delete_where(&self, table: &str, filters: &[(&str, &str)]) -> Result<(), StorageError> {
        let response = self
            .client
            .delete(self.table_url(table, filters))
            .header("apikey", &self.identity.access_token)
            .bearer_auth(&self.identity.access_token)
            .send()
            .await?;
        ensure_success(response).await?;
        Ok(())
    }
}

async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, StorageError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let message = response.text().await.unwrap_or_default();
    Err(StorageError::RemoteApi {
        status: status.as_u16(),
        message,
    })
}

#[async_trait]
impl HabitStore for RemoteStore {
    async fn load_exercises(&self) -> Result<Vec<Exercise>, StorageError> {
        let url = self.table_url(
            "exercises",
            &[
                ("user_id", &self.user_filter()),
                ("order", "created_at.asc"),
            ],
        );
        let rows: Vec<ExerciseRow> = self.fetch_rows(url).await?;
        Ok(rows.into_iter().map(ExerciseRow::into_exercise).collect())
    }

    async fn save_exercise(&self, exercise: &Exercise) -> Result<(), StorageError> {
        let row = ExerciseRow::from_exercise(exercise, &self.identity.user_id);
        self.upsert("exercises", &[row]).await
    }

    async fn update_progress(&self, id: &str, current_reps: u32) -> Result<(), StorageError> {
        let url = self.table_url(
            "exercises",
            &[
                ("id", &format!("eq.{id}")),
                ("user_id", &self.user_filter()),
            ],
        );
        let response = self
            .client
            .patch(&url)
            .header("apikey", &self.identity.access_token)
            .bearer_auth(&self.identity.access_token)
            .json(&serde_json::json!({ "current_reps": current_reps }))
            .send()
            .await?;
        ensure_success(response).await?;
        Ok(())
    }

    async fn delete_exercise(&self, id: &str) -> Result<(), StorageError> {
        self.delete_where(
            "next_day_targets",
            &[
                ("exercise_id", &format!("eq.{id}")),
                ("user_id", &self.user_filter()),
            ],
        )
        .await?;
        self.delete_where(
            "exercises",
            &[
                ("id", &format!("eq.{id}")),
                ("user_id", &self.user_filter()),
            ],
        )
        .await
    }

    async fn load_stats(&self) -> Result<UserStats, StorageError> {
        let url = self.table_url("user_stats", &[("user_id", &self.user_filter())]);
        let rows: Vec<StatsRow> = self.fetch_rows(url).await?;
        // A user with no stored record starts from defaults.
        Ok(rows
            .into_iter()
            .next()
            .map(|row| UserStats {
                streak: row.streak,
                last_reset: row.last_reset,
                last_celebration: row.last_celebration,
            })
            .unwrap_or_else(|| UserStats::new(Utc::now())))
    }

    async fn save_stats(&self, stats: &UserStats) -> Result<(), StorageError> {
        let row = StatsRow {
            user_id: self.identity.user_id.clone(),
            streak: stats.streak,
            last_reset: stats.last_reset,
            last_celebration: stats.last_celebration,
        };
        self.upsert("user_stats", &[row]).await
    }

    async fn next_day_targets(&self) -> Result<NextDayTargets, StorageError> {
        let url = self.table_url("next_day_targets", &[("user_id", &self.user_filter())]);
        let rows: Vec<TargetRow> = self.fetch_rows(url).await?;
        Ok(rows
            .into_iter()
            .map(|row| (row.exercise_id, row.target_reps))
            .collect())
    }

    async fn set_next_day_target(&self, id: &str, target_reps: u32) -> Result<(), StorageError> {
        let row = TargetRow {
            exercise_id: id.to_string(),
            user_id: self.identity.user_id.clone(),
            target_reps,
        };
        self.upsert("next_day_targets", &[row]).await
    }

    async fn commit_rollover(
        &self,
        exercises: &[Exercise],
        stats: &UserStats,
    ) -> Result<(), StorageError> {
        // No cross-table transaction over REST: exercises land first, then
        // targets clear, then stats. Stats go last so an interrupted commit
        // leaves `last_reset` stale and the next trigger retries.
        let rows: Vec<ExerciseRow> = exercises
            .iter()
            .map(|exercise| ExerciseRow::from_exercise(exercise, &self.identity.user_id))
            .collect();
        if !rows.is_empty() {
            self.upsert("exercises", &rows).await?;
        }
        self.delete_where("next_day_targets", &[("user_id", &self.user_filter())])
            .await?;
        self.save_stats(stats).await
    }
}
