//! Exercise management commands for CLI.

use chrono::Utc;
use clap::Subcommand;
use stronghabit_core::reminder::messages;
use stronghabit_core::storage::open_store;
use stronghabit_core::{Config, DailyCycleManager, Exercise};

#[derive(Subcommand)]
pub enum ExerciseAction {
    /// Add a new exercise
    Add {
        /// Exercise name
        name: String,
        /// Daily rep target
        #[arg(long, default_value = "10")]
        target: u32,
    },
    /// List exercises with today's progress
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Adjust today's progress by a signed rep delta
    Bump {
        /// Exercise ID
        id: String,
        /// Rep delta, e.g. 5 or -2
        #[arg(allow_hyphen_values = true)]
        delta: i64,
    },
    /// Request a higher target for tomorrow
    NextTarget {
        /// Exercise ID
        id: String,
        /// Requested target reps (must exceed the current target)
        target: u32,
        /// Accept an increase of more than 50%
        #[arg(long)]
        force: bool,
    },
    /// Delete an exercise
    Delete {
        /// Exercise ID
        id: String,
    },
}

pub async fn run(action: ExerciseAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    let store = open_store(&config)?;

    match action {
        ExerciseAction::Add { name, target } => {
            let exercise = Exercise::new(name, target);
            store.save_exercise(&exercise).await?;
            println!("Exercise created: {}", exercise.id);
            println!("{}", serde_json::to_string_pretty(&exercise)?);
        }
        ExerciseAction::List { json } => {
            let exercises = store.load_exercises().await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&exercises)?);
            } else if exercises.is_empty() {
                println!("no exercises yet; try 'stronghabit exercise add <NAME>'");
            } else {
                for exercise in &exercises {
                    let mark = if exercise.is_completed() { "x" } else { " " };
                    println!(
                        "[{mark}] {:3}/{:<3} {}  ({})",
                        exercise.current_reps, exercise.target_reps, exercise.name, exercise.id
                    );
                }
            }
        }
        ExerciseAction::Bump { id, delta } => {
            let exercises = store.load_exercises().await?;
            let mut exercise = exercises
                .into_iter()
                .find(|e| e.id == id)
                .ok_or(format!("Exercise not found: {id}"))?;
            exercise.adjust_progress(delta);
            store.update_progress(&id, exercise.current_reps).await?;
            println!("{}", serde_json::to_string_pretty(&exercise)?);

            // Completing the last exercise of the day celebrates and bumps
            // the streak; the manager keeps this once per day.
            let manager = DailyCycleManager::new(store);
            if let Some(celebration) = manager.celebrate_if_complete(Utc::now()).await? {
                println!(
                    "{} {}",
                    messages::COMPLETION_TITLE,
                    messages::completion_message(
                        celebration.exercises_done,
                        celebration.total_reps
                    )
                );
                if let Some(milestone) = messages::milestone_for(celebration.new_streak) {
                    println!(
                        "{} {}",
                        messages::milestone_title(&milestone),
                        milestone.message
                    );
                }
            }
        }
        ExerciseAction::NextTarget { id, target, force } => {
            let exercises = store.load_exercises().await?;
            let exercise = exercises
                .iter()
                .find(|e| e.id == id)
                .ok_or(format!("Exercise not found: {id}"))?;
            if !exercise.is_completed() {
                return Err(format!(
                    "complete today's {} reps before planning a higher target",
                    exercise.target_reps
                )
                .into());
            }
            if target <= exercise.target_reps {
                return Err(format!(
                    "next-day target must exceed the current target of {}",
                    exercise.target_reps
                )
                .into());
            }
            let increase_pct = ((target - exercise.target_reps) as f64
                / exercise.target_reps as f64
                * 100.0)
                .round();
            if increase_pct > 50.0 && !force {
                return Err(format!(
                    "a {increase_pct:.0}% increase is ambitious; pass --force to confirm"
                )
                .into());
            }
            store.set_next_day_target(&id, target).await?;
            println!(
                "Tomorrow's target for {}: {} reps (today: {})",
                exercise.name, target, exercise.target_reps
            );
        }
        ExerciseAction::Delete { id } => {
            store.delete_exercise(&id).await?;
            println!("Exercise deleted: {id}");
        }
    }
    Ok(())
}
