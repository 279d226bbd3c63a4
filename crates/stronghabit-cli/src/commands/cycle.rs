use chrono::Utc;
use clap::Subcommand;
use stronghabit_core::storage::open_store;
use stronghabit_core::{Config, DailyCycleManager, Event};

#[derive(Subcommand)]
pub enum CycleAction {
    /// Run one day-boundary check now
    Check {
        /// Output emitted events as JSON
        #[arg(long)]
        json: bool,
    },
}

pub async fn run(action: CycleAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    let store = open_store(&config)?;
    let manager = DailyCycleManager::new(store);

    match action {
        CycleAction::Check { json } => {
            let events = manager.run(Utc::now()).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&events)?);
            } else if events.is_empty() {
                println!("no day boundary crossed");
            } else {
                for event in &events {
                    match event {
                        Event::StreakReset {
                            previous_streak, ..
                        } => {
                            println!("streak reset (was {previous_streak} days)");
                        }
                        Event::DayRolledOver {
                            exercises,
                            cleared_targets,
                            ..
                        } => {
                            println!(
                                "rolled over {} exercises, consumed {} next-day targets",
                                exercises.len(),
                                cleared_targets
                            );
                        }
                        Event::CelebrationTriggered { new_streak, .. } => {
                            println!("all exercises complete; streak is now {new_streak} days");
                        }
                        _ => {}
                    }
                }
            }
        }
    }
    Ok(())
}
