use chrono::{Local, Utc};
use clap::Subcommand;
use stronghabit_core::storage::open_store;
use stronghabit_core::{Config, DailyCycleManager};

#[derive(Subcommand)]
pub enum StatsAction {
    /// Current streak and rollover bookkeeping
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

pub async fn run(action: StatsAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    let store = open_store(&config)?;
    let manager = DailyCycleManager::new(store);

    match action {
        StatsAction::Show { json } => {
            // Applies the missed-day rule before reporting, so a stale
            // streak never shows.
            let stats = manager.load_stats(Utc::now()).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&stats)?);
            } else {
                println!("streak: {} days", stats.streak);
                println!(
                    "last reset: {}",
                    stats.last_reset.with_timezone(&Local).format("%Y-%m-%d %H:%M")
                );
                match stats.last_celebration {
                    Some(at) => println!(
                        "last celebration: {}",
                        at.with_timezone(&Local).format("%Y-%m-%d %H:%M")
                    ),
                    None => println!("last celebration: never"),
                }
            }
        }
    }
    Ok(())
}
