use clap::Subcommand;
use stronghabit_core::storage::migrate_local_to_remote;
use stronghabit_core::{Config, Identity, LocalStore, RemoteStore};

#[derive(Subcommand)]
pub enum MigrateAction {
    /// Copy all local data to the remote backend (one-time)
    ToRemote,
}

pub async fn run(action: MigrateAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        MigrateAction::ToRemote => {
            let config = Config::load_or_default();
            if config.storage.remote_url.is_empty() {
                return Err("set storage.remote_url before migrating".into());
            }
            let identity = Identity::load()?
                .ok_or("not authenticated: run 'stronghabit auth login' first")?;
            let base = url::Url::parse(&config.storage.remote_url)?;
            let remote = RemoteStore::new(base, identity);
            let local = LocalStore::open()?;

            let report = migrate_local_to_remote(&local, &remote).await?;
            if report.already_migrated {
                println!("already migrated; nothing to do");
            }
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }
    Ok(())
}
