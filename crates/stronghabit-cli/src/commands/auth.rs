use clap::Subcommand;
use stronghabit_core::Identity;

#[derive(Subcommand)]
pub enum AuthAction {
    /// Store remote backend credentials in the OS keyring
    Login {
        /// Remote user id
        #[arg(long)]
        user: String,
        /// Access token
        #[arg(long)]
        token: String,
    },
    /// Check authentication status
    Status,
    /// Remove stored credentials
    Logout,
}

pub fn run(action: AuthAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        AuthAction::Login { user, token } => {
            let identity = Identity {
                user_id: user,
                access_token: token,
            };
            identity.save()?;
            println!("authenticated as {}", identity.user_id);
        }
        AuthAction::Status => match Identity::load()? {
            Some(identity) => println!("authenticated as {}", identity.user_id),
            None => println!("not authenticated"),
        },
        AuthAction::Logout => {
            Identity::clear()?;
            println!("credentials removed");
        }
    }
    Ok(())
}
