//! Account and session commands.

use clap::Subcommand;

use maplemart_client::AppState;

use super::{CommandError, prompt_line};

#[derive(Subcommand)]
pub enum AccountAction {
    /// Create an account and sign in
    Register {
        /// Display name
        #[arg(short, long)]
        name: String,

        /// Email address
        #[arg(short, long)]
        email: String,
    },
    /// Sign in with email and password
    Login {
        /// Email address
        #[arg(short, long)]
        email: String,
    },
    /// Sign out and forget the stored session
    Logout,
    /// Show the signed-in identity
    Whoami,
}

pub async fn run(app: &AppState, action: AccountAction) -> Result<(), CommandError> {
    match action {
        AccountAction::Register { name, email } => {
            let password = prompt_line("Password: ")?;
            app.register(&name, &email, &password).await?;
            println!("Welcome, {name}! You are now signed in.");
        }
        AccountAction::Login { email } => {
            let password = prompt_line("Password: ")?;
            app.login(&email, &password).await?;
            if let Some(identity) = app.session().identity() {
                println!("Signed in as {} <{}>.", identity.name, identity.email);
            }
        }
        AccountAction::Logout => {
            app.logout();
            println!("Signed out.");
        }
        AccountAction::Whoami => match app.session().identity() {
            Some(identity) => {
                println!("{} <{}>", identity.name, identity.email);
                println!("role: {}", identity.role);
            }
            None => return Err(CommandError::NotLoggedIn),
        },
    }
    Ok(())
}
