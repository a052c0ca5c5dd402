//! Command implementations, one module per subcommand group.

pub mod account;
pub mod cart;
pub mod catalog;
pub mod orders;

use thiserror::Error;

/// Errors surfaced to the user by any command.
#[derive(Debug, Error)]
pub enum CommandError {
    /// The store rejected the operation; carries a display message.
    #[error("{0}")]
    Action(String),

    /// A direct API call failed.
    #[error("{0}")]
    Api(#[from] maplemart_client::ApiError),

    /// The command needs a signed-in session.
    #[error("You are not logged in. Run `maplemart account login` first.")]
    NotLoggedIn,

    /// The command needs an admin account. The server enforces this too;
    /// checking locally gives a better message.
    #[error("This command requires an admin account.")]
    NotAdmin,

    /// Could not read a value from the terminal.
    #[error("Could not read input: {0}")]
    Input(#[from] std::io::Error),

    /// A user-supplied value failed to parse.
    #[error("Invalid {field}: {reason}")]
    InvalidArgument {
        field: &'static str,
        reason: String,
    },
}

impl From<maplemart_client::ActionError> for CommandError {
    fn from(error: maplemart_client::ActionError) -> Self {
        Self::Action(error.message().to_owned())
    }
}

/// Print a prompt and read one line from the terminal.
pub fn prompt_line(prompt: &str) -> Result<String, CommandError> {
    use std::io::Write;

    print!("{prompt}");
    std::io::stdout().flush()?;
    let mut line = String::new();
    std::io::stdin().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_owned())
}
