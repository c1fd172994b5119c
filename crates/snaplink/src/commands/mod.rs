//! Command dispatch: bridges CLI args -> core services -> output formatting.

pub mod auth;
pub mod config_cmd;
pub mod links;
pub mod util;

use snaplink_core::Client;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch an API-bound command to the appropriate handler.
pub async fn dispatch(cmd: Command, client: &Client, global: &GlobalOpts) -> Result<(), CliError> {
    match cmd {
        Command::Register(args) => auth::register(client, args, global).await,
        Command::Login(args) => auth::login(client, args, global).await,
        Command::Logout => auth::logout(client, global),
        Command::Whoami => auth::whoami(client, global),
        Command::Links(args) => links::handle(client, args, global).await,
        // handled in main before a client exists
        Command::Config(_) | Command::Completions(_) => Ok(()),
    }
}
