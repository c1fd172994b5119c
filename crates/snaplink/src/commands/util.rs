//! Shared helpers for command handlers.

use std::future::Future;
use std::io::{self, IsTerminal};
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use secrecy::SecretString;
use snaplink_core::{Client, LinkId};

use crate::cli::{CredentialArgs, GlobalOpts};
use crate::error::CliError;

/// Prompt for confirmation, auto-approving if `--yes` was passed.
///
/// Without a terminal there is nobody to ask, so the operation is refused.
pub fn confirm(message: &str, action: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    if !io::stdin().is_terminal() {
        return Err(CliError::NonInteractiveRequiresYes {
            action: action.into(),
        });
    }
    dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(prompt_err)
}

/// Map a dialoguer / interactive I/O failure into CliError.
pub fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

/// Email and password from flags, env, or interactive prompts.
pub fn credentials(args: CredentialArgs) -> Result<(String, SecretString), CliError> {
    let email = match args.email {
        Some(email) => email,
        None => dialoguer::Input::<String>::new()
            .with_prompt("Email")
            .interact_text()
            .map_err(prompt_err)?,
    };
    let password = match args.password {
        Some(password) => password,
        None => rpassword::prompt_password("Password: ").map_err(prompt_err)?,
    };
    if email.trim().is_empty() || password.is_empty() {
        return Err(CliError::Validation {
            field: "credentials".into(),
            reason: "email and password cannot be empty".into(),
        });
    }
    Ok((email.trim().to_owned(), SecretString::from(password)))
}

/// Fail early when no session is stored, instead of sending a request
/// the server will reject.
pub fn require_session(client: &Client) -> Result<(), CliError> {
    if client.auth().is_authenticated() {
        Ok(())
    } else {
        Err(CliError::NotSignedIn)
    }
}

pub fn link_id(raw: &str) -> Result<LinkId, CliError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(CliError::Validation {
            field: "id".into(),
            reason: "link ID cannot be empty".into(),
        });
    }
    Ok(LinkId::from(raw))
}

/// Run `fut` behind a spinner on interactive terminals.
pub async fn with_spinner<F, T>(global: &GlobalOpts, message: &str, fut: F) -> T
where
    F: Future<Output = T>,
{
    if global.quiet || !io::stderr().is_terminal() {
        return fut.await;
    }
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
        spinner.set_style(style);
    }
    spinner.set_message(message.to_owned());
    spinner.enable_steady_tick(Duration::from_millis(80));
    let out = fut.await;
    spinner.finish_and_clear();
    out
}
