//! Account command handlers.

use snaplink_core::{Client, User};

use crate::cli::{CredentialArgs, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::util;

fn user_detail(user: &User) -> String {
    let mut pairs = vec![("Email", user.email.clone())];
    if let Some(id) = user.extra.get("id") {
        pairs.push(("ID", id.to_string().trim_matches('"').to_owned()));
    }
    output::detail_lines(&pairs)
}

fn print_user(user: &User, global: &GlobalOpts) {
    let out = output::render_single(global.output(), user, user_detail, |u| u.email.clone());
    output::print_output(&out, global.quiet);
}

pub async fn register(client: &Client, args: CredentialArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let (email, password) = util::credentials(args)?;
    util::with_spinner(global, "Creating account", client.auth().register(&email, &password))
        .await
        .map_err(CliError::from_auth_entry)?;

    if client.auth().is_authenticated() {
        output::print_success(&format!("Account created, signed in as {email}"), global);
    } else {
        output::print_success("Account created. Sign in with: snaplink login", global);
    }
    Ok(())
}

pub async fn login(client: &Client, args: CredentialArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let (email, password) = util::credentials(args)?;
    util::with_spinner(global, "Signing in", client.auth().login(&email, &password))
        .await
        .map_err(CliError::from_auth_entry)?;

    if !client.auth().is_authenticated() {
        return Err(CliError::AuthFailed {
            message: "The server did not return an access token".into(),
        });
    }
    let who = client.auth().current_user().map_or(email, |u| u.email);
    output::print_success(&format!("Signed in as {who}"), global);
    Ok(())
}

pub fn logout(client: &Client, global: &GlobalOpts) -> Result<(), CliError> {
    let was_signed_in = client.auth().is_authenticated();
    client.auth().logout()?;
    if was_signed_in {
        output::print_success("Signed out", global);
    } else {
        output::print_notice("Not signed in", global);
    }
    Ok(())
}

pub fn whoami(client: &Client, global: &GlobalOpts) -> Result<(), CliError> {
    util::require_session(client)?;
    match client.auth().current_user() {
        Some(user) => print_user(&user, global),
        None => output::print_notice("Signed in (no profile stored)", global),
    }
    Ok(())
}
