//! CLI glue over `snaplink_config`: applies command-line overrides and
//! builds the `ClientConfig` handed to core.

use std::time::Duration;

use clap::ValueEnum;

pub use snaplink_config::{Config, config_path, load_config, load_config_or_default, save_config};
use snaplink_core::ClientConfig;

use crate::cli::{ColorMode, GlobalOpts, OutputFormat};
use crate::error::CliError;

/// Fill output and color from the config file where no flag was given.
pub fn apply_display_defaults(global: &mut GlobalOpts, cfg: &Config) -> Result<(), CliError> {
    if global.output.is_none() {
        global.output = Some(parse_value::<OutputFormat>("output", &cfg.output)?);
    }
    if global.color.is_none() {
        global.color = Some(parse_value::<ColorMode>("color", &cfg.color)?);
    }
    Ok(())
}

fn parse_value<T: ValueEnum>(field: &str, raw: &str) -> Result<T, CliError> {
    T::from_str(raw, true).map_err(|reason| CliError::Validation {
        field: field.into(),
        reason,
    })
}

/// Resolve the client configuration: config file + env, then flags.
pub fn client_config(global: &GlobalOpts, cfg: &Config) -> Result<ClientConfig, CliError> {
    let mut client = cfg.to_client_config()?;

    if let Some(ref url) = global.api_url {
        let url = snaplink_config::validate_api_url(url)?;
        client.api_url = url.to_string();
    }
    if let Some(secs) = global.timeout {
        if secs == 0 {
            return Err(CliError::Validation {
                field: "timeout".into(),
                reason: "must be at least 1 second".into(),
            });
        }
        client.timeout = Duration::from_secs(secs);
    }
    if let Some(ref dir) = global.session_dir {
        client.session_dir = Some(dir.clone());
    }
    Ok(client)
}
