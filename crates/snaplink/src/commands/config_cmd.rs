//! Config subcommand handlers.

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config::{self, Config};
use crate::error::CliError;
use crate::output;

fn config_detail(cfg: &Config) -> String {
    let session_dir = cfg
        .session_dir
        .clone()
        .unwrap_or_else(snaplink_config::default_session_dir);
    output::detail_lines(&[
        ("API URL", cfg.api_url.clone()),
        ("Timeout", format!("{}s", cfg.timeout)),
        ("Session dir", session_dir.display().to_string()),
        ("Output", cfg.output.clone()),
        ("Color", cfg.color.clone()),
    ])
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: ConfigArgs, global: &GlobalOpts, mut cfg: Config) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Show => {
            let out = output::render_single(global.output(), &cfg, config_detail, |c| c.api_url.clone());
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ConfigCommand::Path => {
            output::print_output(&config::config_path().display().to_string(), global.quiet);
            Ok(())
        }

        ConfigCommand::SetUrl { url } => {
            let url = snaplink_config::validate_api_url(&url)?;
            cfg.api_url = url.as_str().trim_end_matches('/').to_owned();
            let path = config::save_config(&cfg)?;
            tracing::debug!(path = %path.display(), "config saved");
            output::print_success(&format!("API URL set to {}", cfg.api_url), global);
            Ok(())
        }

        ConfigCommand::Reset => {
            let path = config::save_config(&Config::default())?;
            output::print_success(&format!("Config reset at {}", path.display()), global);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detail_lists_every_setting() {
        let cfg = Config {
            session_dir: Some("/tmp/snaplink".into()),
            ..Config::default()
        };
        let out = config_detail(&cfg);
        assert!(out.contains("API URL:"));
        assert!(out.contains("10s"));
        assert!(out.contains("/tmp/snaplink"));
    }
}
