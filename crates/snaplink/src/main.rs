mod cli;
mod commands;
mod config;
mod error;
mod output;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use snaplink_core::Client;

use crate::cli::{Cli, Command};
use crate::error::CliError;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_tracing(cli.global.verbose);

    if let Err(err) = run(cli).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

fn init_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run(mut cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Command::Completions(args) => {
            use clap::CommandFactory;
            use clap_complete::generate;

            let mut cmd = Cli::command();
            generate(args.shell, &mut cmd, "snaplink", &mut std::io::stdout());
            Ok(())
        }

        // Config commands must work even when the file is broken.
        Command::Config(args) => {
            let cfg = config::load_config_or_default();
            config::apply_display_defaults(&mut cli.global, &cfg)?;
            commands::config_cmd::handle(args, &cli.global, cfg)
        }

        cmd => {
            let cfg = config::load_config()?;
            config::apply_display_defaults(&mut cli.global, &cfg)?;
            let client_config = config::client_config(&cli.global, &cfg)?;
            let client = Client::new(client_config)?;

            tracing::debug!(api_url = %client.config().api_url, "dispatching command");
            commands::dispatch(cmd, &client, &cli.global).await
        }
    }
}
