//! Clap derive structures for the `snaplink` CLI.
//!
//! Defines the command tree, global flags, and shared types.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;

use snaplink_core::{SortKey, SortOrder};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// snaplink -- shorten, edit and track links from the command line
#[derive(Debug, Parser)]
#[command(
    name = "snaplink",
    version,
    about = "Shorten URLs and manage your short links",
    long_about = "A command-line client for the snaplink URL-shortening service.\n\n\
        Sign in once with `snaplink login`; the session is kept in the\n\
        session directory until you log out or the server rejects it.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// API base URL (overrides config and SNAPLINK_API_URL)
    #[arg(long, short = 'u', global = true)]
    pub api_url: Option<String>,

    /// Directory holding the session files
    #[arg(long, env = "SNAPLINK_SESSION_DIR", global = true)]
    pub session_dir: Option<PathBuf>,

    /// Output format [default: table]
    #[arg(long, short = 'o', env = "SNAPLINK_OUTPUT", global = true)]
    pub output: Option<OutputFormat>,

    /// When to use color output [default: auto]
    #[arg(long, global = true)]
    pub color: Option<ColorMode>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    /// Request timeout in seconds [default: 10]
    #[arg(long, global = true)]
    pub timeout: Option<u64>,
}

impl GlobalOpts {
    pub fn output(&self) -> OutputFormat {
        self.output.unwrap_or_default()
    }

    pub fn color(&self) -> ColorMode {
        self.color.unwrap_or_default()
    }
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    #[default]
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    #[default]
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Create an account and sign in
    Register(CredentialArgs),

    /// Sign in with email and password
    Login(CredentialArgs),

    /// Forget the stored session
    Logout,

    /// Show the signed-in account
    Whoami,

    /// Manage your short links
    #[command(alias = "l")]
    Links(LinksArgs),

    /// Manage CLI configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  AUTH
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct CredentialArgs {
    /// Account email (prompted if omitted)
    pub email: Option<String>,

    /// Password (prompted if omitted)
    #[arg(long, env = "SNAPLINK_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  LINKS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct LinksArgs {
    #[command(subcommand)]
    pub command: LinksCommand,
}

#[derive(Debug, Subcommand)]
pub enum LinksCommand {
    /// List your links
    #[command(alias = "ls")]
    List {
        /// Only links whose URL or short code contains this text
        #[arg(long, short = 's')]
        search: Option<String>,

        /// Sort column: created, updated, clicks
        #[arg(long, default_value = "created")]
        sort: SortKey,

        /// Sort direction: asc, desc
        #[arg(long, default_value = "desc")]
        order: SortOrder,
    },

    /// Shorten a URL
    #[command(alias = "new")]
    Create {
        /// The URL to shorten (http or https)
        url: String,

        /// Custom short code (3-20 letters, digits, '-' or '_')
        #[arg(long, short = 'c')]
        code: Option<String>,
    },

    /// Change the target URL or short code of a link
    Edit {
        /// Link ID
        id: String,

        /// New target URL
        #[arg(long)]
        url: Option<String>,

        /// New short code
        #[arg(long, short = 'c')]
        code: Option<String>,
    },

    /// Delete a link
    #[command(alias = "rm")]
    Delete {
        /// Link ID
        id: String,
    },

    /// Show click statistics of a link
    Stats {
        /// Link ID
        id: String,
    },

    /// Print the public short URL of a code
    Url {
        /// Short code
        code: String,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  CONFIG
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Display the resolved configuration
    Show,

    /// Print the config file location
    Path,

    /// Set the API base URL
    SetUrl {
        /// Base URL, e.g. https://sho.rt
        url: String,
    },

    /// Restore the default configuration
    Reset,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  COMPLETIONS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_tree_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn list_flags_parse_into_core_types() {
        let cli = Cli::try_parse_from([
            "snaplink", "links", "list", "--sort", "clicks", "--order", "asc", "-s", "docs",
        ])
        .unwrap();
        match cli.command {
            Command::Links(LinksArgs {
                command: LinksCommand::List { search, sort, order },
            }) => {
                assert_eq!(search.as_deref(), Some("docs"));
                assert_eq!(sort, SortKey::Clicks);
                assert_eq!(order, SortOrder::Asc);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
