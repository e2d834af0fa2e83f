//! CLI command definitions.
//!
//! This module defines all CLI commands and their arguments using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// swapi - Declarative management of SWAPI planets.
#[derive(Parser, Debug)]
#[command(name = "swapi")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the manifest file.
    #[arg(short, long, global = true, env = "SWAPI_CONFIG")]
    pub config: Option<PathBuf>,

    /// SWAPI endpoint, overriding the manifest.
    #[arg(long, global = true)]
    pub endpoint: Option<String>,

    /// SWAPI API key, overriding the manifest.
    #[arg(long, global = true, hide_env_values = true)]
    pub api_key: Option<String>,

    /// Directory holding state (defaults to `.swapi/` next to the manifest).
    #[arg(long, global = true)]
    pub state_dir: Option<PathBuf>,

    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format (text, json).
    #[arg(long, global = true, default_value = "text")]
    pub output: OutputFormat,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Validate the manifest.
    Validate,

    /// Print the provider, resource and data source schemas.
    Schema,

    /// Show what apply would change.
    Plan,

    /// Create, update, replace and delete planets to match the manifest.
    Apply {
        /// Skip confirmation prompt.
        #[arg(short, long)]
        yes: bool,

        /// Continue on errors.
        #[arg(long)]
        continue_on_error: bool,

        /// Skip the read that follows every write.
        #[arg(long)]
        no_verify: bool,
    },

    /// Re-read every managed planet and record the server's values.
    Refresh,

    /// Delete every managed planet.
    Destroy {
        /// Skip confirmation prompt.
        #[arg(short, long)]
        yes: bool,
    },

    /// Start managing an existing planet.
    Import {
        /// Manifest label to record the planet under.
        label: String,

        /// Planet id.
        id: String,
    },

    /// Evaluate planet lookups.
    Data {
        /// Only evaluate this lookup.
        label: Option<String>,
    },

    /// Inspect and edit recorded state.
    State {
        /// State subcommand.
        #[command(subcommand)]
        command: StateCommands,
    },
}

/// State management subcommands.
#[derive(Subcommand, Debug)]
pub enum StateCommands {
    /// Show recorded state and history.
    Show,

    /// List managed resource addresses.
    List,

    /// Forget a resource without deleting the planet.
    Rm {
        /// Resource address (`swapi_planet.<label>`) or label.
        address: String,
    },

    /// Unlock the state.
    Unlock {
        /// Lock ID to unlock.
        #[arg(long, required_unless_present = "force")]
        lock_id: Option<String>,

        /// Force unlock (dangerous).
        #[arg(long)]
        force: bool,
    },
}

/// Output format options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output.
    #[default]
    Text,
    /// JSON output for scripting.
    Json,
}

impl Cli {
    /// Parses CLI arguments from the command line.
    #[must_use]
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_apply_flags() {
        let cli = Cli::try_parse_from([
            "swapi",
            "--endpoint",
            "https://api.test/v1",
            "apply",
            "--yes",
            "--no-verify",
        ])
        .expect("parse");

        assert_eq!(cli.endpoint.as_deref(), Some("https://api.test/v1"));
        assert!(matches!(
            cli.command,
            Commands::Apply {
                yes: true,
                continue_on_error: false,
                no_verify: true
            }
        ));
    }

    #[test]
    fn test_parse_state_rm_and_json_output() {
        let cli = Cli::try_parse_from(["swapi", "state", "rm", "swapi_planet.hoth", "--output", "json"])
            .expect("parse");

        assert_eq!(cli.output, OutputFormat::Json);
        match cli.command {
            Commands::State {
                command: StateCommands::Rm { address },
            } => assert_eq!(address, "swapi_planet.hoth"),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_unlock_needs_lock_id_or_force() {
        let err = Cli::try_parse_from(["swapi", "state", "unlock"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
        assert_ne!(err.exit_code(), 0);

        assert!(Cli::try_parse_from(["swapi", "state", "unlock", "--force"]).is_ok());
        assert!(Cli::try_parse_from(["swapi", "state", "unlock", "--lock-id", "abc"]).is_ok());
    }
}
