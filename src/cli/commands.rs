//! CLI commands and argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// ClickUp source connector
#[derive(Parser, Debug)]
#[command(name = "clickup-source")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (JSON)
    #[arg(short = 'C', long, global = true)]
    pub config: Option<PathBuf>,

    /// Inline config JSON (takes precedence over --config)
    #[arg(long, global = true)]
    pub config_json: Option<String>,

    /// State file (JSON), rewritten after every checkpoint
    #[arg(short, long, global = true)]
    pub state: Option<PathBuf>,

    /// Inline state JSON
    #[arg(long, global = true)]
    pub state_json: Option<String>,

    /// Output format
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Test connection to the API
    Check,

    /// List available stream names
    Streams,

    /// Read data from streams
    Read {
        /// Streams to sync (comma-separated, empty = all)
        #[arg(long)]
        streams: Option<String>,
    },
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output (one message per line)
    Json,
    /// Human-readable output
    Pretty,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_read_with_streams() {
        let cli = Cli::parse_from([
            "clickup-source",
            "read",
            "--streams",
            "tasks,lists",
            "--config-json",
            r#"{"token": "pk_1"}"#,
            "--state",
            "state.json",
        ]);

        assert_eq!(
            cli.command,
            Commands::Read {
                streams: Some("tasks,lists".to_string())
            }
        );
        assert_eq!(cli.config_json.as_deref(), Some(r#"{"token": "pk_1"}"#));
        assert_eq!(cli.state, Some(PathBuf::from("state.json")));
        assert_eq!(cli.format, OutputFormat::Json);
        assert!(!cli.verbose);
    }

    #[test]
    fn test_parse_check_verbose() {
        let cli = Cli::parse_from(["clickup-source", "-v", "check", "-C", "config.json"]);
        assert_eq!(cli.command, Commands::Check);
        assert_eq!(cli.config, Some(PathBuf::from("config.json")));
        assert!(cli.verbose);
    }

    #[test]
    fn test_unknown_command_fails() {
        assert!(Cli::try_parse_from(["clickup-source", "discover"]).is_err());
    }
}
