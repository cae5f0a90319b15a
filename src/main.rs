mod commands;
mod observer;
mod render;
mod utils;

use std::path::PathBuf;

use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "rostersync")]
#[command(about = "Keep a remote calendar in step with your shift roster")]
struct Cli {
    /// More log output on stderr (-v info, -vv debug). RUST_LOG overrides.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in to a calendar provider
    Auth {
        /// Provider to authenticate with
        #[arg(default_value = "google")]
        provider: String,
    },
    /// Reconcile roster exports against the configured calendar
    Sync {
        /// Roster export files (.ics)
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Show recent sync runs, oldest first
    History {
        /// Only show the most recent N runs
        #[arg(short, long)]
        limit: Option<usize>,

        /// Print raw JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Manage the configuration file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Write a default config file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Print where rostersync keeps its files
    Path,
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Auth { provider } => commands::auth::run(&provider).await,
        Commands::Sync { files } => commands::sync::run(&files).await,
        Commands::History { limit, json } => commands::history::run(limit, json),
        Commands::Config { action } => match action {
            ConfigAction::Init { force } => commands::config::init(force),
            ConfigAction::Path => commands::config::path(),
        },
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
    fn test_sync_requires_files() {
        assert!(Cli::try_parse_from(["rostersync", "sync"]).is_err());

        let cli = Cli::try_parse_from(["rostersync", "-vv", "sync", "a.ics", "b.ics"]).unwrap();
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Sync { files } => assert_eq!(files.len(), 2),
            _ => panic!("expected sync"),
        }
    }

    #[test]
    fn test_auth_defaults_to_google() {
        let cli = Cli::try_parse_from(["rostersync", "auth"]).unwrap();
        assert!(matches!(cli.command, Commands::Auth { provider } if provider == "google"));
    }
}
