//! credcache CLI
//!
//! Command-line interface for inspecting and managing credcache files.
//!
//! # Usage
//!
//! ```bash
//! # Print a token, prompting for it on first use
//! credcache token github
//!
//! # Print a credential's username (and password)
//! credcache credential jira --show-password
//!
//! # List what a cache holds
//! credcache --file work.yaml list --format json
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use credcache_core::{Cache, create_store};
use std::io;
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::{EnvFilter, fmt};

mod commands;
mod config;

use commands::OutputFormat;

#[derive(Debug, Parser)]
#[command(name = "credcache")]
#[command(about = "Local token and credential cache")]
#[command(version)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Cache file name (overrides config)
    #[arg(short, long, global = true)]
    file: Option<String>,

    /// Directory holding the cache file (overrides config)
    #[arg(short, long, global = true)]
    dir: Option<PathBuf>,

    /// Discard all cached entries before running the command
    #[arg(long, global = true)]
    reset: bool,

    /// Keep passwords in memory instead of the OS keyring
    #[arg(long, global = true)]
    memory: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Print a token, prompting for it if missing
    Token {
        /// Token name
        key: String,

        /// Hide input when prompting
        #[arg(short, long)]
        conceal: bool,
    },

    /// Print a credential's username, prompting for anything missing
    Credential {
        /// Credential name
        key: String,

        /// Also print the password
        #[arg(long)]
        show_password: bool,
    },

    /// Prompt for a new token value
    ResetToken {
        /// Token name
        key: String,
    },

    /// Prompt for a new username and password
    ResetCredential {
        /// Credential name
        key: String,

        /// Keep the username and only replace the password
        #[arg(long)]
        password_only: bool,
    },

    /// Remove a token
    RemoveToken {
        /// Token name
        key: String,
    },

    /// Remove a credential and its stored password
    RemoveCredential {
        /// Credential name
        key: String,
    },

    /// List cached entry names
    List {
        /// Output format
        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Remove cached entries
    Clear {
        /// Only clear tokens
        #[arg(long, conflicts_with = "credentials")]
        tokens: bool,

        /// Only clear credentials
        #[arg(long)]
        credentials: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = config::load_config()?;
    debug!("Loaded configuration from {:?}", config.config_path);

    let file_name = cli.file.clone().unwrap_or(config.file_name);
    let directory = cli.dir.clone().unwrap_or(config.directory);
    let store = create_store(config.prefer_keyring && !cli.memory);

    let mut cache = Cache::builder(file_name)
        .path(directory)
        .reset(cli.reset)
        .store(store)
        .open()
        .context("Failed to open cache")?;

    let mut out = io::stdout().lock();
    match cli.command {
        Commands::Token { key, conceal } => commands::token(&mut cache, &key, conceal, &mut out),
        Commands::Credential { key, show_password } => {
            commands::credential(&mut cache, &key, show_password, &mut out)
        }
        Commands::ResetToken { key } => commands::reset_token(&mut cache, &key, &mut out),
        Commands::ResetCredential { key, password_only } => {
            commands::reset_credential(&mut cache, &key, password_only, &mut out)
        }
        Commands::RemoveToken { key } => commands::remove_token(&mut cache, &key, &mut out),
        Commands::RemoveCredential { key } => {
            commands::remove_credential(&mut cache, &key, &mut out)
        }
        Commands::List { format } => commands::list(&cache, format, &mut out),
        Commands::Clear {
            tokens,
            credentials,
        } => commands::clear(&mut cache, tokens, credentials, &mut out),
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "credcache", "token", "github", "--file", "work.yaml", "--memory",
        ])
        .unwrap();

        assert_eq!(cli.file.as_deref(), Some("work.yaml"));
        assert!(cli.memory);
        assert!(matches!(
            cli.command,
            Commands::Token { ref key, conceal: false } if key == "github"
        ));
    }

    #[test]
    fn test_parse_list_format() {
        let cli = Cli::try_parse_from(["credcache", "list", "--format", "json"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::List {
                format: OutputFormat::Json
            }
        ));
    }

    #[test]
    fn test_clear_flags_conflict() {
        let result = Cli::try_parse_from(["credcache", "clear", "--tokens", "--credentials"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_command_is_required() {
        assert!(Cli::try_parse_from(["credcache"]).is_err());
    }
}
