//! Querybar CLI application entry point
//!
//! Parses, validates and edits structured search queries such as
//! `is:unresolved assigned:me browser.name:Chrome`.
//!
//! # Usage
//!
//! ```bash
//! # Edit a query interactively (default command)
//! querybar
//! querybar interactive "is:unresolved"
//!
//! # Inspect and check queries
//! querybar parse "is:unresolved timesSeen:>10"
//! querybar validate --disallow-free-text "is:unresolved oops"
//! querybar normalize "  is:unresolved   assigned:me "
//!
//! # Add or remove a filter
//! querybar toggle "is:unresolved" assigned me
//!
//! # Recent searches
//! querybar recent list --type issue
//! querybar recent clear
//! ```
//!
//! # Configuration
//!
//! Settings are read from `~/.config/querybar/config.toml` on Linux (see
//! `querybar config path`) and from `QUERYBAR_*` environment variables.
//! Log output goes to stderr; set `QUERYBAR_LOG` or pass `-v`/`-vv`.

use querybar::{
    QuerybarError,
    cli::{Cli, Commands},
    commands,
    config::QuerybarConfig,
};
use tracing::debug;
use tracing_subscriber::EnvFilter;

type Result<T> = std::result::Result<T, QuerybarError>;

fn init_logging(cli: &Cli) {
    let filter = if cli.verbose > 0 {
        EnvFilter::new(cli.log_level())
    } else {
        EnvFilter::try_from_env("QUERYBAR_LOG").unwrap_or_else(|_| EnvFilter::new(cli.log_level()))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Main entry point for the querybar application
///
/// Parses command-line arguments, loads configuration, and dispatches to the
/// appropriate command handler.
///
/// # Errors
///
/// Returns `QuerybarError` if configuration loading fails or any command handler
/// returns an error.
fn main() -> Result<()> {
    let cli = Cli::parse_args();
    init_logging(&cli);

    let config_path = match &cli.config {
        Some(path) => path.clone(),
        None => QuerybarConfig::config_path()?,
    };
    let mut config = QuerybarConfig::load_from(&config_path)?;
    cli.overrides.apply(&mut config);
    debug!(path = %config_path.display(), ?config.dataset, "configuration loaded");

    let quiet = cli.quiet;
    let json = cli.json;

    match cli.get_command() {
        Commands::Parse { query } => commands::parse(&config, &query, json, quiet)?,
        Commands::Validate { query } => {
            if !commands::validate(&config, &query, json, quiet)? {
                std::process::exit(1);
            }
        }
        Commands::Normalize { query } => commands::normalize(&config, &query, json)?,
        Commands::Toggle { query, key, value } => {
            commands::toggle(&config, &query, &key, &value, json)?;
        }
        Commands::Interactive {
            initial,
            search_type,
            no_recent,
        } => commands::interactive(&config, initial.as_deref(), search_type, !no_recent, quiet)?,
        Commands::Recent { command } => commands::recent(&config, &command, json, quiet)?,
        Commands::Config { command } => {
            commands::config(&config, &config_path, &command, json, quiet)?;
        }
        Commands::Completions { shell } => commands::completions(shell, &mut std::io::stdout()),
    }

    Ok(())
}
