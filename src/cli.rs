//! Command-line interface definitions and parsing
//!
//! This module defines the CLI structure for querybar using the `clap` crate.
//!
//! # Commands
//!
//! - **parse**: Tokenize a query and list its tokens
//! - **validate**: Check a query against the configuration (exit code 1 if invalid)
//! - **normalize**: Print the canonical form of a query
//! - **toggle**: Add or remove a `key:value` filter
//! - **interactive**: Edit a query in a live session (default)
//! - **recent**: List, remove or clear recent searches
//! - **config**: Show, locate or create the configuration file
//! - **completions**: Print a shell completion script
//!
//! The `--disallow-*` and `--dataset` flags override the configuration file for a
//! single run.
//!
//! # Examples
//!
//! ```
//! use querybar::cli::{Cli, Commands};
//! use clap::Parser;
//!
//! let cli = Cli::parse_from(["querybar", "validate", "--disallow-free-text", "is:unresolved"]);
//! assert!(matches!(cli.get_command(), Commands::Validate { .. }));
//! assert!(cli.overrides.disallow_free_text);
//! ```

use crate::config::QuerybarConfig;
use crate::keys::Dataset;
use crate::recent::SavedSearchType;
use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

fn parse_search_type(value: &str) -> Result<SavedSearchType, String> {
    SavedSearchType::try_from(value)
}

fn parse_dataset(value: &str) -> Result<Dataset, String> {
    Dataset::try_from(value)
}

/// One-off overrides of the configuration file
#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationOverrides {
    /// Flag bare words and quoted phrases
    #[arg(long = "disallow-free-text", global = true)]
    pub disallow_free_text: bool,

    /// Flag AND, OR and parentheses
    #[arg(long = "disallow-logical-operators", global = true)]
    pub disallow_logical_operators: bool,

    /// Flag filter keys that aren't supported
    #[arg(long = "disallow-unsupported-filters", global = true)]
    pub disallow_unsupported_filters: bool,

    /// Flag `*` wildcards
    #[arg(long = "disallow-wildcard", global = true)]
    pub disallow_wildcard: bool,

    /// Dataset whose key restrictions apply
    #[arg(long = "dataset", value_name = "DATASET", value_parser = parse_dataset, global = true)]
    pub dataset: Option<Dataset>,

    /// Enable an organization feature flag (repeatable)
    #[arg(long = "feature", value_name = "FLAG", global = true)]
    pub features: Vec<String>,
}

impl ValidationOverrides {
    /// Apply the overrides; flags only ever switch restrictions on
    pub fn apply(&self, config: &mut QuerybarConfig) {
        config.disallow_free_text |= self.disallow_free_text;
        config.disallow_logical_operators |= self.disallow_logical_operators;
        config.disallow_unsupported_filters |= self.disallow_unsupported_filters;
        config.disallow_wildcard |= self.disallow_wildcard;
        if self.dataset.is_some() {
            config.dataset = self.dataset;
        }
        for feature in &self.features {
            config.features.enable(feature.clone());
        }
    }
}

/// Configuration management subcommands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum ConfigCommands {
    /// Print the effective configuration as TOML
    Show,

    /// Print the configuration file path
    Path,

    /// Create a configuration file interactively
    Init {
        /// Write defaults without prompting
        #[arg(short = 'y', long = "defaults")]
        defaults: bool,
    },
}

/// Recent-search subcommands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum RecentCommands {
    /// List recent searches, most recent first
    #[command(visible_alias = "ls")]
    List {
        #[arg(short = 't', long = "type", value_name = "TYPE", value_parser = parse_search_type)]
        search_type: Option<SavedSearchType>,
    },

    /// Forget one recent search
    #[command(visible_alias = "rm")]
    Remove {
        #[arg(value_name = "TYPE", value_parser = parse_search_type)]
        search_type: SavedSearchType,

        #[arg(value_name = "QUERY")]
        query: String,
    },

    /// Forget all recent searches, or those of one type
    Clear {
        #[arg(short = 't', long = "type", value_name = "TYPE", value_parser = parse_search_type)]
        search_type: Option<SavedSearchType>,
    },
}

/// Main CLI structure for parsing command-line arguments
#[derive(Parser, Debug)]
#[command(name = "querybar")]
#[command(about = "Parse, validate and edit structured search queries", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Suppress informational output (only print results)
    #[arg(short = 'q', long = "quiet", global = true)]
    pub quiet: bool,

    /// Print results as JSON
    #[arg(long = "json", global = true)]
    pub json: bool,

    /// More log output on stderr (-v info, -vv debug)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Configuration file to use instead of the default
    #[arg(long = "config", value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    #[command(flatten)]
    pub overrides: ValidationOverrides,
}

/// Available CLI commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// List the tokens of a query
    #[command(visible_alias = "p")]
    Parse {
        #[arg(value_name = "QUERY")]
        query: String,
    },

    /// Check a query and point at invalid tokens
    #[command(visible_alias = "v")]
    Validate {
        #[arg(value_name = "QUERY")]
        query: String,
    },

    /// Print the canonical form of a query
    #[command(visible_alias = "n")]
    Normalize {
        #[arg(value_name = "QUERY")]
        query: String,
    },

    /// Add `key:value` to a query, or remove it if present
    #[command(visible_alias = "t")]
    Toggle {
        #[arg(value_name = "QUERY")]
        query: String,

        #[arg(value_name = "KEY")]
        key: String,

        #[arg(value_name = "VALUE")]
        value: String,
    },

    /// Edit a query in a live session (default)
    #[command(visible_alias = "i")]
    Interactive {
        /// Query to start from
        #[arg(value_name = "QUERY")]
        initial: Option<String>,

        /// Search type recent searches are recorded under
        #[arg(short = 't', long = "type", value_name = "TYPE", value_parser = parse_search_type, default_value = "issue")]
        search_type: SavedSearchType,

        /// Don't record recent searches
        #[arg(long = "no-recent")]
        no_recent: bool,
    },

    /// Manage recent searches
    Recent {
        #[command(subcommand)]
        command: RecentCommands,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Print a shell completion script
    Completions {
        #[arg(value_name = "SHELL")]
        shell: Shell,
    },
}

impl Cli {
    /// Parse command line arguments
    #[must_use]
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Get the command, defaulting to an empty interactive session
    #[must_use]
    pub fn get_command(&self) -> Commands {
        self.command.clone().unwrap_or(Commands::Interactive {
            initial: None,
            search_type: SavedSearchType::Issue,
            no_recent: false,
        })
    }

    /// Tracing filter directive for the `-v` count
    #[must_use]
    pub const fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            _ => "debug",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_default_command_is_interactive() {
        let cli = Cli::parse_from(["querybar"]);
        assert_eq!(
            cli.get_command(),
            Commands::Interactive {
                initial: None,
                search_type: SavedSearchType::Issue,
                no_recent: false,
            }
        );
    }

    #[test]
    fn test_verbose_levels() {
        assert_eq!(Cli::parse_from(["querybar"]).log_level(), "warn");
        assert_eq!(Cli::parse_from(["querybar", "-v"]).log_level(), "info");
        assert_eq!(Cli::parse_from(["querybar", "-vvv"]).log_level(), "debug");
    }

    #[test]
    fn test_toggle_arguments() {
        let cli = Cli::parse_from(["querybar", "toggle", "is:unresolved", "assigned", "me"]);
        assert_eq!(
            cli.get_command(),
            Commands::Toggle {
                query: "is:unresolved".into(),
                key: "assigned".into(),
                value: "me".into(),
            }
        );
    }

    #[test]
    fn test_recent_type_parsing() {
        let cli = Cli::parse_from(["querybar", "recent", "list", "--type", "replay"]);
        assert_eq!(
            cli.get_command(),
            Commands::Recent {
                command: RecentCommands::List {
                    search_type: Some(SavedSearchType::Replay)
                }
            }
        );
        assert!(Cli::try_parse_from(["querybar", "recent", "list", "--type", "nope"]).is_err());
    }

    #[test]
    fn test_overrides_apply() {
        let cli = Cli::parse_from([
            "querybar",
            "--dataset",
            "generic-metrics",
            "--feature",
            "on-demand-metrics-extraction",
            "--disallow-wildcard",
            "normalize",
            "a",
        ]);
        let mut config = QuerybarConfig::default();
        cli.overrides.apply(&mut config);
        assert!(config.disallow_wildcard);
        assert!(!config.disallow_free_text);
        assert_eq!(config.dataset, Some(Dataset::GenericMetrics));
        assert!(config.features.contains("on-demand-metrics-extraction"));
    }
}
