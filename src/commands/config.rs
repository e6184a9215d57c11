//! Config command - show, locate or create the configuration file

use crate::{
    QuerybarError,
    cli::ConfigCommands,
    config::{QuerybarConfig, first_time_setup},
};
use std::path::Path;

type Result<T> = std::result::Result<T, QuerybarError>;

/// Execute a config subcommand
///
/// `config` is the effective configuration, `path` the file it was loaded from.
pub fn execute(config: &QuerybarConfig, path: &Path, command: &ConfigCommands, json: bool, quiet: bool) -> Result<()> {
    match command {
        ConfigCommands::Show => {
            if json {
                println!("{}", serde_json::to_string_pretty(config)?);
            } else {
                let toml_string = toml::to_string_pretty(config).map_err(|e| {
                    ::config::ConfigError::Message(format!("Failed to serialize config: {e}"))
                })?;
                print!("{toml_string}");
            }
        }
        ConfigCommands::Path => {
            println!("{}", path.display());
        }
        ConfigCommands::Init { defaults } => {
            if path.exists() {
                return Err(QuerybarError::InvalidInput(format!(
                    "Configuration already exists at {}",
                    path.display()
                )));
            }
            if *defaults {
                QuerybarConfig::default().save_to(path)?;
                if !quiet {
                    println!("Configuration saved to {}", path.display());
                }
            } else {
                first_time_setup(path)?;
            }
        }
    }
    Ok(())
}
