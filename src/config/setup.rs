//! Interactive setup wizard for `querybar config init`
//!
//! Prompts for the dataset and the `disallow_*` flags, then writes the result to
//! the given path.

use super::QuerybarConfig;
use crate::keys::Dataset;
use config::ConfigError;
use dialoguer::{Confirm, Select, theme::ColorfulTheme};
use std::path::Path;

fn confirm(theme: &ColorfulTheme, prompt: &str) -> Result<bool, ConfigError> {
    Confirm::with_theme(theme)
        .with_prompt(prompt)
        .default(false)
        .interact()
        .map_err(|e| ConfigError::Message(format!("Failed to read input: {e}")))
}

/// Interactive first-time setup
///
/// # Errors
///
/// Returns `ConfigError` if user input cannot be read or the configuration
/// cannot be saved.
pub fn first_time_setup(path: &Path) -> Result<QuerybarConfig, ConfigError> {
    println!("Welcome to querybar! Let's set up your search configuration.\n");

    let theme = ColorfulTheme::default();

    let mut choices = vec!["none".to_string()];
    choices.extend(Dataset::ALL.iter().map(ToString::to_string));
    let picked = Select::with_theme(&theme)
        .with_prompt("Dataset")
        .items(&choices)
        .default(0)
        .interact()
        .map_err(|e| ConfigError::Message(format!("Failed to read input: {e}")))?;

    let mut config = QuerybarConfig {
        dataset: picked.checked_sub(1).and_then(|i| Dataset::ALL.get(i).copied()),
        ..QuerybarConfig::default()
    };
    config.disallow_free_text = confirm(&theme, "Disallow free text?")?;
    config.disallow_logical_operators = confirm(&theme, "Disallow AND, OR and parentheses?")?;
    config.disallow_unsupported_filters = confirm(&theme, "Disallow unknown filter keys?")?;
    config.disallow_wildcard = confirm(&theme, "Disallow wildcards?")?;

    config.save_to(path)?;

    println!("\nConfiguration saved to {}", path.display());
    Ok(config)
}
