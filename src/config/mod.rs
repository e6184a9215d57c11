//! Configuration module for querybar
//!
//! Holds the search configuration the CLI builds its sessions from: the four
//! `disallow_*` flags, the dataset and feature flags that restrict keys, message
//! overrides, the filter-key table and the recent-search store.
//!
//! Configuration is stored in the user's config directory and can be
//! overridden per field with `QUERYBAR_*` environment variables.

mod setup;

pub use setup::first_time_setup;

use crate::keys::{Dataset, FeatureFlags, FilterKeyTable};
use crate::lookup::provider::StaticTagValues;
use crate::query::{Configuration, InvalidReason};
use crate::recent::{RecentSearchManager, default_recent_path};
use config::{Config, ConfigError, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Where recent searches are kept
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecentConfig {
    /// Storage file, `~/.config/querybar/recent.toml` when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,

    /// Entries kept per search type
    #[serde(default = "default_max_per_type")]
    pub max_per_type: usize,
}

const fn default_max_per_type() -> usize {
    RecentSearchManager::DEFAULT_MAX_PER_TYPE
}

impl Default for RecentConfig {
    fn default() -> Self {
        Self {
            path: None,
            max_per_type: default_max_per_type(),
        }
    }
}

/// Application configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuerybarConfig {
    /// Flag bare words and quoted phrases
    #[serde(default)]
    pub disallow_free_text: bool,

    /// Flag `AND`, `OR` and parentheses
    #[serde(default)]
    pub disallow_logical_operators: bool,

    /// Flag filter keys outside the supported set
    #[serde(default)]
    pub disallow_unsupported_filters: bool,

    /// Flag `*` in free text and filter values
    #[serde(default)]
    pub disallow_wildcard: bool,

    /// Dataset whose key restrictions apply
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dataset: Option<Dataset>,

    /// Organization feature flags, only consulted with a dataset
    #[serde(default)]
    pub features: FeatureFlags,

    /// Replacement messages keyed by reason code, e.g. `free_text_not_allowed`
    #[serde(default)]
    pub invalid_messages: BTreeMap<String, String>,

    /// Extra suggestion values per key, on top of the key table's own lists
    #[serde(default)]
    pub tag_values: BTreeMap<String, Vec<String>>,

    #[serde(default)]
    pub recent: RecentConfig,

    /// Known filter keys
    #[serde(default = "FilterKeyTable::issue_defaults")]
    pub filter_keys: FilterKeyTable,
}

impl Default for QuerybarConfig {
    fn default() -> Self {
        Self {
            disallow_free_text: false,
            disallow_logical_operators: false,
            disallow_unsupported_filters: false,
            disallow_wildcard: false,
            dataset: None,
            features: FeatureFlags::new(),
            invalid_messages: BTreeMap::new(),
            tag_values: BTreeMap::new(),
            recent: RecentConfig::default(),
            filter_keys: FilterKeyTable::issue_defaults(),
        }
    }
}

impl QuerybarConfig {
    /// Get the path to the config file
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the system config directory cannot be determined.
    pub fn config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or_else(|| {
            ConfigError::Message("Could not determine config directory".to_string())
        })?;

        Ok(config_dir.join("querybar").join("config.toml"))
    }

    /// Load configuration from the default path
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the config path cannot be determined or the file
    /// cannot be parsed.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load configuration from `path`, layering `QUERYBAR_*` variables on top
    ///
    /// A missing file yields the defaults.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file or an environment override cannot be parsed.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        debug!(path = %path.display(), exists = path.exists(), "loading configuration");

        let settings = Config::builder()
            .add_source(
                File::from(path.to_path_buf())
                    .format(FileFormat::Toml)
                    .required(false),
            )
            .add_source(Environment::with_prefix("QUERYBAR").try_parsing(true))
            .build()?;

        settings.try_deserialize()
    }

    /// Save configuration to the default path
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the config path cannot be determined or writing fails.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::config_path()?)
    }

    /// Save configuration to `path`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the config directory cannot be created, the configuration
    /// cannot be serialized to TOML, or the file cannot be written.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                ConfigError::Message(format!("Failed to create config directory: {e}"))
            })?;
        }

        let toml_string = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::Message(format!("Failed to serialize config: {e}")))?;

        fs::write(path, toml_string)
            .map_err(|e| ConfigError::Message(format!("Failed to write config file: {e}")))?;

        Ok(())
    }

    /// Build the validator configuration
    ///
    /// Message overrides with an unknown reason code are skipped with a warning.
    #[must_use]
    pub fn configuration(&self) -> Configuration {
        let mut builder = Configuration::builder()
            .disallow_free_text(self.disallow_free_text)
            .disallow_logical_operators(self.disallow_logical_operators)
            .disallow_unsupported_filters(self.disallow_unsupported_filters)
            .disallow_wildcard(self.disallow_wildcard)
            .filter_keys(self.filter_keys.clone());

        if let Some(dataset) = self.dataset {
            builder = builder.dataset(dataset, &self.features);
        }

        for (code, message) in &self.invalid_messages {
            match InvalidReason::from_code(code) {
                Some(reason) => builder = builder.invalid_message(reason, message.clone()),
                None => warn!(code = %code, "ignoring message for unknown reason code"),
            }
        }

        builder.build()
    }

    /// Suggestion source seeded from the key table and `tag_values`
    #[must_use]
    pub fn tag_value_source(&self) -> StaticTagValues {
        let mut source =
            StaticTagValues::from_table(&self.filter_keys, StaticTagValues::DEFAULT_LIMIT);
        for (key, values) in &self.tag_values {
            source.insert(key.clone(), values.clone());
        }
        source
    }

    /// Recent-search store at the configured or default path
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if no path is configured and the config directory
    /// cannot be determined.
    pub fn recent_manager(&self) -> Result<RecentSearchManager, ConfigError> {
        let path = match &self.recent.path {
            Some(path) => path.clone(),
            None => default_recent_path()
                .map_err(|e| ConfigError::Message(e.to_string()))?,
        };
        Ok(RecentSearchManager::new(path).with_max_per_type(self.recent.max_per_type))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lookup::TagValueSource;
    use crate::query::{parse_and_validate, InvalidReason};
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = QuerybarConfig::default();
        assert!(!config.disallow_free_text);
        assert!(config.dataset.is_none());
        assert!(config.filter_keys.contains("is"));
        assert_eq!(config.recent.max_per_type, 10);
    }

    #[test]
    fn test_load_missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let config = QuerybarConfig::load_from(&dir.path().join("config.toml")).unwrap();
        assert_eq!(config.filter_keys, FilterKeyTable::issue_defaults());
        assert!(config.invalid_messages.is_empty());
    }

    #[test]
    fn test_load_from_toml() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            r#"
disallow_free_text = true
dataset = "transactions"
features = ["alert-allow-indexed"]

[invalid_messages]
free_text_not_allowed = "Use filters only"

[recent]
max_per_type = 3

[[filter_keys]]
key = "release"
kind = "string"

[[filter_keys]]
key = "duration"
kind = "duration"
"#,
        )
        .unwrap();

        let config = QuerybarConfig::load_from(&path).unwrap();
        assert!(config.disallow_free_text);
        assert_eq!(config.dataset, Some(Dataset::Transactions));
        assert!(config.features.contains("alert-allow-indexed"));
        assert_eq!(config.recent.max_per_type, 3);
        assert_eq!(config.filter_keys.len(), 2);
    }

    #[test]
    fn test_save_and_reload() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = QuerybarConfig::default();
        config.disallow_wildcard = true;
        config
            .tag_values
            .insert("browser".to_string(), vec!["Chrome".to_string()]);
        config.save_to(&path).unwrap();

        let loaded = QuerybarConfig::load_from(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_configuration_applies_flags_and_messages() {
        let mut config = QuerybarConfig::default();
        config.disallow_free_text = true;
        config
            .invalid_messages
            .insert("free_text_not_allowed".to_string(), "Filters only".to_string());
        config
            .invalid_messages
            .insert("no_such_reason".to_string(), "ignored".to_string());

        let configuration = config.configuration();
        assert!(configuration.disallow_free_text());
        assert_eq!(
            configuration.invalid_message(InvalidReason::FreeTextNotAllowed),
            Some("Filters only")
        );

        let parsed = parse_and_validate("oops", &configuration);
        assert!(!parsed.is_valid());
    }

    #[test]
    fn test_tag_value_source_merges_extra_values() {
        let mut config = QuerybarConfig::default();
        config.tag_values.insert(
            "browser".to_string(),
            vec!["Chrome".to_string(), "Firefox".to_string()],
        );

        let source = config.tag_value_source();
        assert_eq!(source.tag_values("browser", "fire"), vec!["Firefox"]);
        assert!(!source.tag_values("is", "").is_empty());
    }

    #[test]
    fn test_recent_manager_uses_configured_path() {
        let dir = TempDir::new().unwrap();
        let mut config = QuerybarConfig::default();
        config.recent.path = Some(dir.path().join("recent.toml"));
        config.recent.max_per_type = 4;

        let manager = config.recent_manager().unwrap();
        assert_eq!(manager.path(), dir.path().join("recent.toml"));
        assert_eq!(manager.max_per_type(), 4);
    }
}
