//! Recent searches
//!
//! Every dispatched query can be remembered per [`SavedSearchType`], so a search
//! box can offer what the user ran before.
//!
//! # Storage
//!
//! Entries are stored in TOML format at `~/.config/querybar/recent.toml` by default.
//! The location and the number of entries kept per type can be changed in the
//! querybar configuration.

pub mod error;
pub mod operations;
pub mod types;

pub use error::RecentSearchError;
pub use operations::RecentSearchManager;
pub use types::{RecentSearch, RecentSearchStorage, SavedSearchType};

use std::path::PathBuf;

/// Get the default recent-search storage path
///
/// Returns `~/.config/querybar/recent.toml` (platform-specific)
///
/// # Errors
///
/// Returns `RecentSearchError` if the config directory cannot be determined
pub fn default_recent_path() -> Result<PathBuf, RecentSearchError> {
    let config_dir = dirs::config_dir().ok_or_else(|| {
        RecentSearchError::Config(config::ConfigError::Message(
            "Could not determine config directory".to_string(),
        ))
    })?;

    Ok(config_dir.join("querybar").join("recent.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_recent_path() {
        let path = default_recent_path().unwrap();
        assert!(path.to_string_lossy().contains("querybar"));
        assert!(path.to_string_lossy().ends_with("recent.toml"));
    }
}
