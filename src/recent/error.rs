//! Error types for recent-search persistence

use std::io;
use thiserror::Error;

/// Errors that can occur while reading or writing recent searches
#[derive(Debug, Error)]
pub enum RecentSearchError {
    /// No entry for the query
    #[error("Recent search '{0}' not found")]
    NotFound(String),

    /// Blank queries are never recorded
    #[error("Cannot record an empty query")]
    EmptyQuery,

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
}

impl From<toml::de::Error> for RecentSearchError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<toml::ser::Error> for RecentSearchError {
    fn from(err: toml::ser::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod error_tests;
