//! Querybar - structured search queries for search boxes
//!
//! This library tokenizes `key:value` search queries, validates them against a
//! configurable set of filter keys and restrictions, and drives a search box
//! through edits, commits and recent-search bookkeeping.
//!
//! - [`query`]: lexer, tokens and validation
//! - [`keys`]: filter-key tables and per-dataset key restrictions
//! - [`builder`]: the query builder reducer and search session
//! - [`lookup`]: tag-value suggestion sources
//! - [`recent`]: recent-search storage

use thiserror::Error;

pub mod builder;
pub mod cli;
pub mod commands;
pub mod config;
pub mod keys;
pub mod lookup;
pub mod output;
pub mod query;
pub mod recent;

#[cfg(test)]
pub mod testing;

/// Error enum, contains all failure states of the program
#[derive(Debug, Error)]
pub enum QuerybarError {
    /// Search session error
    #[error("Session error: {0}")]
    SessionError(#[from] builder::SessionError),
    /// Recent-search storage error
    #[error("Recent search error: {0}")]
    RecentSearchError(#[from] recent::RecentSearchError),
    /// Represents a configuration error
    #[error("Configuration error: {0}")]
    ConfigError(#[from] ::config::ConfigError),
    /// Represents an I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
    /// JSON output error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
    /// Interactive prompt error
    #[error("Prompt error: {0}")]
    PromptError(#[from] dialoguer::Error),
    /// Invalid input error
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
