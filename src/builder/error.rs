//! Session error types
//!
//! Editing and committing never fail; invalid queries are reported through token
//! validity. The only error is assembling a session without what it needs.

use thiserror::Error;

/// Errors raised while constructing a `SearchQueryBuilder`
#[derive(Debug, Error)]
pub enum SessionError {
    /// A required builder field was not provided
    #[error("Failed to build search session: {0}")]
    BuildError(String),
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod error_tests;
