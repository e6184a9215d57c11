//! Tag-value lookups for suggestion lists
//!
//! The query builder never interprets suggested values; it only passes a filter key
//! and the partial text the user typed to a [`TagValueSource`]. Each lookup is
//! tagged with a [`LookupTicket`] so the session can discard results that arrive
//! after the query has moved on.

pub mod provider;

pub use provider::{CachedTagValues, StaticTagValues};

/// Something that can suggest values for a filter key
pub trait TagValueSource {
    /// Values for `key` matching the partially typed `partial`
    fn tag_values(&self, key: &str, partial: &str) -> Vec<String>;
}

impl<T: TagValueSource + ?Sized> TagValueSource for Box<T> {
    fn tag_values(&self, key: &str, partial: &str) -> Vec<String> {
        (**self).tag_values(key, partial)
    }
}

/// Identifies one lookup against the query generation it was issued for
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LookupTicket {
    generation: u64,
    key: String,
    partial: String,
}

impl LookupTicket {
    #[must_use]
    pub(crate) fn new(generation: u64, key: impl Into<String>, partial: impl Into<String>) -> Self {
        Self {
            generation,
            key: key.into(),
            partial: partial.into(),
        }
    }

    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    #[must_use]
    pub fn partial(&self) -> &str {
        &self.partial
    }
}
