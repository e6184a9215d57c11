//! Query builder state and its reducer
//!
//! A [`QueryBuilderState`] is never mutated in place: [`QueryBuilderState::reduce`]
//! takes the current state and an [`Action`] and returns the next state. The
//! reducer has no side effects; the session decides when to notify handlers.

use super::splice;
use crate::query::{Configuration, ParsedQuery, parse_and_validate};
use serde::Serialize;
use tracing::debug;

/// An edit or lifecycle event applied to the state
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Replace the whole raw query
    UpdateQuery(String),
    /// Reset to the empty query
    Clear,
    /// Add `key:value` if absent, remove it if present
    ToggleFilter { key: String, value: String },
    /// Remove one token, or the whole filter it belongs to
    DeleteToken(usize),
    /// Replace the value of the filter containing token `index`
    UpdateFilterValue { index: usize, value: String },
    /// Mark the current query as committed
    Commit,
}

/// Raw query, its validated parse, and whether it changed since the last commit
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueryBuilderState {
    raw_query: String,
    parsed_query: ParsedQuery,
    is_dirty: bool,
}

impl QueryBuilderState {
    /// State seeded from the host's initial query
    #[must_use]
    pub fn new(initial: &str, config: &Configuration) -> Self {
        Self {
            raw_query: initial.to_string(),
            parsed_query: parse_and_validate(initial, config),
            is_dirty: false,
        }
    }

    #[must_use]
    pub fn raw_query(&self) -> &str {
        &self.raw_query
    }

    #[must_use]
    pub const fn parsed_query(&self) -> &ParsedQuery {
        &self.parsed_query
    }

    #[must_use]
    pub const fn is_dirty(&self) -> bool {
        self.is_dirty
    }

    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.parsed_query.is_valid()
    }

    /// Canonical query string handed to search handlers
    #[must_use]
    pub fn normalized(&self) -> String {
        self.parsed_query.normalized()
    }

    /// Compute the state that follows `action`
    ///
    /// Edits that cannot apply (an index past the end, a token that is not part of
    /// a filter, a toggle with a malformed key) leave the state unchanged.
    #[must_use]
    pub fn reduce(&self, action: Action, config: &Configuration) -> Self {
        match action {
            Action::UpdateQuery(text) => self.with_raw(text, config),
            Action::Clear => Self::new("", config),
            Action::ToggleFilter { key, value } => {
                match splice::toggle_filter(&self.parsed_query, &key, &value) {
                    Some(text) => self.with_raw(text, config),
                    None => {
                        debug!(key = %key, "toggle ignored, not a valid filter key");
                        self.clone()
                    }
                }
            }
            Action::DeleteToken(index) => match splice::delete_token(&self.parsed_query, index) {
                Some(text) => self.with_raw(text, config),
                None => {
                    debug!(index, "delete ignored, no token at index");
                    self.clone()
                }
            },
            Action::UpdateFilterValue { index, value } => {
                match splice::replace_filter_value(&self.parsed_query, index, &value) {
                    Some(text) => self.with_raw(text, config),
                    None => {
                        debug!(index, "value update ignored, token is not part of a filter");
                        self.clone()
                    }
                }
            }
            Action::Commit => Self {
                is_dirty: false,
                ..self.clone()
            },
        }
    }

    fn with_raw(&self, text: String, config: &Configuration) -> Self {
        if text == self.raw_query {
            return self.clone();
        }
        Self {
            parsed_query: parse_and_validate(&text, config),
            raw_query: text,
            is_dirty: true,
        }
    }
}
