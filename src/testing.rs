//! Testing utilities for querybar
//!
//! This module provides shared fixtures and a [`RecordingHandler`] that remembers
//! every callback a session makes.
//!
//! Only available when compiled with `cfg(test)`.

use crate::builder::{CallbackSearchState, Phase, SearchHandler};
use crate::keys::FilterKeyTable;
use crate::query::Configuration;
use std::cell::RefCell;
use std::rc::Rc;

/// The issue-search key table
#[must_use]
pub fn issue_keys() -> FilterKeyTable {
    FilterKeyTable::issue_defaults()
}

/// Permissive configuration over the issue-search keys
#[must_use]
pub fn issue_config() -> Configuration {
    Configuration::builder().filter_keys(issue_keys()).build()
}

#[derive(Debug, Default)]
struct HandlerLog {
    searches: Vec<(String, bool)>,
    changes: Vec<String>,
    blurs: Vec<String>,
    phases: Vec<(&'static str, Phase)>,
}

/// Handler that records callbacks
///
/// Clones share one log, so a test can hand a clone to a session and inspect the
/// original afterwards.
///
/// # Examples
/// ```ignore
/// let handler = RecordingHandler::default();
/// let mut session = SearchQueryBuilder::builder()
///     .configuration(issue_config())
///     .handler(handler.clone())
///     .build()
///     .unwrap();
/// session.update_query("is:unresolved");
/// session.submit();
/// assert_eq!(handler.searches(), vec![("is:unresolved".to_string(), true)]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct RecordingHandler {
    log: Rc<RefCell<HandlerLog>>,
}

impl RecordingHandler {
    /// Dispatched searches with their validity, oldest first
    #[must_use]
    pub fn searches(&self) -> Vec<(String, bool)> {
        self.log.borrow().searches.clone()
    }

    #[must_use]
    pub fn changes(&self) -> Vec<String> {
        self.log.borrow().changes.clone()
    }

    #[must_use]
    pub fn blurs(&self) -> Vec<String> {
        self.log.borrow().blurs.clone()
    }

    /// Every callback with the phase it was made in, oldest first
    #[must_use]
    pub fn phases(&self) -> Vec<(&'static str, Phase)> {
        self.log.borrow().phases.clone()
    }
}

impl SearchHandler for RecordingHandler {
    fn on_search(&mut self, query: &str, state: CallbackSearchState<'_>) {
        let mut log = self.log.borrow_mut();
        log.searches.push((query.to_string(), state.query_is_valid));
        log.phases.push(("search", state.phase));
    }

    fn on_change(&mut self, query: &str, state: CallbackSearchState<'_>) {
        let mut log = self.log.borrow_mut();
        log.changes.push(query.to_string());
        log.phases.push(("change", state.phase));
    }

    fn on_blur(&mut self, query: &str, state: CallbackSearchState<'_>) {
        let mut log = self.log.borrow_mut();
        log.blurs.push(query.to_string());
        log.phases.push(("blur", state.phase));
    }
}
