//! Search dispatch
//!
//! The [`SearchDispatcher`] decides whether a commit reaches the host's
//! [`SearchHandler`]. It remembers only the last dispatched query and suppresses a
//! commit whose normalized query equals it.

use super::session::Phase;
use super::state::QueryBuilderState;
use crate::query::ParsedQuery;
use tracing::{debug, info};

/// What handlers receive alongside the query string
#[derive(Debug, Clone, Copy)]
pub struct CallbackSearchState<'a> {
    pub parsed_query: &'a ParsedQuery,
    pub query_is_valid: bool,
    /// Session phase when the callback fires; `PendingCommit` inside `on_search`
    pub phase: Phase,
}

impl<'a> CallbackSearchState<'a> {
    #[must_use]
    pub fn from_state(state: &'a QueryBuilderState, phase: Phase) -> Self {
        Self {
            parsed_query: state.parsed_query(),
            query_is_valid: state.is_valid(),
            phase,
        }
    }
}

/// Host callbacks
///
/// Only `on_search` is required. `on_change` fires when an edit changes the raw
/// query; `on_blur` fires on every blur before the commit attempt.
pub trait SearchHandler {
    fn on_search(&mut self, query: &str, state: CallbackSearchState<'_>);

    fn on_change(&mut self, _query: &str, _state: CallbackSearchState<'_>) {}

    fn on_blur(&mut self, _query: &str, _state: CallbackSearchState<'_>) {}
}

/// Adapts a closure into a [`SearchHandler`] that only handles searches
pub struct FnHandler<F>(pub F);

impl<F> SearchHandler for FnHandler<F>
where
    F: FnMut(&str, CallbackSearchState<'_>),
{
    fn on_search(&mut self, query: &str, state: CallbackSearchState<'_>) {
        (self.0)(query, state);
    }
}

/// Handler that ignores everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopHandler;

impl SearchHandler for NoopHandler {
    fn on_search(&mut self, _query: &str, _state: CallbackSearchState<'_>) {}
}

/// Result of a commit attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOutcome {
    /// The handler was called with a new query
    Dispatched,
    /// The query matched the last dispatched one, nothing was called
    Suppressed,
}

impl CommitOutcome {
    #[must_use]
    pub const fn is_dispatched(self) -> bool {
        matches!(self, Self::Dispatched)
    }
}

/// Single-slot memory of the last dispatched query
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchDispatcher {
    last_committed: Option<String>,
}

impl SearchDispatcher {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            last_committed: None,
        }
    }

    /// Dispatcher that treats `query` as already committed
    #[must_use]
    pub fn seeded(query: impl Into<String>) -> Self {
        Self {
            last_committed: Some(query.into()),
        }
    }

    #[must_use]
    pub fn last_committed(&self) -> Option<&str> {
        self.last_committed.as_deref()
    }

    /// Hand the state's normalized query to `handler` unless it was the last one
    pub fn commit(
        &mut self,
        state: &QueryBuilderState,
        handler: &mut dyn SearchHandler,
    ) -> CommitOutcome {
        let query = state.normalized();
        if self.last_committed.as_deref() == Some(query.as_str()) {
            debug!(query = %query, "commit suppressed, query unchanged");
            return CommitOutcome::Suppressed;
        }

        info!(query = %query, valid = state.is_valid(), "dispatching search");
        handler.on_search(
            &query,
            CallbackSearchState::from_state(state, Phase::PendingCommit),
        );
        self.last_committed = Some(query);
        CommitOutcome::Dispatched
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::state::Action;
    use crate::testing::{RecordingHandler, issue_config};

    #[test]
    fn test_commit_dispatches_once_per_value() {
        let config = issue_config();
        let state = QueryBuilderState::new("is:unresolved", &config);
        let mut dispatcher = SearchDispatcher::new();
        let mut handler = RecordingHandler::default();

        assert_eq!(dispatcher.commit(&state, &mut handler), CommitOutcome::Dispatched);
        assert_eq!(dispatcher.commit(&state, &mut handler), CommitOutcome::Suppressed);
        assert_eq!(handler.searches(), vec![("is:unresolved".to_string(), true)]);
    }

    #[test]
    fn test_commit_compares_normalized_text() {
        let config = issue_config();
        let mut dispatcher = SearchDispatcher::new();
        let mut handler = RecordingHandler::default();

        let state = QueryBuilderState::new("foo  bar", &config);
        dispatcher.commit(&state, &mut handler);
        let state = state.reduce(Action::UpdateQuery("  foo bar ".into()), &config);
        assert_eq!(dispatcher.commit(&state, &mut handler), CommitOutcome::Suppressed);
        assert_eq!(handler.searches().len(), 1);
        assert_eq!(dispatcher.last_committed(), Some("foo bar"));
    }

    #[test]
    fn test_seeded_dispatcher_suppresses_initial() {
        let config = issue_config();
        let state = QueryBuilderState::new("", &config);
        let mut dispatcher = SearchDispatcher::seeded("");
        assert_eq!(
            dispatcher.commit(&state, &mut NoopHandler),
            CommitOutcome::Suppressed
        );
    }

    #[test]
    fn test_fn_handler_receives_validity() {
        let config = crate::query::Configuration::builder()
            .filter_keys(crate::testing::issue_keys())
            .disallow_free_text(true)
            .build();
        let state = QueryBuilderState::new("oops", &config);
        let mut seen = Vec::new();
        {
            let mut handler = FnHandler(|query: &str, state: CallbackSearchState<'_>| {
                seen.push((query.to_string(), state.query_is_valid, state.phase));
            });
            SearchDispatcher::new().commit(&state, &mut handler);
        }
        assert_eq!(seen, vec![("oops".to_string(), false, Phase::PendingCommit)]);
    }
}
