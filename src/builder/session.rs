//! Search session
//!
//! [`SearchQueryBuilder`] ties the reducer, the dispatcher and the host callbacks
//! together and tracks which phase the search box is in:
//!
//! - `Idle`: nothing typed since the last commit
//! - `Editing`: the raw query changed since the last commit
//! - `PendingCommit`: a blur or submit is being dispatched
//!
//! Commits are synchronous, so `PendingCommit` only lasts while the search
//! handler runs. Handlers see it in [`CallbackSearchState::phase`]; callers
//! of [`SearchQueryBuilder::phase`] always find the session `Idle` again.
//!
//! ```
//! use querybar::builder::{FnHandler, SearchQueryBuilder};
//! use querybar::keys::FilterKeyTable;
//! use querybar::query::Configuration;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Configuration::builder()
//!     .filter_keys(FilterKeyTable::issue_defaults())
//!     .build();
//!
//! let mut session = SearchQueryBuilder::builder()
//!     .configuration(config)
//!     .initial_query("is:unresolved")
//!     .handler(FnHandler(|query: &str, _state: querybar::builder::CallbackSearchState<'_>| {
//!         println!("searching for {query}");
//!     }))
//!     .build()?;
//!
//! session.update_query("is:unresolved assigned:me");
//! assert!(session.submit().is_dispatched());
//! assert!(!session.submit().is_dispatched());
//! # Ok(())
//! # }
//! ```

use super::dispatch::{CallbackSearchState, CommitOutcome, NoopHandler, SearchDispatcher, SearchHandler};
use super::error::SessionError;
use super::state::{Action, QueryBuilderState};
use crate::lookup::{LookupTicket, TagValueSource};
use crate::query::Configuration;
use crate::recent::{RecentSearchManager, SavedSearchType};
use tracing::{debug, warn};

/// Where the session is in its edit/commit cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    Editing,
    PendingCommit,
}

/// Interactive search session
pub struct SearchQueryBuilder {
    config: Configuration,
    state: QueryBuilderState,
    dispatcher: SearchDispatcher,
    handler: Box<dyn SearchHandler>,
    recent: Option<(RecentSearchManager, SavedSearchType)>,
    phase: Phase,
    disabled: bool,
    lookup_generation: u64,
}

impl SearchQueryBuilder {
    /// Create a new builder for constructing a `SearchQueryBuilder`
    #[must_use]
    pub fn builder() -> SessionBuilder {
        SessionBuilder::new()
    }

    #[must_use]
    pub const fn state(&self) -> &QueryBuilderState {
        &self.state
    }

    #[must_use]
    pub const fn config(&self) -> &Configuration {
        &self.config
    }

    #[must_use]
    pub const fn phase(&self) -> Phase {
        self.phase
    }

    #[must_use]
    pub const fn is_disabled(&self) -> bool {
        self.disabled
    }

    pub const fn set_disabled(&mut self, disabled: bool) {
        self.disabled = disabled;
    }

    /// Last query handed to the search handler
    #[must_use]
    pub fn last_committed(&self) -> Option<&str> {
        self.dispatcher.last_committed()
    }

    /// Apply an action
    ///
    /// `Clear` and `Commit` also commit; their outcome is returned. Every other
    /// action returns `None`. A disabled session ignores the action.
    pub fn dispatch(&mut self, action: Action) -> Option<CommitOutcome> {
        if self.disabled {
            debug!(?action, "session disabled, ignoring action");
            return None;
        }

        match action {
            Action::Commit => return Some(self.commit()),
            Action::UpdateQuery(_) => self.lookup_generation += 1,
            _ => {}
        }

        let is_clear = matches!(action, Action::Clear);
        let next = self.state.reduce(action, &self.config);
        let changed = next.raw_query() != self.state.raw_query();
        self.state = next;

        if changed {
            self.phase = Phase::Editing;
            self.handler.on_change(
                self.state.raw_query(),
                CallbackSearchState::from_state(&self.state, self.phase),
            );
        }

        if is_clear {
            self.phase = Phase::Idle;
            return Some(self.commit());
        }
        None
    }

    pub fn update_query(&mut self, text: impl Into<String>) {
        self.dispatch(Action::UpdateQuery(text.into()));
    }

    pub fn toggle_filter(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.dispatch(Action::ToggleFilter {
            key: key.into(),
            value: value.into(),
        });
    }

    /// Reset to the empty query and commit it
    pub fn clear(&mut self) -> CommitOutcome {
        self.dispatch(Action::Clear)
            .unwrap_or(CommitOutcome::Suppressed)
    }

    /// Focus left the search box
    pub fn blur(&mut self) -> CommitOutcome {
        if self.disabled {
            return CommitOutcome::Suppressed;
        }
        self.handler
            .on_blur(
                self.state.raw_query(),
                CallbackSearchState::from_state(&self.state, self.phase),
            );
        self.commit()
    }

    /// Explicit submit (enter key)
    pub fn submit(&mut self) -> CommitOutcome {
        if self.disabled {
            return CommitOutcome::Suppressed;
        }
        self.commit()
    }

    fn commit(&mut self) -> CommitOutcome {
        self.phase = Phase::PendingCommit;
        let outcome = self.dispatcher.commit(&self.state, self.handler.as_mut());
        if outcome.is_dispatched() {
            self.record_recent();
        }
        self.state = self.state.reduce(Action::Commit, &self.config);
        self.phase = Phase::Idle;
        outcome
    }

    fn record_recent(&self) {
        let Some((manager, search_type)) = &self.recent else {
            return;
        };
        let query = self.state.normalized();
        if query.is_empty() {
            return;
        }
        if let Err(e) = manager.record(*search_type, &query) {
            warn!(error = %e, query = %query, "failed to record recent search");
        }
    }

    /// Ticket for a tag-value lookup against the current query
    #[must_use]
    pub fn begin_lookup(&self, key: &str, partial: &str) -> LookupTicket {
        LookupTicket::new(self.lookup_generation, key, partial)
    }

    /// Accept lookup results unless the query changed since the ticket was issued
    #[must_use]
    pub fn accept_lookup(&self, ticket: &LookupTicket, values: Vec<String>) -> Option<Vec<String>> {
        if ticket.generation() == self.lookup_generation {
            Some(values)
        } else {
            debug!(
                key = ticket.key(),
                ticket = ticket.generation(),
                current = self.lookup_generation,
                "discarding stale tag values"
            );
            None
        }
    }

    /// Issue a ticket and ask `source` for values in one step
    pub fn lookup_tag_values<S>(&self, source: &S, key: &str, partial: &str) -> (LookupTicket, Vec<String>)
    where
        S: TagValueSource + ?Sized,
    {
        let ticket = self.begin_lookup(key, partial);
        let values = source.tag_values(key, partial);
        (ticket, values)
    }
}

/// Builder for `SearchQueryBuilder`
///
/// Only the configuration is required.
#[derive(Default)]
pub struct SessionBuilder {
    configuration: Option<Configuration>,
    initial_query: String,
    handler: Option<Box<dyn SearchHandler>>,
    recent: Option<(RecentSearchManager, SavedSearchType)>,
    disabled: bool,
}

impl SessionBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the validation configuration (required)
    #[must_use]
    pub fn configuration(mut self, configuration: Configuration) -> Self {
        self.configuration = Some(configuration);
        self
    }

    #[must_use]
    pub fn initial_query(mut self, query: impl Into<String>) -> Self {
        self.initial_query = query.into();
        self
    }

    #[must_use]
    pub fn handler(mut self, handler: impl SearchHandler + 'static) -> Self {
        self.handler = Some(Box::new(handler));
        self
    }

    /// Remember dispatched queries under `search_type`
    #[must_use]
    pub fn recent_searches(mut self, manager: RecentSearchManager, search_type: SavedSearchType) -> Self {
        self.recent = Some((manager, search_type));
        self
    }

    #[must_use]
    pub const fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    /// Build the `SearchQueryBuilder`
    ///
    /// The initial query counts as already committed, so blurring an untouched
    /// search box does not trigger a search.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::BuildError` if no configuration was provided.
    pub fn build(self) -> Result<SearchQueryBuilder, SessionError> {
        let config = self
            .configuration
            .ok_or_else(|| SessionError::BuildError("Configuration is required".to_string()))?;

        let state = QueryBuilderState::new(&self.initial_query, &config);
        let dispatcher = SearchDispatcher::seeded(state.normalized());

        Ok(SearchQueryBuilder {
            config,
            state,
            dispatcher,
            handler: self.handler.unwrap_or_else(|| Box::new(NoopHandler)),
            recent: self.recent,
            phase: Phase::Idle,
            disabled: self.disabled,
            lookup_generation: 0,
        })
    }
}
