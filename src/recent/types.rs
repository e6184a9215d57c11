//! Recent-search data structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which kind of search a query belongs to
///
/// Recent searches are kept separately per type so an issue search never suggests
/// a query written for replays.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum SavedSearchType {
    #[default]
    Issue,
    Event,
    Session,
    Replay,
    Metric,
    Span,
    Error,
    Transaction,
}

impl SavedSearchType {
    pub const ALL: [Self; 8] = [
        Self::Issue,
        Self::Event,
        Self::Session,
        Self::Replay,
        Self::Metric,
        Self::Span,
        Self::Error,
        Self::Transaction,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Issue => "issue",
            Self::Event => "event",
            Self::Session => "session",
            Self::Replay => "replay",
            Self::Metric => "metric",
            Self::Span => "span",
            Self::Error => "error",
            Self::Transaction => "transaction",
        }
    }
}

impl fmt::Display for SavedSearchType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for SavedSearchType {
    type Error = String;

    fn try_from(value: &str) -> Result<Self, String> {
        let lower = value.to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == lower)
            .ok_or_else(|| format!("unknown search type '{value}'"))
    }
}

/// One remembered query
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RecentSearch {
    pub search_type: SavedSearchType,

    pub query: String,

    /// When the query was last committed
    pub last_seen: DateTime<Utc>,

    /// Number of times the query was committed
    #[serde(default)]
    pub use_count: u32,
}

impl RecentSearch {
    #[must_use]
    pub fn new(search_type: SavedSearchType, query: String) -> Self {
        Self {
            search_type,
            query,
            last_seen: Utc::now(),
            use_count: 1,
        }
    }

    /// Bump the count and timestamp
    pub fn record_use(&mut self) {
        self.use_count += 1;
        self.last_seen = Utc::now();
    }
}

/// Container for all recent searches, most recent first
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct RecentSearchStorage {
    #[serde(default)]
    pub searches: Vec<RecentSearch>,
}

impl RecentSearchStorage {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            searches: Vec::new(),
        }
    }

    #[must_use]
    pub fn position(&self, search_type: SavedSearchType, query: &str) -> Option<usize> {
        self.searches
            .iter()
            .position(|s| s.search_type == search_type && s.query == query)
    }

    /// Insert or bump `query` and move it to the front
    pub fn touch(&mut self, search_type: SavedSearchType, query: &str) -> &RecentSearch {
        let entry = match self.position(search_type, query) {
            Some(index) => {
                let mut entry = self.searches.remove(index);
                entry.record_use();
                entry
            }
            None => RecentSearch::new(search_type, query.to_string()),
        };
        self.searches.insert(0, entry);
        &self.searches[0]
    }

    /// Drop the oldest entries of `search_type` beyond `max`
    ///
    /// Returns the number of entries removed.
    pub fn evict(&mut self, search_type: SavedSearchType, max: usize) -> usize {
        let mut seen = 0;
        let before = self.searches.len();
        self.searches.retain(|s| {
            if s.search_type != search_type {
                return true;
            }
            seen += 1;
            seen <= max
        });
        before - self.searches.len()
    }

    pub fn of_type(&self, search_type: SavedSearchType) -> impl Iterator<Item = &RecentSearch> {
        self.searches
            .iter()
            .filter(move |s| s.search_type == search_type)
    }
}
