//! Recent-search operations
//!
//! `RecentSearchManager` owns the storage path and reloads the TOML file on every
//! call, so several sessions can share one file.

use super::error::RecentSearchError;
use super::types::{RecentSearch, RecentSearchStorage, SavedSearchType};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Manager for recent searches stored in a TOML file
///
/// # Examples
///
/// ```no_run
/// use querybar::recent::{RecentSearchManager, SavedSearchType};
/// use std::path::PathBuf;
///
/// let manager = RecentSearchManager::new(PathBuf::from("/tmp/recent.toml"));
/// manager.record(SavedSearchType::Issue, "is:unresolved").unwrap();
/// let recent = manager.list(Some(SavedSearchType::Issue)).unwrap();
/// assert_eq!(recent[0].query, "is:unresolved");
/// ```
#[derive(Debug, Clone)]
pub struct RecentSearchManager {
    path: PathBuf,
    max_per_type: usize,
}

impl RecentSearchManager {
    pub const DEFAULT_MAX_PER_TYPE: usize = 10;

    #[must_use]
    pub const fn new(path: PathBuf) -> Self {
        Self {
            path,
            max_per_type: Self::DEFAULT_MAX_PER_TYPE,
        }
    }

    #[must_use]
    pub const fn with_max_per_type(mut self, max: usize) -> Self {
        self.max_per_type = max;
        self
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub const fn max_per_type(&self) -> usize {
        self.max_per_type
    }

    /// Load entries, empty when the file doesn't exist
    fn load(&self) -> Result<RecentSearchStorage, RecentSearchError> {
        if !self.path.exists() {
            return Ok(RecentSearchStorage::new());
        }

        let contents = fs::read_to_string(&self.path)?;
        let storage: RecentSearchStorage = toml::from_str(&contents)?;
        Ok(storage)
    }

    fn save(&self, storage: &RecentSearchStorage) -> Result<(), RecentSearchError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let toml = toml::to_string_pretty(storage)?;
        fs::write(&self.path, toml)?;

        Ok(())
    }

    /// Record a committed query
    ///
    /// A query already present moves to the front and its count goes up. The query
    /// is stored trimmed.
    ///
    /// # Errors
    ///
    /// Returns `RecentSearchError` if:
    /// - The query is blank
    /// - The storage file cannot be loaded or saved
    pub fn record(
        &self,
        search_type: SavedSearchType,
        query: &str,
    ) -> Result<RecentSearch, RecentSearchError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(RecentSearchError::EmptyQuery);
        }

        let mut storage = self.load()?;
        let entry = storage.touch(search_type, query).clone();
        let evicted = storage.evict(search_type, self.max_per_type);
        if evicted > 0 {
            debug!(%search_type, evicted, "evicted old recent searches");
        }

        self.save(&storage)?;
        Ok(entry)
    }

    /// Recent searches, most recent first, optionally of one type
    ///
    /// # Errors
    ///
    /// Returns `RecentSearchError` if the storage file cannot be loaded.
    pub fn list(
        &self,
        search_type: Option<SavedSearchType>,
    ) -> Result<Vec<RecentSearch>, RecentSearchError> {
        let storage = self.load()?;
        Ok(storage
            .searches
            .into_iter()
            .filter(|s| search_type.is_none_or(|kind| s.search_type == kind))
            .collect())
    }

    /// Forget one query
    ///
    /// # Errors
    ///
    /// Returns `RecentSearchError` if:
    /// - The query is not stored for that type
    /// - The storage file cannot be saved
    pub fn remove(
        &self,
        search_type: SavedSearchType,
        query: &str,
    ) -> Result<RecentSearch, RecentSearchError> {
        let mut storage = self.load()?;
        let index = storage
            .position(search_type, query)
            .ok_or_else(|| RecentSearchError::NotFound(query.to_string()))?;
        let entry = storage.searches.remove(index);
        self.save(&storage)?;
        Ok(entry)
    }

    /// Forget all queries, or only those of one type
    ///
    /// Returns the number of entries removed.
    ///
    /// # Errors
    ///
    /// Returns `RecentSearchError` if the storage file cannot be loaded or saved.
    pub fn clear(&self, search_type: Option<SavedSearchType>) -> Result<usize, RecentSearchError> {
        let mut storage = self.load()?;
        let before = storage.searches.len();
        storage
            .searches
            .retain(|s| search_type.is_some_and(|kind| s.search_type != kind));
        let removed = before - storage.searches.len();
        self.save(&storage)?;
        Ok(removed)
    }
}
