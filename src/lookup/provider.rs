//! In-memory and cached tag-value sources

use super::TagValueSource;
use crate::keys::FilterKeyTable;
use moka::sync::Cache;
use std::collections::HashMap;
use std::time::Duration;

/// Answers lookups from a fixed map of key to values
///
/// Matching is a case-insensitive substring test; results keep the declared order
/// and are capped at `limit`.
#[derive(Debug, Clone, Default)]
pub struct StaticTagValues {
    values: HashMap<String, Vec<String>>,
    limit: usize,
}

impl StaticTagValues {
    pub const DEFAULT_LIMIT: usize = 50;

    #[must_use]
    pub fn new(limit: usize) -> Self {
        Self {
            values: HashMap::new(),
            limit,
        }
    }

    /// Seed from the fixed value lists of a filter-key table
    #[must_use]
    pub fn from_table(table: &FilterKeyTable, limit: usize) -> Self {
        let mut source = Self::new(limit);
        for definition in table.iter().filter(|def| !def.values.is_empty()) {
            source.insert(definition.key.clone(), definition.values.clone());
        }
        source
    }

    /// Set the values for `key`, replacing any previous list
    pub fn insert(&mut self, key: impl Into<String>, values: Vec<String>) {
        self.values.insert(key.into(), values);
    }

    #[must_use]
    pub fn with<I, S>(mut self, key: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.insert(key, values.into_iter().map(Into::into).collect());
        self
    }
}

impl TagValueSource for StaticTagValues {
    fn tag_values(&self, key: &str, partial: &str) -> Vec<String> {
        let needle = partial.to_lowercase();
        self.values
            .get(key)
            .map(|values| {
                values
                    .iter()
                    .filter(|value| value.to_lowercase().contains(&needle))
                    .take(self.limit)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Memoizes another source per `(key, partial)` pair
pub struct CachedTagValues<S> {
    inner: S,
    cache: Cache<(String, String), Vec<String>>,
}

impl<S: TagValueSource> CachedTagValues<S> {
    /// Cache with a five minute TTL and room for 1000 lookups
    #[must_use]
    pub fn new(inner: S) -> Self {
        Self::with_cache_config(inner, Duration::from_secs(300), 1000)
    }

    #[must_use]
    pub fn with_cache_config(inner: S, ttl: Duration, max_capacity: u64) -> Self {
        let cache = Cache::builder()
            .time_to_live(ttl)
            .max_capacity(max_capacity)
            .build();
        Self { inner, cache }
    }

    pub fn clear_cache(&self) {
        self.cache.invalidate_all();
    }

    #[must_use]
    pub const fn inner(&self) -> &S {
        &self.inner
    }
}

impl<S: TagValueSource> TagValueSource for CachedTagValues<S> {
    fn tag_values(&self, key: &str, partial: &str) -> Vec<String> {
        let cache_key = (key.to_string(), partial.to_string());
        if let Some(values) = self.cache.get(&cache_key) {
            return values;
        }

        let values = self.inner.tag_values(key, partial);
        self.cache.insert(cache_key, values.clone());
        values
    }
}
