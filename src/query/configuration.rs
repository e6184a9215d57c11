//! Validation configuration
//!
//! A [`Configuration`] is built once with [`ConfigurationBuilder`] and then only
//! read. It carries the disallow flags, the filter-key table, per-dataset key
//! restrictions, and overrides for invalid-token messages.
//!
//! ```
//! use querybar::keys::{Dataset, FeatureFlags, FilterKeyTable};
//! use querybar::query::Configuration;
//!
//! let config = Configuration::builder()
//!     .filter_keys(FilterKeyTable::issue_defaults())
//!     .disallow_free_text(true)
//!     .dataset(Dataset::Sessions, &FeatureFlags::new())
//!     .build();
//!
//! assert!(config.is_supported("release"));
//! assert!(!config.is_supported("is"));
//! ```

use super::token::InvalidReason;
use super::value::ValueKind;
use crate::keys::{Dataset, FeatureFlags, FilterKeyTable, KeyRestrictions};
use std::collections::{HashMap, HashSet};

/// Immutable validation settings
#[derive(Debug, Clone, Default)]
pub struct Configuration {
    disallow_free_text: bool,
    disallow_logical_operators: bool,
    disallow_unsupported_filters: bool,
    disallow_wildcard: bool,
    filter_keys: FilterKeyTable,
    supported_keys: Option<HashSet<String>>,
    omitted_keys: HashSet<String>,
    invalid_messages: HashMap<InvalidReason, String>,
}

impl Configuration {
    #[must_use]
    pub fn builder() -> ConfigurationBuilder {
        ConfigurationBuilder::new()
    }

    #[must_use]
    pub const fn disallow_free_text(&self) -> bool {
        self.disallow_free_text
    }

    #[must_use]
    pub const fn disallow_logical_operators(&self) -> bool {
        self.disallow_logical_operators
    }

    #[must_use]
    pub const fn disallow_unsupported_filters(&self) -> bool {
        self.disallow_unsupported_filters
    }

    #[must_use]
    pub const fn disallow_wildcard(&self) -> bool {
        self.disallow_wildcard
    }

    #[must_use]
    pub const fn filter_keys(&self) -> &FilterKeyTable {
        &self.filter_keys
    }

    /// Whether `key` belongs to the set of keys this search accepts
    ///
    /// An explicit supported-key list takes the place of the table.
    #[must_use]
    pub fn is_supported(&self, key: &str) -> bool {
        self.supported_keys
            .as_ref()
            .map_or_else(|| self.filter_keys.contains(key), |keys| keys.contains(key))
    }

    #[must_use]
    pub fn is_omitted(&self, key: &str) -> bool {
        self.omitted_keys.contains(key)
    }

    /// Value kind declared for `key`, `String` when the table lacks it
    #[must_use]
    pub fn kind_of(&self, key: &str) -> ValueKind {
        self.filter_keys.kind_of(key)
    }

    /// Custom message configured for `reason`
    #[must_use]
    pub fn invalid_message(&self, reason: InvalidReason) -> Option<&str> {
        self.invalid_messages.get(&reason).map(String::as_str)
    }
}

/// Builder for [`Configuration`]
#[derive(Debug, Default)]
pub struct ConfigurationBuilder {
    inner: Configuration,
}

impl ConfigurationBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn disallow_free_text(mut self, value: bool) -> Self {
        self.inner.disallow_free_text = value;
        self
    }

    #[must_use]
    pub const fn disallow_logical_operators(mut self, value: bool) -> Self {
        self.inner.disallow_logical_operators = value;
        self
    }

    #[must_use]
    pub const fn disallow_unsupported_filters(mut self, value: bool) -> Self {
        self.inner.disallow_unsupported_filters = value;
        self
    }

    #[must_use]
    pub const fn disallow_wildcard(mut self, value: bool) -> Self {
        self.inner.disallow_wildcard = value;
        self
    }

    #[must_use]
    pub fn filter_keys(mut self, keys: FilterKeyTable) -> Self {
        self.inner.filter_keys = keys;
        self
    }

    /// Restrict supported keys to an explicit list
    #[must_use]
    pub fn supported_keys<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.inner.supported_keys = Some(keys.into_iter().map(Into::into).collect());
        self
    }

    /// Add keys that are always invalid
    #[must_use]
    pub fn omitted_keys<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.inner
            .omitted_keys
            .extend(keys.into_iter().map(Into::into));
        self
    }

    #[must_use]
    pub fn restrictions(mut self, restrictions: KeyRestrictions) -> Self {
        if let Some(supported) = restrictions.supported {
            self = self.supported_keys(supported);
        }
        if let Some(omitted) = restrictions.omitted {
            self = self.omitted_keys(omitted);
        }
        self
    }

    /// Apply the key restrictions of `dataset` under `features`
    #[must_use]
    pub fn dataset(self, dataset: Dataset, features: &FeatureFlags) -> Self {
        self.restrictions(dataset.restrictions(features))
    }

    /// Override the message shown for tokens invalid because of `reason`
    #[must_use]
    pub fn invalid_message(mut self, reason: InvalidReason, message: impl Into<String>) -> Self {
        self.inner.invalid_messages.insert(reason, message.into());
        self
    }

    #[must_use]
    pub fn build(self) -> Configuration {
        self.inner
    }
}
