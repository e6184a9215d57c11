//! Filter key definitions
//!
//! A [`FilterKeyTable`] maps every filter key a search supports to its
//! [`FilterKeyDefinition`], which tells the validator what kind of value the key
//! takes. Keys not in the table still parse as filters; whether they are flagged
//! depends on the configuration.
//!
//! The [`dataset`] submodule derives supported and omitted key lists per dataset.

pub mod dataset;

pub use dataset::{Dataset, FeatureFlags, KeyRestrictions};

use crate::query::ValueKind;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Definition of a single filter key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterKeyDefinition {
    /// Key name as typed on the left of `:`
    pub key: String,

    /// Kind of value the key accepts
    #[serde(default)]
    pub kind: ValueKind,

    /// Short help text for suggestion lists
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Fixed set of accepted values, used for suggestions
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub values: Vec<String>,
}

impl FilterKeyDefinition {
    #[must_use]
    pub fn new(key: impl Into<String>, kind: ValueKind) -> Self {
        Self {
            key: key.into(),
            kind,
            description: None,
            values: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn with_values<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.values = values.into_iter().map(Into::into).collect();
        self
    }
}

/// Every filter key a search knows about, by name
///
/// Serialized as a list of definitions (`[[filter_keys]]` in TOML).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<FilterKeyDefinition>", into = "Vec<FilterKeyDefinition>")]
pub struct FilterKeyTable {
    keys: BTreeMap<String, FilterKeyDefinition>,
}

impl FilterKeyTable {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            keys: BTreeMap::new(),
        }
    }

    /// Add or replace a definition
    pub fn insert(&mut self, definition: FilterKeyDefinition) {
        self.keys.insert(definition.key.clone(), definition);
    }

    /// Builder-style [`FilterKeyTable::insert`]
    #[must_use]
    pub fn with(mut self, definition: FilterKeyDefinition) -> Self {
        self.insert(definition);
        self
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&FilterKeyDefinition> {
        self.keys.get(key)
    }

    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.keys.contains_key(key)
    }

    /// Value kind for a key, `String` when the key is unknown
    #[must_use]
    pub fn kind_of(&self, key: &str) -> ValueKind {
        self.get(key).map_or(ValueKind::String, |def| def.kind)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Definitions sorted by key
    pub fn iter(&self) -> impl Iterator<Item = &FilterKeyDefinition> {
        self.keys.values()
    }

    /// Key names starting with `prefix`, sorted
    #[must_use]
    pub fn keys_with_prefix(&self, prefix: &str) -> Vec<&str> {
        self.keys
            .keys()
            .filter(|key| key.starts_with(prefix))
            .map(String::as_str)
            .collect()
    }

    /// Keys of an issue search, used when no table is configured
    #[must_use]
    pub fn issue_defaults() -> Self {
        Self::new()
            .with(
                FilterKeyDefinition::new("is", ValueKind::String)
                    .with_description("Status of the issue")
                    .with_values([
                        "resolved",
                        "unresolved",
                        "archived",
                        "ignored",
                        "assigned",
                        "unassigned",
                        "for_review",
                        "linked",
                        "unlinked",
                    ]),
            )
            .with(
                FilterKeyDefinition::new("assigned", ValueKind::String)
                    .with_description("Assignee of the issue")
                    .with_values(["me", "my_teams", "none"]),
            )
            .with(
                FilterKeyDefinition::new("assigned_or_suggested", ValueKind::String)
                    .with_values(["me", "my_teams", "none"]),
            )
            .with(FilterKeyDefinition::new("bookmarks", ValueKind::String).with_values(["me"]))
            .with(FilterKeyDefinition::new("release", ValueKind::String))
            .with(FilterKeyDefinition::new("environment", ValueKind::String))
            .with(FilterKeyDefinition::new("message", ValueKind::String))
            .with(FilterKeyDefinition::new("transaction", ValueKind::String))
            .with(FilterKeyDefinition::new("browser.name", ValueKind::String))
            .with(FilterKeyDefinition::new("os.name", ValueKind::String))
            .with(
                FilterKeyDefinition::new("level", ValueKind::String)
                    .with_values(["fatal", "error", "warning", "info", "debug"]),
            )
            .with(
                FilterKeyDefinition::new("age", ValueKind::Date)
                    .with_description("Time since the issue was first seen"),
            )
            .with(FilterKeyDefinition::new("firstSeen", ValueKind::Date))
            .with(FilterKeyDefinition::new("lastSeen", ValueKind::Date))
            .with(FilterKeyDefinition::new("timesSeen", ValueKind::Number))
            .with(FilterKeyDefinition::new("transaction.duration", ValueKind::Duration))
            .with(FilterKeyDefinition::new("has", ValueKind::String))
            .with(FilterKeyDefinition::new("project", ValueKind::List))
            .with(FilterKeyDefinition::new("error.handled", ValueKind::Boolean))
            .with(FilterKeyDefinition::new("attachment.size", ValueKind::Size))
    }
}

impl From<Vec<FilterKeyDefinition>> for FilterKeyTable {
    fn from(definitions: Vec<FilterKeyDefinition>) -> Self {
        definitions.into_iter().collect()
    }
}

impl From<FilterKeyTable> for Vec<FilterKeyDefinition> {
    fn from(table: FilterKeyTable) -> Self {
        table.keys.into_values().collect()
    }
}

impl FromIterator<FilterKeyDefinition> for FilterKeyTable {
    fn from_iter<T: IntoIterator<Item = FilterKeyDefinition>>(iter: T) -> Self {
        let mut table = Self::new();
        for definition in iter {
            table.insert(definition);
        }
        table
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_lookup() {
        let table = FilterKeyTable::new()
            .with(FilterKeyDefinition::new("is", ValueKind::String))
            .with(FilterKeyDefinition::new("timesSeen", ValueKind::Number));

        assert_eq!(table.len(), 2);
        assert!(table.contains("is"));
        assert!(!table.contains("IS"));
        assert_eq!(table.kind_of("timesSeen"), ValueKind::Number);
        assert_eq!(table.kind_of("unknown"), ValueKind::String);
    }

    #[test]
    fn test_insert_replaces_definition() {
        let mut table = FilterKeyTable::new();
        table.insert(FilterKeyDefinition::new("age", ValueKind::String));
        table.insert(FilterKeyDefinition::new("age", ValueKind::Date));

        assert_eq!(table.len(), 1);
        assert_eq!(table.kind_of("age"), ValueKind::Date);
    }

    #[test]
    fn test_keys_with_prefix_sorted() {
        let table: FilterKeyTable = ["assigned", "age", "assigned_or_suggested", "is"]
            .into_iter()
            .map(|key| FilterKeyDefinition::new(key, ValueKind::String))
            .collect();

        assert_eq!(
            table.keys_with_prefix("as"),
            vec!["assigned", "assigned_or_suggested"]
        );
        assert!(table.keys_with_prefix("zzz").is_empty());
    }

    #[test]
    fn test_issue_defaults_cover_common_keys() {
        let table = FilterKeyTable::issue_defaults();
        assert!(table.contains("is"));
        assert!(table.contains("assigned"));
        assert_eq!(table.kind_of("age"), ValueKind::Date);
        assert_eq!(table.kind_of("timesSeen"), ValueKind::Number);
        assert!(table.get("is").is_some_and(|def| def.values.contains(&"unresolved".to_string())));
    }

    #[test]
    fn test_table_reads_toml_array_of_tables() {
        #[derive(Deserialize)]
        struct Wrapper {
            filter_keys: FilterKeyTable,
        }

        let text = r#"
            [[filter_keys]]
            key = "level"
            values = ["error", "info"]

            [[filter_keys]]
            key = "timesSeen"
            kind = "number"
        "#;
        let wrapper: Wrapper = toml::from_str(text).unwrap();
        assert_eq!(wrapper.filter_keys.len(), 2);
        assert_eq!(wrapper.filter_keys.kind_of("level"), ValueKind::String);
        assert_eq!(wrapper.filter_keys.kind_of("timesSeen"), ValueKind::Number);
    }
}
