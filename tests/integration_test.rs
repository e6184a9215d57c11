//! Integration tests for querybar
//!
//! These tests drive the public API end to end: parsing and validating queries,
//! running a search session against a recent-search file, and loading
//! configuration from disk.

use std::cell::RefCell;
use std::fs;
use std::rc::Rc;
use querybar::{
    builder::{Action, CallbackSearchState, QueryBuilderState, SearchHandler, SearchQueryBuilder},
    config::QuerybarConfig,
    keys::{Dataset, FeatureFlags, FilterKeyTable},
    lookup::{CachedTagValues, StaticTagValues},
    query::{Configuration, InvalidReason, TokenKind, parse, parse_and_validate},
    recent::{RecentSearchManager, SavedSearchType},
};
use tempfile::TempDir;

/// Helper handler that shares its search log with the test
#[derive(Clone, Default)]
struct Searches(Rc<RefCell<Vec<String>>>);

impl SearchHandler for Searches {
    fn on_search(&mut self, query: &str, _state: CallbackSearchState<'_>) {
        self.0.borrow_mut().push(query.to_string());
    }
}

fn issue_config() -> Configuration {
    Configuration::builder()
        .filter_keys(FilterKeyTable::issue_defaults())
        .build()
}

#[test]
fn test_tokens_cover_the_whole_query() {
    let keys = FilterKeyTable::issue_defaults();
    let queries = [
        "",
        "   ",
        "is:unresolved",
        "  is:unresolved   assigned:me  ",
        "!browser.name:\"Mobile Safari\" (level:error OR level:fatal)",
        "timesSeen:>=10 age:-24h project:[a, b]",
        "\"unterminated quote",
        "weird:[unclosed list",
        "key: value ) (",
    ];

    for raw in queries {
        let parsed = parse(raw, &keys);
        assert_eq!(parsed.reconstruct(), raw, "reconstruction of {raw:?}");

        let mut end = 0;
        for token in parsed.tokens() {
            assert_eq!(token.span.start, end, "gap before token in {raw:?}");
            end = token.span.end;
        }
        assert_eq!(end, raw.len());
    }
}

#[test]
fn test_empty_query() {
    let parsed = parse_and_validate("", &issue_config());
    assert!(parsed.tokens().is_empty());
    assert!(parsed.is_valid());
    assert_eq!(parsed.normalized(), "");
}

#[test]
fn test_two_filters() {
    let parsed = parse_and_validate("is:unresolved assigned:me", &issue_config());
    let filters = parsed.filters();

    assert_eq!(filters.len(), 2);
    assert_eq!((filters[0].key, filters[0].value), ("is", "unresolved"));
    assert_eq!((filters[1].key, filters[1].value), ("assigned", "me"));
    assert!(parsed.is_valid());
}

#[test]
fn test_disallow_free_text_flags_only_free_text() {
    let config = Configuration::builder()
        .filter_keys(FilterKeyTable::issue_defaults())
        .disallow_free_text(true)
        .build();

    let parsed = parse_and_validate("is:unresolved some words", &config);
    let invalid: Vec<_> = parsed.invalid_tokens().collect();

    assert!(!parsed.is_valid());
    assert_eq!(invalid.len(), 1);
    assert!(matches!(invalid[0].kind, TokenKind::FreeText { .. }));
    assert_eq!(invalid[0].invalid_reason(), Some(InvalidReason::FreeTextNotAllowed));
    assert_eq!(parsed.text(invalid[0]), "some words");
}

#[test]
fn test_disallow_wildcard() {
    let config = Configuration::builder()
        .filter_keys(FilterKeyTable::issue_defaults())
        .disallow_wildcard(true)
        .build();

    let parsed = parse_and_validate("browser.name:Chr* release:1.0", &config);
    let reasons: Vec<_> = parsed
        .invalid_tokens()
        .map(|t| (parsed.text(t).to_string(), t.invalid_reason()))
        .collect();
    assert_eq!(
        reasons,
        vec![("Chr*".to_string(), Some(InvalidReason::WildcardNotAllowed))]
    );

    let permissive = parse_and_validate("browser.name:Chr*", &issue_config());
    assert!(permissive.is_valid());
}

#[test]
fn test_dataset_omits_keys() {
    let config = Configuration::builder()
        .filter_keys(FilterKeyTable::issue_defaults())
        .dataset(Dataset::Errors, &FeatureFlags::new())
        .build();

    let parsed = parse_and_validate("transaction:/api/0 is:unresolved", &config);
    let omitted: Vec<_> = parsed
        .invalid_tokens()
        .map(|t| (parsed.text(t).to_string(), t.invalid_reason()))
        .collect();
    assert_eq!(
        omitted,
        vec![("transaction".to_string(), Some(InvalidReason::FilterKeyOmitted))]
    );
}

#[test]
fn test_dispatch_is_idempotent() {
    let searches = Searches::default();
    let mut session = SearchQueryBuilder::builder()
        .configuration(issue_config())
        .handler(searches.clone())
        .build()
        .unwrap();

    session.update_query("is:unresolved");
    assert!(session.submit().is_dispatched());
    assert!(!session.submit().is_dispatched());
    assert!(!session.blur().is_dispatched());

    session.update_query("  is:unresolved  ");
    assert!(!session.blur().is_dispatched());

    session.update_query("is:resolved");
    assert!(session.blur().is_dispatched());

    assert_eq!(*searches.0.borrow(), vec!["is:unresolved", "is:resolved"]);
}

#[test]
fn test_toggle_round_trip() {
    let config = issue_config();
    let original = QueryBuilderState::new("is:unresolved", &config);

    let added = original.reduce(
        Action::ToggleFilter {
            key: "assigned".into(),
            value: "me".into(),
        },
        &config,
    );
    assert_eq!(added.raw_query(), "is:unresolved assigned:me");

    let removed = added.reduce(
        Action::ToggleFilter {
            key: "assigned".into(),
            value: "me".into(),
        },
        &config,
    );
    assert_eq!(removed.raw_query(), "is:unresolved");
}

#[test]
fn test_session_records_recent_searches() {
    let dir = TempDir::new().unwrap();
    let manager = RecentSearchManager::new(dir.path().join("recent.toml"));

    let mut session = SearchQueryBuilder::builder()
        .configuration(issue_config())
        .recent_searches(manager.clone(), SavedSearchType::Issue)
        .build()
        .unwrap();

    session.update_query("is:unresolved");
    session.submit();
    session.update_query("assigned:me");
    session.blur();
    session.clear();

    let recent: Vec<String> = manager
        .list(Some(SavedSearchType::Issue))
        .unwrap()
        .into_iter()
        .map(|s| s.query)
        .collect();
    assert_eq!(recent, vec!["assigned:me", "is:unresolved"]);
}

#[test]
fn test_stale_lookups_are_discarded() {
    let source = CachedTagValues::new(StaticTagValues::from_table(
        &FilterKeyTable::issue_defaults(),
        StaticTagValues::DEFAULT_LIMIT,
    ));
    let mut session = SearchQueryBuilder::builder()
        .configuration(issue_config())
        .build()
        .unwrap();

    let (ticket, values) = session.lookup_tag_values(&source, "is", "un");
    assert_eq!(
        session.accept_lookup(&ticket, values.clone()),
        Some(vec!["unresolved".to_string(), "unassigned".to_string(), "unlinked".to_string()])
    );

    session.update_query("is:");
    assert_eq!(session.accept_lookup(&ticket, values), None);
}

#[test]
fn test_config_file_drives_validation() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(
        &path,
        r#"
disallow_logical_operators = true

[invalid_messages]
logical_operator_not_allowed = "No boolean logic here"
"#,
    )
    .unwrap();

    let config = QuerybarConfig::load_from(&path).unwrap();
    let parsed = parse_and_validate("is:unresolved OR is:resolved", &config.configuration());

    let messages: Vec<_> = parsed
        .invalid_tokens()
        .filter_map(|t| t.invalid_message())
        .collect();
    assert_eq!(messages, vec!["No boolean logic here"]);
}
