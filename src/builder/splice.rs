//! Text-splice edits on a raw query
//!
//! Edits work on source spans instead of rebuilding the query from tokens, so any
//! text outside the edited range keeps the user's formatting byte for byte.

use crate::query::{ParsedQuery, Span, TokenKind, is_filter_key};

/// Render a `key:value` clause, quoting the value when it would not lex as bare
#[must_use]
pub fn format_clause(key: &str, value: &str) -> String {
    format!("{key}:{}", format_value(value))
}

/// Quote a filter value when it is empty or contains whitespace, quotes, or parens
#[must_use]
pub fn format_value(value: &str) -> String {
    let needs_quotes = value.is_empty()
        || value.starts_with('[')
        || value
            .chars()
            .any(|c| c.is_whitespace() || matches!(c, '"' | '(' | ')'));

    if needs_quotes {
        let escaped = value.replace('\\', "\\\\").replace('"', "\\\"");
        format!("\"{escaped}\"")
    } else {
        value.to_string()
    }
}

/// Append a clause, separated by one space unless the query is empty
///
/// Returns `None` when `key` would not lex as a filter key.
#[must_use]
pub fn add_filter(raw: &str, key: &str, value: &str) -> Option<String> {
    if !is_filter_key(key) {
        return None;
    }
    let clause = format_clause(key, value);
    if raw.is_empty() {
        Some(clause)
    } else {
        Some(format!("{raw} {clause}"))
    }
}

/// Remove the first non-negated `key:value` clause
///
/// A clause appended after an unterminated quote lexes as free text, so when no
/// parsed clause matches, an exact trailing ` key:value` is removed instead.
/// Returns `None` when neither is found.
#[must_use]
pub fn remove_filter(query: &ParsedQuery, key: &str, value: &str) -> Option<String> {
    let parsed = query
        .filters()
        .into_iter()
        .find(|clause| !clause.negated && clause.key == key && clause.value == value);
    if let Some(clause) = parsed {
        return Some(remove_span(query.source(), clause.span));
    }
    remove_trailing_clause(query.source(), &format_clause(key, value))
}

fn remove_trailing_clause(source: &str, clause: &str) -> Option<String> {
    if source == clause {
        return Some(String::new());
    }
    source
        .strip_suffix(clause)?
        .strip_suffix(' ')
        .map(str::to_string)
}

/// Remove the clause if present, otherwise append it
///
/// Returns `None` when the clause is absent and `key` is not a valid filter key.
#[must_use]
pub fn toggle_filter(query: &ParsedQuery, key: &str, value: &str) -> Option<String> {
    remove_filter(query, key, value).or_else(|| add_filter(query.source(), key, value))
}

/// Remove the token at `index`, or the whole clause when it is part of a filter
#[must_use]
pub fn delete_token(query: &ParsedQuery, index: usize) -> Option<String> {
    let token = query.tokens().get(index)?;
    let span = match query.filter_start(index) {
        Some(start) => {
            let value = query.tokens().get(start + 2)?;
            query.tokens()[start].span.join(value.span)
        }
        None => token.span,
    };
    if token.is_trivia() {
        return Some(splice(query.source(), span, ""));
    }
    Some(remove_span(query.source(), span))
}

/// Replace the value of the filter containing token `index`
#[must_use]
pub fn replace_filter_value(query: &ParsedQuery, index: usize, value: &str) -> Option<String> {
    let start = query.filter_start(index)?;
    let token = query.tokens().get(start + 2)?;
    if !matches!(token.kind, TokenKind::FilterValue { .. }) {
        return None;
    }
    Some(splice(query.source(), token.span, &format_value(value)))
}

/// Replace `span` of `source` with `replacement`
#[must_use]
pub fn splice(source: &str, span: Span, replacement: &str) -> String {
    let mut out = String::with_capacity(source.len() + replacement.len());
    out.push_str(&source[..span.start]);
    out.push_str(replacement);
    out.push_str(&source[span.end..]);
    out
}

/// Delete `span` plus one adjacent whitespace char, preferring the one before it
fn remove_span(source: &str, span: Span) -> String {
    let before = source[..span.start].chars().next_back();
    let after = source[span.end..].chars().next();

    let widened = match (before, after) {
        (Some(c), _) if c.is_whitespace() => Span::new(span.start - c.len_utf8(), span.end),
        (_, Some(c)) if c.is_whitespace() => Span::new(span.start, span.end + c.len_utf8()),
        _ => span,
    };
    splice(source, widened, "")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::parse;
    use crate::testing::issue_keys;

    fn parsed(raw: &str) -> ParsedQuery {
        parse(raw, &issue_keys())
    }

    #[test]
    fn test_format_value_quotes_when_needed() {
        assert_eq!(format_value("unresolved"), "unresolved");
        assert_eq!(format_value("two words"), "\"two words\"");
        assert_eq!(format_value("say \"hi\""), "\"say \\\"hi\\\"\"");
        assert_eq!(format_value(""), "\"\"");
        assert_eq!(format_clause("browser.name", "Mobile Safari"), "browser.name:\"Mobile Safari\"");
    }

    #[test]
    fn test_add_filter_spacing() {
        assert_eq!(add_filter("", "is", "unresolved").as_deref(), Some("is:unresolved"));
        assert_eq!(add_filter("foo", "is", "unresolved").as_deref(), Some("foo is:unresolved"));
    }

    #[test]
    fn test_add_filter_rejects_bad_keys() {
        assert_eq!(add_filter("foo", "bad key", "x"), None);
        assert_eq!(add_filter("foo", "", "x"), None);
        assert_eq!(add_filter("foo", "!is", "x"), None);
        assert_eq!(toggle_filter(&parsed("foo"), "bad key", "x"), None);
    }

    #[test]
    fn test_toggle_round_trip() {
        for original in ["", "foo", "  spaced   out  ", "(a OR b)", "assigned:me"] {
            let added = toggle_filter(&parsed(original), "is", "unresolved").unwrap();
            assert_ne!(added, original);
            let removed = toggle_filter(&parsed(&added), "is", "unresolved").unwrap();
            assert_eq!(removed, original, "original: {original:?}");
        }
    }

    #[test]
    fn test_toggle_quoted_round_trip() {
        let added = toggle_filter(&parsed("x"), "browser.name", "Mobile Safari").unwrap();
        assert_eq!(added, "x browser.name:\"Mobile Safari\"");
        assert_eq!(
            toggle_filter(&parsed(&added), "browser.name", "Mobile Safari").as_deref(),
            Some("x")
        );
    }

    #[test]
    fn test_toggle_round_trip_after_unterminated_quote() {
        for original in ["foo \"bar", "message:\"open", "project:[a,\"b c"] {
            let added = toggle_filter(&parsed(original), "is", "unresolved").unwrap();
            assert_eq!(added, format!("{original} is:unresolved"));
            assert!(parsed(&added).filters().is_empty(), "added: {added:?}");

            let removed = toggle_filter(&parsed(&added), "is", "unresolved").unwrap();
            assert_eq!(removed, original);
        }
    }

    #[test]
    fn test_trailing_clause_needs_separator() {
        let query = parsed("\"open!is:unresolved");
        assert_eq!(remove_filter(&query, "is", "unresolved"), None);
    }

    #[test]
    fn test_remove_prefers_preceding_whitespace() {
        let query = parsed("a is:unresolved b");
        assert_eq!(remove_filter(&query, "is", "unresolved").as_deref(), Some("a b"));

        let query = parsed("is:unresolved b");
        assert_eq!(remove_filter(&query, "is", "unresolved").as_deref(), Some("b"));
    }

    #[test]
    fn test_remove_skips_negated() {
        let query = parsed("!is:unresolved");
        assert_eq!(remove_filter(&query, "is", "unresolved"), None);
        assert_eq!(
            toggle_filter(&query, "is", "unresolved").as_deref(),
            Some("!is:unresolved is:unresolved")
        );
    }

    #[test]
    fn test_delete_token_removes_whole_filter() {
        let query = parsed("foo assigned:me bar");
        assert_eq!(delete_token(&query, 3).as_deref(), Some("foo bar"));
        assert_eq!(delete_token(&query, 4).as_deref(), Some("foo bar"));
        assert_eq!(delete_token(&query, 0).as_deref(), Some("assigned:me bar"));
        assert_eq!(delete_token(&query, 99), None);
    }

    #[test]
    fn test_replace_filter_value() {
        let query = parsed("is:unresolved  assigned:me");
        assert_eq!(
            replace_filter_value(&query, 0, "resolved").as_deref(),
            Some("is:resolved  assigned:me")
        );
        assert_eq!(
            replace_filter_value(&query, 6, "my team").as_deref(),
            Some("is:unresolved  assigned:\"my team\"")
        );
        assert_eq!(replace_filter_value(&query, 3, "x"), None);
    }
}
