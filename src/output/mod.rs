//! Output formatting for CLI display
//!
//! Turns a [`ParsedQuery`] into colored text, a token listing, caret-marked
//! diagnostics, or a JSON report.

use crate::query::{ParsedQuery, Token, TokenKind};
use crate::recent::RecentSearch;
use colored::Colorize;
use serde::Serialize;

fn paint(token: &Token, text: &str) -> String {
    if !token.is_valid() {
        return text.red().underline().to_string();
    }
    match &token.kind {
        TokenKind::Whitespace => text.to_string(),
        TokenKind::FreeText { .. } => text.normal().to_string(),
        TokenKind::FilterKey { known: true, .. } => text.cyan().to_string(),
        TokenKind::FilterKey { known: false, .. } => text.yellow().to_string(),
        TokenKind::FilterOperator { .. } => text.dimmed().to_string(),
        TokenKind::FilterValue { .. } => text.green().to_string(),
        TokenKind::LogicalOperator { .. } => text.magenta().bold().to_string(),
        TokenKind::ParenOpen | TokenKind::ParenClose => text.bold().to_string(),
    }
}

/// The query with every token colored by kind, invalid tokens in red
#[must_use]
pub fn highlight(query: &ParsedQuery) -> String {
    query
        .tokens()
        .iter()
        .map(|token| paint(token, query.text(token)))
        .collect()
}

/// One line per non-whitespace token: span, kind and text
#[must_use]
pub fn token_lines(query: &ParsedQuery, quiet: bool) -> Vec<String> {
    query
        .tokens()
        .iter()
        .filter(|token| !token.is_trivia())
        .map(|token| {
            let text = query.text(token);
            if quiet {
                return format!("{}\t{}", token.kind.name(), text);
            }
            let line = format!(
                "  {:>3}..{:<3} {:<16} {}",
                token.span.start,
                token.span.end,
                token.kind.name(),
                paint(token, text)
            );
            match token.invalid_message() {
                Some(message) => format!("{line}  {}", message.red()),
                None => line,
            }
        })
        .collect()
}

fn column(source: &str, byte: usize) -> usize {
    source.get(..byte).map_or(0, |prefix| prefix.chars().count())
}

/// The query followed by a caret marker and message for each invalid token
///
/// Empty when the query is valid.
#[must_use]
pub fn diagnostics(query: &ParsedQuery) -> Vec<String> {
    let source = query.source();
    let mut lines = Vec::new();

    for token in query.invalid_tokens() {
        if lines.is_empty() {
            lines.push(format!("  {source}"));
        }
        let start = column(source, token.span.start);
        let width = column(source, token.span.end).saturating_sub(start).max(1);
        lines.push(format!(
            "  {}{} {}",
            " ".repeat(start),
            "^".repeat(width).red().bold(),
            token.invalid_message().unwrap_or_default()
        ));
    }

    lines
}

/// Recent search entry for listings
#[must_use]
pub fn recent_line(search: &RecentSearch, quiet: bool) -> String {
    if quiet {
        search.query.clone()
    } else {
        format!(
            "  {:<8} {} {}",
            search.search_type.to_string().cyan(),
            search.query,
            format!(
                "(used {} time(s), last {})",
                search.use_count,
                search.last_seen.format("%Y-%m-%d %H:%M")
            )
            .dimmed()
        )
    }
}

/// Machine-readable summary of a parsed query
#[derive(Debug, Serialize)]
pub struct QueryReport<'a> {
    pub query: &'a str,
    pub normalized: String,
    pub valid: bool,
    pub tokens: Vec<TokenReport<'a>>,
}

#[derive(Debug, Serialize)]
pub struct TokenReport<'a> {
    pub text: &'a str,
    #[serde(flatten)]
    pub token: &'a Token,
}

impl<'a> QueryReport<'a> {
    #[must_use]
    pub fn new(query: &'a ParsedQuery) -> Self {
        Self {
            query: query.source(),
            normalized: query.normalized(),
            valid: query.is_valid(),
            tokens: query
                .tokens()
                .iter()
                .map(|token| TokenReport {
                    text: query.text(token),
                    token,
                })
                .collect(),
        }
    }
}

/// Pretty JSON for a parsed query
///
/// # Errors
///
/// Returns `serde_json::Error` if serialization fails.
pub fn json(query: &ParsedQuery) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&QueryReport::new(query))
}
