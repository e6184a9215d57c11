//! Token model for structured search queries
//!
//! A raw query such as `is:unresolved error message` is represented as an ordered
//! list of [`Token`]s. Every token records the byte range it occupies in the raw
//! query, so concatenating the spans of all tokens (whitespace included) yields the
//! original input exactly. Renderers rely on this to highlight ranges safely.
//!
//! # Token kinds
//!
//! - **`FreeText`**: text that is not structured filter syntax
//! - **`FilterKey`** / **`FilterOperator`** / **`FilterValue`**: the three parts of a
//!   `key:value` clause, always emitted together and adjacent
//! - **`LogicalOperator`**: `AND` / `OR`
//! - **`ParenOpen`** / **`ParenClose`**: grouping
//! - **`Whitespace`**: trivia between tokens, always valid

use serde::{Deserialize, Serialize};
use std::fmt;

/// Byte range of a token within the raw query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    #[must_use]
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.end - self.start
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Smallest span covering both `self` and `other`
    #[must_use]
    pub const fn join(self, other: Self) -> Self {
        let start = if self.start < other.start { self.start } else { other.start };
        let end = if self.end > other.end { self.end } else { other.end };
        Self { start, end }
    }

    /// Borrow the text this span covers
    ///
    /// # Panics
    /// Panics if the span does not lie on char boundaries of `source`. Spans
    /// produced by the lexer always do.
    #[must_use]
    pub fn slice<'a>(&self, source: &'a str) -> &'a str {
        &source[self.start..self.end]
    }
}

/// Boolean operator between terms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogicalOperator {
    And,
    Or,
}

impl fmt::Display for LogicalOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::And => write!(f, "AND"),
            Self::Or => write!(f, "OR"),
        }
    }
}

/// Operator between a filter key and its value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComparisonOperator {
    /// `key:value`
    Equal,
    /// `key:>value`
    GreaterThan,
    /// `key:>=value`
    GreaterThanOrEqual,
    /// `key:<value`
    LessThan,
    /// `key:<=value`
    LessThanOrEqual,
}

impl ComparisonOperator {
    /// Source text of the operator, separator included
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Equal => ":",
            Self::GreaterThan => ":>",
            Self::GreaterThanOrEqual => ":>=",
            Self::LessThan => ":<",
            Self::LessThanOrEqual => ":<=",
        }
    }

    /// True for the ordering operators (`>`, `>=`, `<`, `<=`)
    #[must_use]
    pub const fn is_comparison(self) -> bool {
        !matches!(self, Self::Equal)
    }
}

impl fmt::Display for ComparisonOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a token is, along with the data extracted from its source text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TokenKind {
    /// Whitespace between tokens
    Whitespace,
    /// Unstructured text; `text` is unquoted and unescaped when `quoted`
    FreeText { text: String, quoted: bool },
    /// Left-hand side of a filter clause, `!` stripped into `negated`
    FilterKey {
        key: String,
        negated: bool,
        /// Whether the key appears in the filter-key table used for parsing
        known: bool,
    },
    /// Separator plus optional comparison (`:`, `:>`, `:>=` ...)
    FilterOperator { operator: ComparisonOperator },
    /// Right-hand side of a filter clause
    FilterValue {
        /// Unquoted value text; the raw `[...]` text for lists
        value: String,
        quoted: bool,
        /// Items of a bracketed list value
        #[serde(default, skip_serializing_if = "Option::is_none")]
        items: Option<Vec<String>>,
    },
    LogicalOperator { operator: LogicalOperator },
    ParenOpen,
    ParenClose,
}

impl TokenKind {
    /// Short name used in diagnostics and CLI output
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Whitespace => "whitespace",
            Self::FreeText { .. } => "free text",
            Self::FilterKey { .. } => "filter key",
            Self::FilterOperator { .. } => "filter operator",
            Self::FilterValue { .. } => "filter value",
            Self::LogicalOperator { .. } => "logical operator",
            Self::ParenOpen => "open paren",
            Self::ParenClose => "close paren",
        }
    }

    #[must_use]
    pub const fn is_trivia(&self) -> bool {
        matches!(self, Self::Whitespace)
    }

    #[must_use]
    pub const fn is_paren(&self) -> bool {
        matches!(self, Self::ParenOpen | Self::ParenClose)
    }

    #[must_use]
    pub const fn is_filter_part(&self) -> bool {
        matches!(
            self,
            Self::FilterKey { .. } | Self::FilterOperator { .. } | Self::FilterValue { .. }
        )
    }
}

/// Why a token was marked invalid
///
/// The snake_case form of each variant is the key used for custom messages in
/// configuration files (e.g. `free_text_not_allowed = "..."`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvalidReason {
    FreeTextNotAllowed,
    WildcardNotAllowed,
    LogicalOperatorNotAllowed,
    ParensNotAllowed,
    UnbalancedParen,
    FilterKeyNotSupported,
    FilterKeyOmitted,
    OperatorNotSupported,
    MissingValue,
    InvalidValue,
}

impl InvalidReason {
    pub const ALL: [Self; 10] = [
        Self::FreeTextNotAllowed,
        Self::WildcardNotAllowed,
        Self::LogicalOperatorNotAllowed,
        Self::ParensNotAllowed,
        Self::UnbalancedParen,
        Self::FilterKeyNotSupported,
        Self::FilterKeyOmitted,
        Self::OperatorNotSupported,
        Self::MissingValue,
        Self::InvalidValue,
    ];

    /// Configuration key for this reason
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::FreeTextNotAllowed => "free_text_not_allowed",
            Self::WildcardNotAllowed => "wildcard_not_allowed",
            Self::LogicalOperatorNotAllowed => "logical_operator_not_allowed",
            Self::ParensNotAllowed => "parens_not_allowed",
            Self::UnbalancedParen => "unbalanced_paren",
            Self::FilterKeyNotSupported => "filter_key_not_supported",
            Self::FilterKeyOmitted => "filter_key_omitted",
            Self::OperatorNotSupported => "operator_not_supported",
            Self::MissingValue => "missing_value",
            Self::InvalidValue => "invalid_value",
        }
    }

    /// Look up a reason by its configuration key
    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|reason| reason.code() == code)
    }
}

impl fmt::Display for InvalidReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Validity annotation attached by the validator
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Validity {
    #[default]
    Valid,
    Invalid { reason: InvalidReason, message: String },
}

/// A single lexical element of a query
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
    #[serde(default)]
    pub validity: Validity,
}

impl Token {
    /// Create a token that has not been validated yet
    #[must_use]
    pub const fn new(kind: TokenKind, span: Span) -> Self {
        Self {
            kind,
            span,
            validity: Validity::Valid,
        }
    }

    #[must_use]
    pub const fn is_valid(&self) -> bool {
        matches!(self.validity, Validity::Valid)
    }

    #[must_use]
    pub const fn is_trivia(&self) -> bool {
        self.kind.is_trivia()
    }

    #[must_use]
    pub const fn invalid_reason(&self) -> Option<InvalidReason> {
        match &self.validity {
            Validity::Valid => None,
            Validity::Invalid { reason, .. } => Some(*reason),
        }
    }

    /// Human-readable reason this token is invalid, if it is
    #[must_use]
    pub fn invalid_message(&self) -> Option<&str> {
        match &self.validity {
            Validity::Valid => None,
            Validity::Invalid { message, .. } => Some(message),
        }
    }
}

/// Borrowed view of one `key:value` clause
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterClause<'a> {
    /// Index of the `FilterKey` token; operator and value follow it
    pub key_index: usize,
    pub key: &'a str,
    pub negated: bool,
    pub operator: ComparisonOperator,
    pub value: &'a str,
    pub quoted: bool,
    /// Span of the whole clause, negation included
    pub span: Span,
}

/// Ordered token sequence for one raw query
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParsedQuery {
    source: String,
    tokens: Vec<Token>,
}

impl ParsedQuery {
    pub(crate) const fn from_parts(source: String, tokens: Vec<Token>) -> Self {
        Self { source, tokens }
    }

    /// The parse of the empty string
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            source: String::new(),
            tokens: Vec::new(),
        }
    }

    /// Raw query this sequence was parsed from
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    #[must_use]
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub(crate) fn tokens_mut(&mut self) -> &mut [Token] {
        &mut self.tokens
    }

    #[must_use]
    pub fn into_tokens(self) -> Vec<Token> {
        self.tokens
    }

    /// True when the query holds nothing but whitespace
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tokens.iter().all(Token::is_trivia)
    }

    /// Source text of a token from this query
    #[must_use]
    pub fn text(&self, token: &Token) -> &str {
        token.span.slice(&self.source)
    }

    /// A query is valid iff every token is valid
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.tokens.iter().all(Token::is_valid)
    }

    pub fn invalid_tokens(&self) -> impl Iterator<Item = &Token> {
        self.tokens.iter().filter(|token| !token.is_valid())
    }

    /// Concatenate every token's source text
    ///
    /// Always equals [`ParsedQuery::source`].
    #[must_use]
    pub fn reconstruct(&self) -> String {
        self.tokens
            .iter()
            .map(|token| self.text(token))
            .collect()
    }

    /// Canonical form used to decide whether a committed query changed
    ///
    /// Leading and trailing whitespace is dropped, whitespace between tokens and
    /// inside unquoted free text collapses to a single space. Quoted text is kept
    /// verbatim.
    #[must_use]
    pub fn normalized(&self) -> String {
        let significant: Vec<&Token> = {
            let first = self.tokens.iter().position(|t| !t.is_trivia());
            let last = self.tokens.iter().rposition(|t| !t.is_trivia());
            match (first, last) {
                (Some(first), Some(last)) => self.tokens[first..=last].iter().collect(),
                _ => return String::new(),
            }
        };

        let mut out = String::with_capacity(self.source.len());
        for token in significant {
            match &token.kind {
                TokenKind::Whitespace => out.push(' '),
                TokenKind::FreeText { quoted: false, .. } => {
                    let words: Vec<&str> = self.text(token).split_whitespace().collect();
                    out.push_str(&words.join(" "));
                }
                _ => out.push_str(self.text(token)),
            }
        }
        out
    }

    /// All filter clauses in source order
    #[must_use]
    pub fn filters(&self) -> Vec<FilterClause<'_>> {
        let mut clauses = Vec::new();
        for (index, window) in self.tokens.windows(3).enumerate() {
            if let [key, op, value] = window
                && let TokenKind::FilterKey { key: name, negated, .. } = &key.kind
                && let TokenKind::FilterOperator { operator } = &op.kind
                && let TokenKind::FilterValue { value: text, quoted, .. } = &value.kind
            {
                clauses.push(FilterClause {
                    key_index: index,
                    key: name,
                    negated: *negated,
                    operator: *operator,
                    value: text,
                    quoted: *quoted,
                    span: key.span.join(value.span),
                });
            }
        }
        clauses
    }

    /// Index of the `FilterKey` token of the clause containing `index`
    #[must_use]
    pub fn filter_start(&self, index: usize) -> Option<usize> {
        let back = match self.tokens.get(index)?.kind {
            TokenKind::FilterKey { .. } => 0,
            TokenKind::FilterOperator { .. } => 1,
            TokenKind::FilterValue { .. } => 2,
            _ => return None,
        };
        index.checked_sub(back)
    }
}

impl fmt::Display for ParsedQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token(kind: TokenKind, start: usize, end: usize) -> Token {
        Token::new(kind, Span::new(start, end))
    }

    #[test]
    fn test_span_helpers() {
        let span = Span::new(3, 7);
        assert_eq!(span.len(), 4);
        assert!(!span.is_empty());
        assert_eq!(span.slice("is:unresolved"), "unre");
        assert_eq!(Span::new(2, 4).join(Span::new(6, 9)), Span::new(2, 9));
        assert!(Span::new(5, 5).is_empty());
    }

    #[test]
    fn test_comparison_operator_text() {
        assert_eq!(ComparisonOperator::Equal.as_str(), ":");
        assert_eq!(ComparisonOperator::GreaterThanOrEqual.to_string(), ":>=");
        assert!(!ComparisonOperator::Equal.is_comparison());
        assert!(ComparisonOperator::LessThan.is_comparison());
    }

    #[test]
    fn test_invalid_reason_codes_round_trip() {
        for reason in InvalidReason::ALL {
            assert_eq!(InvalidReason::from_code(reason.code()), Some(reason));
        }
        assert_eq!(InvalidReason::from_code("nope"), None);
    }

    #[test]
    fn test_empty_query() {
        let parsed = ParsedQuery::empty();
        assert!(parsed.is_empty());
        assert!(parsed.is_valid());
        assert_eq!(parsed.normalized(), "");
        assert!(parsed.filters().is_empty());
    }

    #[test]
    fn test_whitespace_only_query_is_empty() {
        let parsed = ParsedQuery::from_parts(
            "   ".to_string(),
            vec![token(TokenKind::Whitespace, 0, 3)],
        );
        assert!(parsed.is_empty());
        assert_eq!(parsed.reconstruct(), "   ");
        assert_eq!(parsed.normalized(), "");
    }

    #[test]
    fn test_filter_clause_view() {
        let parsed = ParsedQuery::from_parts(
            "!is:resolved".to_string(),
            vec![
                token(
                    TokenKind::FilterKey {
                        key: "is".into(),
                        negated: true,
                        known: true,
                    },
                    0,
                    3,
                ),
                token(
                    TokenKind::FilterOperator {
                        operator: ComparisonOperator::Equal,
                    },
                    3,
                    4,
                ),
                token(
                    TokenKind::FilterValue {
                        value: "resolved".into(),
                        quoted: false,
                        items: None,
                    },
                    4,
                    12,
                ),
            ],
        );

        let filters = parsed.filters();
        assert_eq!(filters.len(), 1);
        assert_eq!(filters[0].key, "is");
        assert!(filters[0].negated);
        assert_eq!(filters[0].value, "resolved");
        assert_eq!(filters[0].span, Span::new(0, 12));
        assert_eq!(parsed.filter_start(2), Some(0));
        assert_eq!(parsed.filter_start(1), Some(0));
    }

    #[test]
    fn test_invalid_token_accessors() {
        let mut t = token(
            TokenKind::FreeText {
                text: "oops".into(),
                quoted: false,
            },
            0,
            4,
        );
        assert!(t.is_valid());
        assert_eq!(t.invalid_message(), None);

        t.validity = Validity::Invalid {
            reason: InvalidReason::FreeTextNotAllowed,
            message: "no free text".into(),
        };
        assert!(!t.is_valid());
        assert_eq!(t.invalid_reason(), Some(InvalidReason::FreeTextNotAllowed));
        assert_eq!(t.invalid_message(), Some("no free text"));
    }
}
