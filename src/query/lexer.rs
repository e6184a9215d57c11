//! Query tokenizer
//!
//! Scans a raw query left to right and produces a [`ParsedQuery`] whose token spans
//! cover the input exactly. Parsing never fails: malformed input such as an
//! unterminated quote degrades to free text.
//!
//! # Syntax
//!
//! - `key:value`, `!key:value`, `key:>=value`: filter clauses
//! - `key:"quoted value"` and `key:[a,b,"c d"]`: quoted and list values
//! - `AND` / `OR` (any case): logical operators
//! - `(` / `)`: grouping
//! - `"quoted text"`: a single free-text token
//! - anything else: free text; adjacent words merge into one token

use super::token::{ComparisonOperator, LogicalOperator, ParsedQuery, Span, Token, TokenKind};
use crate::keys::FilterKeyTable;
use tracing::debug;

/// Tokenize `raw` against the known filter keys
///
/// Keys missing from `keys` still produce `FilterKey` tokens with `known: false`;
/// the validator decides whether that is an error.
#[must_use]
pub fn parse(raw: &str, keys: &FilterKeyTable) -> ParsedQuery {
    let mut lexer = Lexer::new(raw, keys);
    lexer.run();
    let tokens = merge_free_text(raw, lexer.tokens);
    ParsedQuery::from_parts(raw.to_string(), tokens)
}

enum FilterScan {
    /// Not filter syntax; the caller reads a plain word instead
    NotFilter,
    /// Filter tokens were pushed
    Filter,
    /// An unterminated quoted value swallowed the rest of the input
    Recovered,
}

struct Lexer<'a> {
    source: &'a str,
    chars: Vec<(usize, char)>,
    pos: usize,
    keys: &'a FilterKeyTable,
    tokens: Vec<Token>,
}

impl<'a> Lexer<'a> {
    fn new(source: &'a str, keys: &'a FilterKeyTable) -> Self {
        Self {
            source,
            chars: source.char_indices().collect(),
            pos: 0,
            keys,
            tokens: Vec::new(),
        }
    }

    /// Byte offset of the char at `index`, or the input length past the end
    fn offset(&self, index: usize) -> usize {
        self.chars
            .get(index)
            .map_or(self.source.len(), |(offset, _)| *offset)
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).map(|(_, c)| *c)
    }

    fn peek_at(&self, index: usize) -> Option<char> {
        self.chars.get(index).map(|(_, c)| *c)
    }

    fn push(&mut self, kind: TokenKind, start: usize, end: usize) {
        let span = Span::new(self.offset(start), self.offset(end));
        self.tokens.push(Token::new(kind, span));
    }

    fn run(&mut self) {
        while let Some(c) = self.peek() {
            let start = self.pos;
            match c {
                c if c.is_whitespace() => {
                    while self.peek().is_some_and(char::is_whitespace) {
                        self.pos += 1;
                    }
                    self.push(TokenKind::Whitespace, start, self.pos);
                }
                '(' => {
                    self.pos += 1;
                    self.push(TokenKind::ParenOpen, start, self.pos);
                }
                ')' => {
                    self.pos += 1;
                    self.push(TokenKind::ParenClose, start, self.pos);
                }
                '"' => match read_quoted(&self.chars, &mut self.pos) {
                    Some(text) => self.push(TokenKind::FreeText { text, quoted: true }, start, self.pos),
                    None => self.recover(start),
                },
                _ => match self.try_filter() {
                    FilterScan::Filter | FilterScan::Recovered => {}
                    FilterScan::NotFilter => {
                        self.pos = start;
                        let word = read_word(&self.chars, &mut self.pos);
                        let kind = if word.eq_ignore_ascii_case("and") {
                            TokenKind::LogicalOperator {
                                operator: LogicalOperator::And,
                            }
                        } else if word.eq_ignore_ascii_case("or") {
                            TokenKind::LogicalOperator {
                                operator: LogicalOperator::Or,
                            }
                        } else {
                            TokenKind::FreeText {
                                text: word,
                                quoted: false,
                            }
                        };
                        self.push(kind, start, self.pos);
                    }
                },
            }
        }
    }

    /// Turn everything from `start` to the end of input into free text
    fn recover(&mut self, start: usize) {
        let span_start = self.offset(start);
        debug!(
            offset = span_start,
            "unterminated quote, treating remainder as free text"
        );
        self.pos = self.chars.len();
        let text = self.source[span_start..].to_string();
        self.push(TokenKind::FreeText { text, quoted: false }, start, self.pos);
    }

    fn try_filter(&mut self) -> FilterScan {
        let start = self.pos;
        let mut cursor = start;

        let negated = self.peek_at(cursor) == Some('!');
        if negated {
            cursor += 1;
        }

        let key_start = cursor;
        while self.peek_at(cursor).is_some_and(is_key_char) {
            cursor += 1;
        }
        if cursor == key_start || self.peek_at(cursor) != Some(':') {
            return FilterScan::NotFilter;
        }

        let key: String = self.chars[key_start..cursor].iter().map(|(_, c)| *c).collect();
        let key_end = cursor;

        cursor += 1;
        let operator = match (self.peek_at(cursor), self.peek_at(cursor + 1)) {
            (Some('>'), Some('=')) => {
                cursor += 2;
                ComparisonOperator::GreaterThanOrEqual
            }
            (Some('<'), Some('=')) => {
                cursor += 2;
                ComparisonOperator::LessThanOrEqual
            }
            (Some('>'), _) => {
                cursor += 1;
                ComparisonOperator::GreaterThan
            }
            (Some('<'), _) => {
                cursor += 1;
                ComparisonOperator::LessThan
            }
            _ => ComparisonOperator::Equal,
        };
        let operator_end = cursor;

        let value_start = cursor;
        let value = match self.peek_at(cursor) {
            Some('"') => match read_quoted(&self.chars, &mut cursor) {
                Some(text) => TokenKind::FilterValue {
                    value: text,
                    quoted: true,
                    items: None,
                },
                None => {
                    self.recover(start);
                    return FilterScan::Recovered;
                }
            },
            Some('[') => match read_list(&self.chars, &mut cursor) {
                ListScan::Items(items) => {
                    let raw = self.source[self.offset(value_start)..self.offset(cursor)].to_string();
                    TokenKind::FilterValue {
                        value: raw,
                        quoted: false,
                        items: Some(items),
                    }
                }
                ListScan::OpenQuote => {
                    self.recover(start);
                    return FilterScan::Recovered;
                }
                ListScan::NotList => {
                    cursor = value_start;
                    bare_value(&self.chars, &mut cursor)
                }
            },
            _ => bare_value(&self.chars, &mut cursor),
        };

        let known = self.keys.contains(&key);
        self.push(
            TokenKind::FilterKey {
                key,
                negated,
                known,
            },
            start,
            key_end,
        );
        self.push(TokenKind::FilterOperator { operator }, key_end, operator_end);
        self.push(value, value_start, cursor);
        self.pos = cursor;
        FilterScan::Filter
    }
}

const fn is_key_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-')
}

/// Whether `key` lexes as a filter key on the left of `:`
#[must_use]
pub fn is_filter_key(key: &str) -> bool {
    !key.is_empty() && key.chars().all(is_key_char)
}

fn ends_value(c: char) -> bool {
    c.is_whitespace() || c == ')'
}

fn bare_value(chars: &[(usize, char)], i: &mut usize) -> TokenKind {
    let mut value = String::new();
    while let Some((_, c)) = chars.get(*i) {
        if ends_value(*c) {
            break;
        }
        value.push(*c);
        *i += 1;
    }
    TokenKind::FilterValue {
        value,
        quoted: false,
        items: None,
    }
}

/// Read a `"..."` string starting at the opening quote
///
/// Returns `None` (leaving `i` untouched) when the closing quote is missing.
fn read_quoted(chars: &[(usize, char)], i: &mut usize) -> Option<String> {
    let mut cursor = *i + 1;
    let mut s = String::new();
    while let Some((_, c)) = chars.get(cursor) {
        match c {
            '\\' if cursor + 1 < chars.len() => {
                s.push(chars[cursor + 1].1);
                cursor += 2;
            }
            '"' => {
                *i = cursor + 1;
                return Some(s);
            }
            _ => {
                s.push(*c);
                cursor += 1;
            }
        }
    }
    None
}

enum ListScan {
    Items(Vec<String>),
    /// Unclosed bracket, or junk after the closing one; read as a bare value
    NotList,
    /// A quoted item never closes
    OpenQuote,
}

/// Read a `[a, b, "c d"]` list starting at the opening bracket
fn read_list(chars: &[(usize, char)], i: &mut usize) -> ListScan {
    let mut cursor = *i + 1;
    let mut items = Vec::new();
    let mut current = String::new();

    loop {
        let Some((_, c)) = chars.get(cursor) else {
            return ListScan::NotList;
        };
        match c {
            '"' => match read_quoted(chars, &mut cursor) {
                Some(text) => current.push_str(&text),
                None => return ListScan::OpenQuote,
            },
            ',' => {
                items.push(current.trim().to_string());
                current.clear();
                cursor += 1;
            }
            ']' => {
                cursor += 1;
                break;
            }
            _ => {
                current.push(*c);
                cursor += 1;
            }
        }
    }

    if chars.get(cursor).is_some_and(|(_, c)| !ends_value(*c)) {
        return ListScan::NotList;
    }

    let last = current.trim();
    if !last.is_empty() || !items.is_empty() {
        items.push(last.to_string());
    }
    *i = cursor;
    ListScan::Items(items)
}

fn read_word(chars: &[(usize, char)], i: &mut usize) -> String {
    let mut word = String::new();
    while let Some((_, c)) = chars.get(*i) {
        match c {
            c if c.is_whitespace() => break,
            '(' | ')' => break,
            _ => {
                word.push(*c);
                *i += 1;
            }
        }
    }
    word
}

const fn is_plain_text(token: &Token) -> bool {
    matches!(token.kind, TokenKind::FreeText { quoted: false, .. })
}

/// Merge runs of unquoted free text separated only by whitespace
fn merge_free_text(source: &str, tokens: Vec<Token>) -> Vec<Token> {
    let mut merged: Vec<Token> = Vec::with_capacity(tokens.len());

    for token in tokens {
        if is_plain_text(&token) {
            let target = match merged.as_slice() {
                [.., prev] if is_plain_text(prev) => Some(merged.len() - 1),
                [.., prev, gap] if is_plain_text(prev) && gap.is_trivia() => Some(merged.len() - 2),
                _ => None,
            };
            if let Some(target) = target {
                merged.truncate(target + 1);
                let span = merged[target].span.join(token.span);
                let text = span.slice(source).to_string();
                merged[target] = Token::new(TokenKind::FreeText { text, quoted: false }, span);
                continue;
            }
        }
        merged.push(token);
    }

    merged
}
