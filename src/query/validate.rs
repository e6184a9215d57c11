//! Token validation
//!
//! [`validate`] annotates every token of a [`ParsedQuery`] with a [`Validity`]. It
//! never adds or removes tokens. Rules are checked per token in a fixed order and
//! the first one that matches decides the reason.

use super::configuration::Configuration;
use super::token::{InvalidReason, ParsedQuery, Token, TokenKind, Validity};
use super::value::{ValueError, coerce, coerce_list};

/// Annotate each token of `query` with its validity under `config`
///
/// Any validity from an earlier pass is replaced.
#[must_use]
pub fn validate(mut query: ParsedQuery, config: &Configuration) -> ParsedQuery {
    let unbalanced = unbalanced_parens(query.tokens());

    let verdicts: Vec<Validity> = (0..query.tokens().len())
        .map(|index| match check(query.tokens(), index, config, &unbalanced) {
            None => Validity::Valid,
            Some((reason, default_message)) => Validity::Invalid {
                reason,
                message: config
                    .invalid_message(reason)
                    .map_or(default_message, str::to_string),
            },
        })
        .collect();

    for (token, validity) in query.tokens_mut().iter_mut().zip(verdicts) {
        token.validity = validity;
    }
    query
}

/// Indices of parens with no partner
fn unbalanced_parens(tokens: &[Token]) -> Vec<usize> {
    let mut open = Vec::new();
    let mut unmatched = Vec::new();
    for (index, token) in tokens.iter().enumerate() {
        match token.kind {
            TokenKind::ParenOpen => open.push(index),
            TokenKind::ParenClose => {
                if open.pop().is_none() {
                    unmatched.push(index);
                }
            }
            _ => {}
        }
    }
    unmatched.extend(open);
    unmatched
}

fn check(
    tokens: &[Token],
    index: usize,
    config: &Configuration,
    unbalanced: &[usize],
) -> Option<(InvalidReason, String)> {
    match &tokens[index].kind {
        TokenKind::Whitespace => None,

        TokenKind::FreeText { text, quoted } => {
            // A quoted phrase counts even when its contents are blank
            if config.disallow_free_text() && (*quoted || !text.trim().is_empty()) {
                Some((
                    InvalidReason::FreeTextNotAllowed,
                    "Free text is not supported in this search".to_string(),
                ))
            } else if config.disallow_wildcard() && text.contains('*') {
                Some((
                    InvalidReason::WildcardNotAllowed,
                    "Wildcards are not supported in this search".to_string(),
                ))
            } else {
                None
            }
        }

        TokenKind::LogicalOperator { operator } => config.disallow_logical_operators().then(|| {
            (
                InvalidReason::LogicalOperatorNotAllowed,
                format!("The {operator} operator is not supported in this search"),
            )
        }),

        TokenKind::ParenOpen | TokenKind::ParenClose => {
            if config.disallow_logical_operators() {
                Some((
                    InvalidReason::ParensNotAllowed,
                    "Parentheses are not supported in this search".to_string(),
                ))
            } else if unbalanced.contains(&index) {
                Some((
                    InvalidReason::UnbalancedParen,
                    "Unmatched parenthesis".to_string(),
                ))
            } else {
                None
            }
        }

        TokenKind::FilterKey { key, .. } => {
            if config.disallow_unsupported_filters() && !config.is_supported(key) {
                Some((
                    InvalidReason::FilterKeyNotSupported,
                    format!("Invalid key. \"{key}\" is not a supported search key."),
                ))
            } else if config.is_omitted(key) {
                Some((
                    InvalidReason::FilterKeyOmitted,
                    format!("The key \"{key}\" is not available for this dataset"),
                ))
            } else {
                None
            }
        }

        TokenKind::FilterOperator { operator } => {
            if !operator.is_comparison() {
                return None;
            }
            let key = paired_key(tokens, index.checked_sub(1)?)?;
            let kind = config.kind_of(key);
            let is_list = matches!(
                tokens.get(index + 1).map(|t| &t.kind),
                Some(TokenKind::FilterValue { items: Some(_), .. })
            );
            if !kind.is_orderable() {
                Some((
                    InvalidReason::OperatorNotSupported,
                    format!("\"{}\" cannot be used with {kind} values", &operator.as_str()[1..]),
                ))
            } else if is_list {
                Some((
                    InvalidReason::OperatorNotSupported,
                    format!("\"{}\" cannot be used with a list", &operator.as_str()[1..]),
                ))
            } else {
                None
            }
        }

        TokenKind::FilterValue { value, items, .. } => {
            let key = paired_key(tokens, index.checked_sub(2)?)?;
            if config.disallow_wildcard() && value.contains('*') {
                return Some((
                    InvalidReason::WildcardNotAllowed,
                    format!("Wildcards are not supported for \"{key}\""),
                ));
            }

            let kind = config.kind_of(key);
            let coerced = match items {
                Some(items) => coerce_list(items, kind),
                None => coerce(value, kind),
            };
            match coerced {
                Ok(_) => None,
                Err(ValueError::Missing) => Some((
                    InvalidReason::MissingValue,
                    format!("Missing value for \"{key}\""),
                )),
                Err(err) => Some((
                    InvalidReason::InvalidValue,
                    format!("{err}; \"{key}\" expects a {kind} value"),
                )),
            }
        }
    }
}

fn paired_key(tokens: &[Token], index: usize) -> Option<&str> {
    match &tokens.get(index)?.kind {
        TokenKind::FilterKey { key, .. } => Some(key),
        _ => None,
    }
}
