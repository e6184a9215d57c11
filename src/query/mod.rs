//! Structured search query parsing and validation
//!
//! Data flows one way: raw text is tokenized by [`parse`], annotated by
//! [`validate`], and the result answers "is the query valid" and "what is its
//! normalized form".
//!
//! ```
//! use querybar::keys::FilterKeyTable;
//! use querybar::query::{self, Configuration};
//!
//! let config = Configuration::builder()
//!     .filter_keys(FilterKeyTable::issue_defaults())
//!     .disallow_free_text(true)
//!     .build();
//!
//! let parsed = query::parse_and_validate("error is:unresolved", &config);
//! assert!(!parsed.is_valid());
//! assert_eq!(parsed.invalid_tokens().count(), 1);
//! ```

pub mod configuration;
pub mod lexer;
pub mod token;
pub mod validate;
pub mod value;

pub use configuration::{Configuration, ConfigurationBuilder};
pub use lexer::{is_filter_key, parse};
pub use token::{
    ComparisonOperator, FilterClause, InvalidReason, LogicalOperator, ParsedQuery, Span, Token,
    TokenKind, Validity,
};
pub use validate::validate;
pub use value::{FilterValue, ValueError, ValueKind};

/// Parse `raw` with the configuration's key table, then validate it
#[must_use]
pub fn parse_and_validate(raw: &str, config: &Configuration) -> ParsedQuery {
    validate(parse(raw, config.filter_keys()), config)
}
