//! Typed filter values
//!
//! Every filter key declares the kind of value it expects. The validator uses
//! [`coerce`] to check that a `FilterValue` token can be read as that kind, e.g.
//! `age:-24h` is a relative date and `transaction.duration:>1.5s` a duration.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeDelta, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;
use thiserror::Error;

static NUMBER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([+-]?(?:\d+(?:\.\d*)?|\.\d+))([kmbKMB])?$").expect("number pattern is valid")
});

static DURATION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d+(?:\.\d+)?)(ms|s|min|m|hr|h|d|w)$").expect("duration pattern is valid")
});

static RELATIVE_DATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([+-])(\d+)([mhdw])$").expect("relative date pattern is valid")
});

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValueError {
    #[error("Missing value")]
    Missing,
    #[error("Invalid number: {0}")]
    InvalidNumber(String),
    #[error("Invalid boolean: {0}")]
    InvalidBoolean(String),
    #[error("Invalid date: {0}")]
    InvalidDate(String),
    #[error("Invalid duration: {0}")]
    InvalidDuration(String),
    #[error("Invalid size: {0}")]
    InvalidSize(String),
}

/// Kind of value a filter key accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    #[default]
    String,
    Number,
    Boolean,
    Date,
    Duration,
    Size,
    List,
}

impl ValueKind {
    /// Kinds that accept `>`, `>=`, `<`, `<=`
    #[must_use]
    pub const fn is_orderable(self) -> bool {
        matches!(self, Self::Number | Self::Date | Self::Duration | Self::Size)
    }

    /// Kind of each item when a bracketed list is given for this kind
    #[must_use]
    pub const fn item_kind(self) -> Self {
        match self {
            Self::List => Self::String,
            other => other,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Date => "date",
            Self::Duration => "duration",
            Self::Size => "size",
            Self::List => "list",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for ValueKind {
    type Error = String;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.to_ascii_lowercase().as_str() {
            "string" => Ok(Self::String),
            "number" | "integer" => Ok(Self::Number),
            "boolean" | "bool" => Ok(Self::Boolean),
            "date" => Ok(Self::Date),
            "duration" => Ok(Self::Duration),
            "size" => Ok(Self::Size),
            "list" => Ok(Self::List),
            other => Err(format!("unknown value kind '{other}'")),
        }
    }
}

/// A date value, either fixed or relative to now
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateValue {
    /// A calendar day such as `2024-03-01`
    Day(NaiveDate),
    /// A point in time such as `2024-03-01T12:00:00`
    At(DateTime<Utc>),
    /// Offset from now such as `-24h` (negative is the past)
    Relative(TimeDelta),
}

/// A filter value read as its declared kind
#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    Text(String),
    Number(f64),
    Boolean(bool),
    Date(DateValue),
    Duration(TimeDelta),
    /// Size in bytes
    Size(u64),
    List(Vec<FilterValue>),
}

/// Read a single (non-list) value as `kind`
///
/// A `List` kind accepts a single bare value as a one-element list.
///
/// # Errors
/// Returns a `ValueError` describing why the text is not a value of `kind`.
pub fn coerce(raw: &str, kind: ValueKind) -> Result<FilterValue, ValueError> {
    if raw.is_empty() {
        return Err(ValueError::Missing);
    }

    match kind {
        ValueKind::String => Ok(FilterValue::Text(raw.to_string())),
        ValueKind::List => Ok(FilterValue::List(vec![FilterValue::Text(raw.to_string())])),
        ValueKind::Number => parse_number(raw).map(FilterValue::Number),
        ValueKind::Boolean => parse_boolean(raw).map(FilterValue::Boolean),
        ValueKind::Date => parse_date(raw).map(FilterValue::Date),
        ValueKind::Duration => parse_duration(raw).map(FilterValue::Duration),
        ValueKind::Size => parse_size(raw).map(FilterValue::Size),
    }
}

/// Read every item of a bracketed list as the item kind of `kind`
///
/// # Errors
/// Returns the first item's `ValueError`, or `Missing` for an empty list.
pub fn coerce_list(items: &[String], kind: ValueKind) -> Result<FilterValue, ValueError> {
    if items.is_empty() {
        return Err(ValueError::Missing);
    }

    let item_kind = kind.item_kind();
    items
        .iter()
        .map(|item| coerce(item, item_kind))
        .collect::<Result<Vec<_>, _>>()
        .map(FilterValue::List)
}

fn parse_number(raw: &str) -> Result<f64, ValueError> {
    let caps = NUMBER_RE
        .captures(raw)
        .ok_or_else(|| ValueError::InvalidNumber(raw.to_string()))?;

    let base: f64 = caps[1]
        .parse()
        .map_err(|_| ValueError::InvalidNumber(raw.to_string()))?;

    let multiplier = match caps.get(2).map(|m| m.as_str().to_ascii_lowercase()) {
        None => 1.0,
        Some(suffix) => match suffix.as_str() {
            "k" => 1_000.0,
            "m" => 1_000_000.0,
            "b" => 1_000_000_000.0,
            _ => return Err(ValueError::InvalidNumber(raw.to_string())),
        },
    };

    Ok(base * multiplier)
}

fn parse_boolean(raw: &str) -> Result<bool, ValueError> {
    match raw.to_ascii_lowercase().as_str() {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        _ => Err(ValueError::InvalidBoolean(raw.to_string())),
    }
}

fn parse_date(raw: &str) -> Result<DateValue, ValueError> {
    if let Some(caps) = RELATIVE_DATE_RE.captures(raw) {
        let amount: i64 = caps[2]
            .parse()
            .map_err(|_| ValueError::InvalidDate(raw.to_string()))?;
        let amount = if &caps[1] == "-" { -amount } else { amount };
        let delta = match &caps[3] {
            "m" => TimeDelta::try_minutes(amount),
            "h" => TimeDelta::try_hours(amount),
            "d" => TimeDelta::try_days(amount),
            "w" => TimeDelta::try_weeks(amount),
            _ => None,
        }
        .ok_or_else(|| ValueError::InvalidDate(raw.to_string()))?;
        return Ok(DateValue::Relative(delta));
    }

    if let Ok(day) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Ok(DateValue::Day(day));
    }

    if let Ok(at) = DateTime::parse_from_rfc3339(raw) {
        return Ok(DateValue::At(at.with_timezone(&Utc)));
    }

    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S")
        .map(|at| DateValue::At(at.and_utc()))
        .map_err(|_| ValueError::InvalidDate(raw.to_string()))
}

fn parse_duration(raw: &str) -> Result<TimeDelta, ValueError> {
    let caps = DURATION_RE
        .captures(raw)
        .ok_or_else(|| ValueError::InvalidDuration(raw.to_string()))?;

    let amount: f64 = caps[1]
        .parse()
        .map_err(|_| ValueError::InvalidDuration(raw.to_string()))?;

    let unit_millis: f64 = match &caps[2] {
        "ms" => 1.0,
        "s" => 1_000.0,
        "m" | "min" => 60_000.0,
        "h" | "hr" => 3_600_000.0,
        "d" => 86_400_000.0,
        "w" => 604_800_000.0,
        _ => return Err(ValueError::InvalidDuration(raw.to_string())),
    };

    let millis = amount * unit_millis;
    if !millis.is_finite() || millis > i64::MAX as f64 {
        return Err(ValueError::InvalidDuration(raw.to_string()));
    }

    #[allow(clippy::cast_possible_truncation)]
    TimeDelta::try_milliseconds(millis.round() as i64)
        .ok_or_else(|| ValueError::InvalidDuration(raw.to_string()))
}

fn parse_size(raw: &str) -> Result<u64, ValueError> {
    byte_unit::Byte::parse_str(raw, true)
        .map(|byte| byte.as_u64())
        .map_err(|_| ValueError::InvalidSize(raw.to_string()))
}
