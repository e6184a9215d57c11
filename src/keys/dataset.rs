//! Per-dataset key restrictions
//!
//! Some datasets only support a handful of keys; those get an explicit supported
//! list. Others support everything except a few keys; those get an omitted list.
//! Which applies can depend on organization feature flags.
//!
//! When both lists are present, omission wins: an omitted key is rejected even if
//! the supported list names it.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

const FEATURE_IGNORE_ARCHIVED: &str = "metric-alert-ignore-archived";
const FEATURE_ALLOW_INDEXED: &str = "alert-allow-indexed";
const FEATURE_ON_DEMAND_EXTRACTION: &str = "on-demand-metrics-extraction";
const FEATURE_ON_DEMAND_UI: &str = "on-demand-metrics-ui";

const TRANSACTION_SUPPORTED_KEYS: &[&str] = &[
    "release",
    "transaction",
    "transaction.op",
    "transaction.status",
    "http.method",
    "http.status_code",
    "browser.name",
    "geo.country_code",
    "os.name",
];

const SESSION_SUPPORTED_KEYS: &[&str] = &["release"];

const WEB_VITALS: &[&str] = &[
    "measurements.fp",
    "measurements.fcp",
    "measurements.lcp",
    "measurements.fid",
    "measurements.cls",
    "measurements.ttfb",
    "measurements.ttfb.requesttime",
    "measurements.inp",
];

const MOBILE_VITALS: &[&str] = &[
    "measurements.app_start_cold",
    "measurements.app_start_warm",
    "measurements.frames_total",
    "measurements.frames_slow",
    "measurements.frames_frozen",
    "measurements.frames_slow_rate",
    "measurements.frames_frozen_rate",
    "measurements.stall_count",
    "measurements.stall_total_time",
    "measurements.stall_longest_time",
    "measurements.stall_percentage",
    "measurements.time_to_full_display",
    "measurements.time_to_initial_display",
];

const SPAN_OP_BREAKDOWNS: &[&str] = &[
    "spans.browser",
    "spans.db",
    "spans.http",
    "spans.resource",
];

const ERRORS_OMITTED_KEYS: &[&str] = &[
    "event.type",
    "release.version",
    "release.stage",
    "release.build",
    "project",
    "transaction",
    "transaction.duration",
    "transaction.op",
    "transaction.status",
];

// Only reachable with the alert-allow-indexed feature
const INDEXED_OMITTED_KEYS: &[&str] = &[
    "age",
    "assigned",
    "assigned_or_suggested",
    "bookmarks",
    "device.model_id",
    "event.timestamp",
    "event.type",
    "firstRelease",
    "firstSeen",
    "is",
    "issue.category",
    "issue.type",
    "lastSeen",
    "platform.name",
];

const ON_DEMAND_UNSUPPORTED_KEYS: &[&str] = &[
    "event.type",
    "project.name",
    "timestamp",
    "id",
    "message",
    "error.type",
    "error.value",
];

/// Data source a search runs against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Dataset {
    #[default]
    Errors,
    Transactions,
    Metrics,
    GenericMetrics,
    Sessions,
}

impl Dataset {
    pub const ALL: [Self; 5] = [
        Self::Errors,
        Self::Transactions,
        Self::Metrics,
        Self::GenericMetrics,
        Self::Sessions,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Errors => "errors",
            Self::Transactions => "transactions",
            Self::Metrics => "metrics",
            Self::GenericMetrics => "generic_metrics",
            Self::Sessions => "sessions",
        }
    }

    /// Supported and omitted keys for this dataset under `features`
    #[must_use]
    pub fn restrictions(self, features: &FeatureFlags) -> KeyRestrictions {
        KeyRestrictions {
            supported: self.supported_keys(features),
            omitted: self.omitted_keys(features),
        }
    }

    fn supported_keys(self, features: &FeatureFlags) -> Option<Vec<String>> {
        let keys: Option<&[&str]> = match self {
            Self::Errors => features
                .contains(FEATURE_IGNORE_ARCHIVED)
                .then_some(&["is"][..]),
            Self::Transactions | Self::GenericMetrics => {
                if features.contains(FEATURE_ALLOW_INDEXED) || features.on_demand_metrics_ui() {
                    None
                } else {
                    Some(TRANSACTION_SUPPORTED_KEYS)
                }
            }
            Self::Metrics | Self::Sessions => Some(SESSION_SUPPORTED_KEYS),
        };
        keys.map(to_owned_keys)
    }

    fn omitted_keys(self, features: &FeatureFlags) -> Option<Vec<String>> {
        match self {
            Self::Errors => {
                let mut keys = to_owned_keys(ERRORS_OMITTED_KEYS);
                keys.extend(to_owned_keys(WEB_VITALS));
                keys.extend(to_owned_keys(MOBILE_VITALS));
                keys.extend(to_owned_keys(SPAN_OP_BREAKDOWNS));
                Some(keys)
            }
            Self::Transactions | Self::GenericMetrics => {
                if features.on_demand_metrics_ui() {
                    Some(to_owned_keys(ON_DEMAND_UNSUPPORTED_KEYS))
                } else if features.contains(FEATURE_ALLOW_INDEXED) {
                    let mut keys = to_owned_keys(INDEXED_OMITTED_KEYS);
                    keys.extend(to_owned_keys(WEB_VITALS));
                    keys.extend(to_owned_keys(MOBILE_VITALS));
                    Some(keys)
                } else {
                    None
                }
            }
            Self::Metrics | Self::Sessions => None,
        }
    }
}

impl fmt::Display for Dataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for Dataset {
    type Error = String;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::ALL
            .into_iter()
            .find(|dataset| dataset.as_str() == value.replace('-', "_"))
            .ok_or_else(|| format!("unknown dataset '{value}'"))
    }
}

fn to_owned_keys(keys: &[&str]) -> Vec<String> {
    keys.iter().map(|key| (*key).to_string()).collect()
}

/// Organization feature flags relevant to key restrictions
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureFlags(BTreeSet<String>);

impl FeatureFlags {
    #[must_use]
    pub const fn new() -> Self {
        Self(BTreeSet::new())
    }

    #[must_use]
    pub fn contains(&self, feature: &str) -> bool {
        self.0.contains(feature)
    }

    pub fn enable(&mut self, feature: impl Into<String>) {
        self.0.insert(feature.into());
    }

    fn on_demand_metrics_ui(&self) -> bool {
        self.contains(FEATURE_ON_DEMAND_EXTRACTION) && self.contains(FEATURE_ON_DEMAND_UI)
    }
}

impl<S: Into<String>> FromIterator<S> for FeatureFlags {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

/// Supported and omitted key lists; `None` means "no restriction of that kind"
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyRestrictions {
    pub supported: Option<Vec<String>>,
    pub omitted: Option<Vec<String>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_errors_dataset_default() {
        let restrictions = Dataset::Errors.restrictions(&FeatureFlags::new());
        assert_eq!(restrictions.supported, None);
        let omitted = restrictions.omitted.unwrap();
        assert!(omitted.contains(&"event.type".to_string()));
        assert!(omitted.contains(&"measurements.lcp".to_string()));
        assert!(!omitted.contains(&"is".to_string()));
    }

    #[test]
    fn test_errors_dataset_ignore_archived() {
        let features: FeatureFlags = ["metric-alert-ignore-archived"].into_iter().collect();
        let restrictions = Dataset::Errors.restrictions(&features);
        assert_eq!(restrictions.supported, Some(vec!["is".to_string()]));
    }

    #[test]
    fn test_transactions_default_has_fixed_supported_list() {
        let restrictions = Dataset::Transactions.restrictions(&FeatureFlags::new());
        let supported = restrictions.supported.unwrap();
        assert!(supported.contains(&"http.method".to_string()));
        assert_eq!(restrictions.omitted, None);
    }

    #[test]
    fn test_transactions_allow_indexed() {
        let features: FeatureFlags = ["alert-allow-indexed"].into_iter().collect();
        let restrictions = Dataset::Transactions.restrictions(&features);
        assert_eq!(restrictions.supported, None);
        assert!(restrictions.omitted.unwrap().contains(&"firstSeen".to_string()));
    }

    #[test]
    fn test_generic_metrics_on_demand() {
        let features: FeatureFlags = ["on-demand-metrics-extraction", "on-demand-metrics-ui"]
            .into_iter()
            .collect();
        let restrictions = Dataset::GenericMetrics.restrictions(&features);
        assert_eq!(restrictions.supported, None);
        assert!(restrictions.omitted.unwrap().contains(&"message".to_string()));
    }

    #[test]
    fn test_on_demand_requires_both_flags() {
        let features: FeatureFlags = ["on-demand-metrics-extraction"].into_iter().collect();
        let restrictions = Dataset::Transactions.restrictions(&features);
        assert!(restrictions.supported.is_some());
    }

    #[test]
    fn test_sessions_and_metrics_release_only() {
        for dataset in [Dataset::Sessions, Dataset::Metrics] {
            let restrictions = dataset.restrictions(&FeatureFlags::new());
            assert_eq!(restrictions.supported, Some(vec!["release".to_string()]));
            assert_eq!(restrictions.omitted, None);
        }
    }

    #[test]
    fn test_dataset_from_str() {
        assert_eq!(Dataset::try_from("generic-metrics"), Ok(Dataset::GenericMetrics));
        assert_eq!(Dataset::try_from("errors"), Ok(Dataset::Errors));
        assert!(Dataset::try_from("logs").is_err());
    }
}
