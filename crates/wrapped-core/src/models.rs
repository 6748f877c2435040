use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::de;

/// Label used when an upstream record carries no model or version name.
pub const UNKNOWN_LABEL: &str = "unknown";

/// A `{name, count}` pair from one of the per-day usage breakdowns.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedCount {
    /// Model, extension or client-version name. May be absent or empty.
    #[serde(default, deserialize_with = "de::null_as_default")]
    pub name: Option<String>,
    /// Number of uses attributed to `name` on that day.
    #[serde(default, deserialize_with = "de::count")]
    pub count: u64,
}

impl NamedCount {
    pub fn new(name: impl Into<String>, count: u64) -> Self {
        Self {
            name: Some(name.into()),
            count,
        }
    }

    /// The name, or `None` when it is missing or empty.
    pub fn non_empty_name(&self) -> Option<&str> {
        self.name.as_deref().filter(|n| !n.is_empty())
    }

    /// The name, falling back to [`UNKNOWN_LABEL`].
    pub fn name_or_unknown(&self) -> &str {
        self.non_empty_name().unwrap_or(UNKNOWN_LABEL)
    }
}

/// One calendar day of editor analytics, as emitted by the dashboard API.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyRecord {
    /// Start of the day as Unix epoch milliseconds.
    #[serde(default, deserialize_with = "de::epoch_millis")]
    pub date: i64,
    #[serde(default, deserialize_with = "de::count")]
    pub lines_added: u64,
    #[serde(default, deserialize_with = "de::count")]
    pub lines_deleted: u64,
    #[serde(default, deserialize_with = "de::count")]
    pub accepted_lines_added: u64,
    #[serde(default, deserialize_with = "de::count")]
    pub accepted_lines_deleted: u64,
    #[serde(default, deserialize_with = "de::count")]
    pub total_applies: u64,
    #[serde(default, deserialize_with = "de::count")]
    pub total_accepts: u64,
    #[serde(default, deserialize_with = "de::count")]
    pub total_rejects: u64,
    #[serde(default, deserialize_with = "de::count")]
    pub total_tabs_shown: u64,
    #[serde(default, deserialize_with = "de::count")]
    pub total_tabs_accepted: u64,
    #[serde(default, deserialize_with = "de::count")]
    pub agent_requests: u64,
    #[serde(default, deserialize_with = "de::count")]
    pub subscription_included_reqs: u64,
    #[serde(default, deserialize_with = "de::null_as_default")]
    pub model_usage: Vec<NamedCount>,
    #[serde(default, deserialize_with = "de::null_as_default")]
    pub extension_usage: Vec<NamedCount>,
    #[serde(default, deserialize_with = "de::null_as_default")]
    pub tab_extension_usage: Vec<NamedCount>,
    #[serde(default, deserialize_with = "de::null_as_default")]
    pub client_version_usage: Vec<NamedCount>,
}

impl DailyRecord {
    /// A day counts as active when any code was added, any agent request was
    /// made, or any tab completion was shown.
    pub fn is_active(&self) -> bool {
        self.lines_added > 0 || self.agent_requests > 0 || self.total_tabs_shown > 0
    }

    /// The record's instant in UTC. Out-of-range values fall back to the
    /// Unix epoch.
    pub fn timestamp(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(self.date).unwrap_or_default()
    }

    /// The record's instant in the given zone.
    pub fn timestamp_in<Tz: TimeZone>(&self, tz: &Tz) -> DateTime<Tz> {
        self.timestamp().with_timezone(tz)
    }
}

/// Token figures attached to a single usage event.
///
/// The four token counts arrive in thousands; `total_cents` is already in
/// cents.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenUsage {
    #[serde(default, deserialize_with = "de::amount")]
    pub input_tokens: f64,
    #[serde(default, deserialize_with = "de::amount")]
    pub output_tokens: f64,
    #[serde(default, deserialize_with = "de::amount")]
    pub cache_write_tokens: f64,
    #[serde(default, deserialize_with = "de::amount")]
    pub cache_read_tokens: f64,
    #[serde(default, deserialize_with = "de::amount")]
    pub total_cents: f64,
}

/// A single logged model invocation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageEvent {
    #[serde(default, deserialize_with = "de::null_as_default")]
    pub model: Option<String>,
    #[serde(default, deserialize_with = "de::null_as_default")]
    pub token_usage: TokenUsage,
}

impl UsageEvent {
    /// The model name, falling back to [`UNKNOWN_LABEL`] when missing or empty.
    pub fn model_name(&self) -> &str {
        self.model
            .as_deref()
            .filter(|m| !m.is_empty())
            .unwrap_or(UNKNOWN_LABEL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, NaiveDate};
    use chrono_tz::Tz;

    #[test]
    fn test_daily_record_from_api_shape() {
        let json = r#"{
            "date": "1748736000000",
            "linesAdded": 120,
            "acceptedLinesAdded": 80,
            "agentRequests": 7,
            "totalTabsShown": 40,
            "modelUsage": [{"name": "claude-4-sonnet", "count": 5}],
            "extensionUsage": [{"name": "ts", "count": 3}, {"count": 1}],
            "clientVersionUsage": null
        }"#;
        let record: DailyRecord = serde_json::from_str(json).expect("parse");

        assert_eq!(record.date, 1_748_736_000_000);
        assert_eq!(record.lines_added, 120);
        assert_eq!(record.accepted_lines_added, 80);
        assert_eq!(record.lines_deleted, 0);
        assert_eq!(record.agent_requests, 7);
        assert_eq!(record.model_usage, vec![NamedCount::new("claude-4-sonnet", 5)]);
        assert_eq!(record.extension_usage.len(), 2);
        assert!(record.extension_usage[1].name.is_none());
        assert!(record.client_version_usage.is_empty());
        assert!(record.tab_extension_usage.is_empty());
    }

    #[test]
    fn test_daily_record_missing_date_is_epoch() {
        let record: DailyRecord = serde_json::from_str(r#"{"linesAdded": 3}"#).expect("parse");
        assert_eq!(record.date, 0);
        assert_eq!(record.timestamp(), DateTime::<Utc>::default());
    }

    #[test]
    fn test_is_active() {
        let mut record = DailyRecord::default();
        assert!(!record.is_active());

        record.total_tabs_shown = 1;
        assert!(record.is_active());

        let record = DailyRecord {
            lines_deleted: 50,
            total_applies: 3,
            ..Default::default()
        };
        assert!(!record.is_active(), "deletions and applies alone are not activity");
    }

    #[test]
    fn test_timestamp_in_zone_shifts_calendar_day() {
        // 2025-06-01T02:00:00Z is still May 31st in Los Angeles.
        let record = DailyRecord {
            date: 1_748_743_200_000,
            ..Default::default()
        };
        let tz: Tz = "America/Los_Angeles".parse().expect("tz");
        let local = record.timestamp_in(&tz);
        assert_eq!(local.date_naive(), NaiveDate::from_ymd_opt(2025, 5, 31).unwrap());
        assert_eq!(record.timestamp().day(), 1);
    }

    #[test]
    fn test_timestamp_out_of_range_falls_back_to_epoch() {
        let record = DailyRecord {
            date: i64::MAX,
            ..Default::default()
        };
        assert_eq!(record.timestamp(), DateTime::<Utc>::default());
    }

    #[test]
    fn test_named_count_name_handling() {
        let empty = NamedCount {
            name: Some(String::new()),
            count: 2,
        };
        assert_eq!(empty.non_empty_name(), None);
        assert_eq!(empty.name_or_unknown(), UNKNOWN_LABEL);
        assert_eq!(NamedCount::new("1.2.3", 1).name_or_unknown(), "1.2.3");
    }

    #[test]
    fn test_usage_event_from_api_shape() {
        let json = r#"{
            "model": "gpt-5",
            "tokenUsage": {"inputTokens": 2, "outputTokens": 1.5, "totalCents": 50}
        }"#;
        let event: UsageEvent = serde_json::from_str(json).expect("parse");
        assert_eq!(event.model_name(), "gpt-5");
        assert!((event.token_usage.input_tokens - 2.0).abs() < 1e-9);
        assert!((event.token_usage.output_tokens - 1.5).abs() < 1e-9);
        assert_eq!(event.token_usage.cache_read_tokens, 0.0);
        assert!((event.token_usage.total_cents - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_usage_event_without_model_or_usage() {
        let event: UsageEvent = serde_json::from_str(r#"{"tokenUsage": null}"#).expect("parse");
        assert_eq!(event.model_name(), UNKNOWN_LABEL);
        assert_eq!(event.token_usage, TokenUsage::default());
    }
}
