//! Core data structures shared by the aggregator and the presenter.
//!
//! Rows are modeled twice: raw CSV-facing records live in [`crate::data`],
//! while the parsed domain types here carry `chrono` dates and derived
//! fields. A review is enriched once during aggregation and never mutated
//! afterwards.

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

/// Display string for the all-time bucket
pub const ALL_TIME: &str = "All Time";
/// Display string for the post-release window bucket
pub const WITHIN_TWO_WEEKS: &str = "Within 2 Weeks";
/// Period bucket for reviews without a parseable date
pub const UNDATED: &str = "Undated";
/// Window length for [`within_two_weeks`], in days
pub const RELEASE_WINDOW_DAYS: i64 = 14;

/// An identified product feature. Immutable reference data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    pub feature_id: String,
    pub title: String,
    pub release_date: Option<NaiveDate>,
    pub app: Option<String>,
}

/// A user-submitted review, as read from the raw review table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    pub matched_feature_id: String,
    pub date: Option<NaiveDate>,
    pub text: String,
    pub app: Option<String>,
}

/// A human-labeled training example mapping review text to a cluster name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabeledReview {
    pub text: String,
    pub cluster: String,
}

/// A review after the merge/derive/classify pass of the aggregator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedReview {
    pub matched_feature_id: String,
    pub date: Option<NaiveDate>,
    pub text: String,
    /// Owning app, first non-null of review-side then feature-side app
    pub app: Option<String>,
    pub feature_title: Option<String>,
    pub release_date: Option<NaiveDate>,
    pub within_two_weeks: bool,
    /// Calendar quarter of the review date, e.g. `2024Q1`, or [`UNDATED`]
    pub review_period: String,
    /// Predicted cluster label
    pub cluster: String,
}

/// Aggregated count of reviews for a (feature, cluster, time-bucket) triple.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowRecord {
    pub feature_title: String,
    pub cluster: String,
    /// One of [`ALL_TIME`], a quarter key, or [`WITHIN_TWO_WEEKS`]
    pub filter: String,
    pub value: u64,
}

/// Time-bucket identifier used in the flow table's `Filter` column.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TimeFilter {
    AllTime,
    WithinTwoWeeks,
    Quarter(String),
}

impl TimeFilter {
    /// Parse a filter string; anything that is not a sentinel is a quarter key.
    pub fn parse(s: &str) -> Self {
        match s {
            ALL_TIME => Self::AllTime,
            WITHIN_TWO_WEEKS => Self::WithinTwoWeeks,
            other => Self::Quarter(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::AllTime => ALL_TIME,
            Self::WithinTwoWeeks => WITHIN_TWO_WEEKS,
            Self::Quarter(q) => q,
        }
    }
}

impl std::fmt::Display for TimeFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Date formats accepted in raw input tables, tried in order.
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y-%m-%d %H:%M:%S",
    "%m/%d/%Y",
    "%m/%d/%y",
    "%d-%b-%Y",
    "%B %d, %Y",
];

/// Parse a date string leniently. Unparseable or empty input yields `None`
/// rather than an error; downstream display renders it as `Unknown`.
pub fn parse_date_flex(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(raw, fmt) {
            return Some(d);
        }
    }
    // Timestamps with a time component fall back to datetime parsing
    chrono::NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S")
        .map(|dt| dt.date())
        .ok()
}

/// Quarter key for a date, matching the `YYYYQn` period convention.
pub fn quarter_key(date: NaiveDate) -> String {
    let quarter = (date.month0() / 3) + 1;
    format!("{}Q{}", date.year(), quarter)
}

/// Monday of the calendar week containing `date`, for weekly trend bucketing.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    let offset = date.weekday().num_days_from_monday() as i64;
    date - Duration::days(offset)
}

/// Post-release window membership: true iff the review was posted between
/// the release day and 14 days after it, inclusive. False when either date
/// is absent.
pub fn within_two_weeks(review_date: Option<NaiveDate>, release_date: Option<NaiveDate>) -> bool {
    match (review_date, release_date) {
        (Some(review), Some(release)) => {
            let days = (review - release).num_days();
            (0..=RELEASE_WINDOW_DAYS).contains(&days)
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_date_formats() {
        assert_eq!(parse_date_flex("2024-01-15"), Some(date(2024, 1, 15)));
        assert_eq!(parse_date_flex("01/15/2024"), Some(date(2024, 1, 15)));
        assert_eq!(parse_date_flex("15-Jan-2024"), Some(date(2024, 1, 15)));
        assert_eq!(
            parse_date_flex("2024-01-15 10:30:00"),
            Some(date(2024, 1, 15))
        );
    }

    #[test]
    fn test_parse_date_garbage_is_none() {
        assert_eq!(parse_date_flex(""), None);
        assert_eq!(parse_date_flex("   "), None);
        assert_eq!(parse_date_flex("not a date"), None);
        assert_eq!(parse_date_flex("2024-13-40"), None);
    }

    #[test]
    fn test_quarter_key() {
        assert_eq!(quarter_key(date(2024, 1, 1)), "2024Q1");
        assert_eq!(quarter_key(date(2024, 3, 31)), "2024Q1");
        assert_eq!(quarter_key(date(2024, 4, 1)), "2024Q2");
        assert_eq!(quarter_key(date(2024, 12, 31)), "2024Q4");
    }

    #[test]
    fn test_week_start_is_monday() {
        // 2024-01-17 is a Wednesday
        assert_eq!(week_start(date(2024, 1, 17)), date(2024, 1, 15));
        // Monday maps to itself
        assert_eq!(week_start(date(2024, 1, 15)), date(2024, 1, 15));
        // Sunday belongs to the preceding Monday's week
        assert_eq!(week_start(date(2024, 1, 21)), date(2024, 1, 15));
    }

    #[test]
    fn test_within_two_weeks_window() {
        let release = Some(date(2023, 12, 25));
        assert!(within_two_weeks(Some(date(2023, 12, 25)), release)); // day 0
        assert!(within_two_weeks(Some(date(2024, 1, 1)), release)); // day 7
        assert!(within_two_weeks(Some(date(2024, 1, 8)), release)); // day 14
        assert!(!within_two_weeks(Some(date(2024, 1, 9)), release)); // day 15
        assert!(!within_two_weeks(Some(date(2023, 12, 24)), release)); // day -1
    }

    #[test]
    fn test_within_two_weeks_missing_dates() {
        assert!(!within_two_weeks(None, Some(date(2024, 1, 1))));
        assert!(!within_two_weeks(Some(date(2024, 1, 1)), None));
        assert!(!within_two_weeks(None, None));
    }

    #[test]
    fn test_time_filter_round_trip() {
        assert_eq!(TimeFilter::parse("All Time"), TimeFilter::AllTime);
        assert_eq!(
            TimeFilter::parse("Within 2 Weeks"),
            TimeFilter::WithinTwoWeeks
        );
        assert_eq!(
            TimeFilter::parse("2024Q2"),
            TimeFilter::Quarter("2024Q2".into())
        );
        assert_eq!(TimeFilter::parse("2024Q2").to_string(), "2024Q2");
    }
}
