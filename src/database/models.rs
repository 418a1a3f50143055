/*!
 * Database entity models and DTOs.
 *
 * These structures map directly to database tables and provide
 * type-safe access to persisted data.
 */

use chrono::{DateTime, Duration, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::analysis::emotion::{RiskLevel, Sentiment};
use crate::analysis::trends::EmotionTrend;

/// Stored form of a timestamp; lexicographic order matches time order
pub fn format_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parse a stored timestamp, falling back to the epoch for corrupt rows
pub fn parse_timestamp(value: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(value)
        .map(|t| t.with_timezone(&Utc))
        .unwrap_or_default()
}

/// Calendar day of a timestamp, `YYYY-MM-DD`
pub fn day_of(timestamp: &DateTime<Utc>) -> String {
    timestamp.format("%Y-%m-%d").to_string()
}

/// A journal entry awaiting insertion
#[derive(Debug, Clone, PartialEq)]
pub struct NewJournalEntry {
    pub content: String,
    pub timestamp: DateTime<Utc>,
    pub emotions: Vec<String>,
    pub sentiment: Sentiment,
    pub sentiment_score: f64,
    pub risk_level: RiskLevel,
    pub session_id: String,
    pub anonymous_user_id: Option<String>,
}

/// Journal entry record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JournalEntryRecord {
    /// Unique identifier (UUID)
    pub id: String,
    /// The entry text as written
    pub content: String,
    pub timestamp: DateTime<Utc>,
    /// Detected emotion names, strongest first
    pub emotions: Vec<String>,
    pub sentiment: Sentiment,
    pub sentiment_score: f64,
    pub risk_level: RiskLevel,
    pub session_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anonymous_user_id: Option<String>,
}

impl JournalEntryRecord {
    /// Number of whitespace separated words in the content
    pub fn word_count(&self) -> usize {
        self.content.split_whitespace().count()
    }
}

impl From<&JournalEntryRecord> for EmotionTrend {
    fn from(entry: &JournalEntryRecord) -> Self {
        EmotionTrend {
            date: day_of(&entry.timestamp),
            emotions: entry.emotions.clone(),
            sentiment: entry.sentiment_score,
            risk_level: entry.risk_level,
        }
    }
}

/// Session record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    pub session_id: String,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub total_entries: i64,
    pub user_agent: Option<String>,
    pub referrer: Option<String>,
}

impl SessionRecord {
    /// New open session starting now
    pub fn new(session_id: impl Into<String>, total_entries: i64) -> Self {
        Self {
            session_id: session_id.into(),
            start_time: Utc::now(),
            end_time: None,
            total_entries,
            user_agent: None,
            referrer: None,
        }
    }

    /// Length in minutes, if the session has ended
    pub fn duration_minutes(&self) -> Option<f64> {
        self.end_time
            .map(|end| (end - self.start_time).num_milliseconds() as f64 / 60_000.0)
    }
}

/// User feedback on a response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackRecord {
    pub id: String,
    pub session_id: String,
    pub entry_id: Option<String>,
    /// 1 to 5 stars
    pub rating: u8,
    pub comments: Option<String>,
    pub helpful: bool,
    pub supportive: bool,
    pub accurate: bool,
    /// Free-form label chosen by the user, `neutral` when not given
    pub emotional_support: String,
    pub timestamp: DateTime<Utc>,
}

/// Longest trailing window accepted for a `days` parameter
pub const MAX_RANGE_DAYS: i64 = 3650;

/// Inclusive time window
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DateRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DateRange {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// The last `days` days up to `end`; `None` outside `1..=MAX_RANGE_DAYS`
    pub fn trailing_days(days: i64, end: DateTime<Utc>) -> Option<Self> {
        if !(1..=MAX_RANGE_DAYS).contains(&days) {
            return None;
        }
        let start = end.checked_sub_signed(Duration::try_days(days)?)?;
        Some(Self::new(start, end))
    }

    /// `YYYY-MM-DD to YYYY-MM-DD`
    pub fn label(&self) -> String {
        format!("{} to {}", day_of(&self.start), day_of(&self.end))
    }
}

/// Counts of entries per risk level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RiskLevelCounts {
    pub low: i64,
    pub medium: i64,
    pub high: i64,
}

impl RiskLevelCounts {
    pub fn total(&self) -> i64 {
        self.low + self.medium + self.high
    }

    pub fn get(&self, level: RiskLevel) -> i64 {
        match level {
            RiskLevel::Low => self.low,
            RiskLevel::Medium => self.medium,
            RiskLevel::High => self.high,
        }
    }
}

/// Average sentiment of one day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentPoint {
    pub date: String,
    pub sentiment: f64,
}

/// Aggregates shown on the admin dashboard
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsData {
    pub total_entries: i64,
    /// Occurrences of each emotion across all entries
    pub emotion_distribution: BTreeMap<String, i64>,
    /// Daily average sentiment over the last 30 days, oldest first
    pub sentiment_trends: Vec<SentimentPoint>,
    pub risk_level_counts: RiskLevelCounts,
    /// Mean length of ended sessions, in minutes
    pub average_session_length: f64,
}

/// Emotions and average sentiment of one day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyTrend {
    pub date: String,
    /// Distinct emotions seen that day, in first-seen order
    pub emotions: Vec<String>,
    pub sentiment: f64,
}

/// Session counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemMetrics {
    pub total_sessions: i64,
    /// Sessions started in the last 24 hours
    pub active_users: i64,
}

/// Entry with its text removed, for research export
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnonymizedEntry {
    pub emotions: Vec<String>,
    pub sentiment: f64,
    pub risk_level: RiskLevel,
    pub timestamp: DateTime<Utc>,
    pub word_count: usize,
}

/// Rows removed by a retention cleanup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CleanupReport {
    pub entries_deleted: usize,
    pub sessions_deleted: usize,
    pub feedback_deleted: usize,
    pub analytics_deleted: usize,
}

impl CleanupReport {
    pub fn total(&self) -> usize {
        self.entries_deleted + self.sessions_deleted + self.feedback_deleted + self.analytics_deleted
    }
}
