/*!
 * Session-specific models.
 */

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::analysis::emotion::RiskLevel;
use crate::database::models::{JournalEntryRecord, SessionRecord};

/// Overview of one anonymous session
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    pub session_id: String,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub total_entries: i64,
    /// Minutes between start and end, once ended
    pub duration_minutes: Option<f64>,
    /// Distinct emotions across the entries, in first-seen order
    pub emotions: Vec<String>,
    pub average_sentiment: f64,
    /// Highest risk level of any entry
    pub highest_risk: RiskLevel,
}

impl SessionSummary {
    /// Build a summary from a session record and its entries
    pub fn from_parts(session: &SessionRecord, entries: &[JournalEntryRecord]) -> Self {
        let mut emotions: Vec<String> = Vec::new();
        for emotion in entries.iter().flat_map(|e| e.emotions.iter()) {
            if !emotions.contains(emotion) {
                emotions.push(emotion.clone());
            }
        }

        let average_sentiment = if entries.is_empty() {
            0.0
        } else {
            entries.iter().map(|e| e.sentiment_score).sum::<f64>() / entries.len() as f64
        };

        Self {
            session_id: session.session_id.clone(),
            start_time: session.start_time,
            end_time: session.end_time,
            total_entries: session.total_entries,
            duration_minutes: session.duration_minutes(),
            emotions,
            average_sentiment,
            highest_risk: entries.iter().map(|e| e.risk_level).max().unwrap_or_default(),
        }
    }
}
