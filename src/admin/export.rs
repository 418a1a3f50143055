/*!
 * CSV and plain-text exports for administrators.
 *
 * Every export returns the file body together with a suggested filename
 * and MIME type. Timestamps are written in the stored RFC 3339 form.
 */

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::str::FromStr;

use crate::analysis::emotion::RiskLevel;
use crate::database::models::{format_timestamp, AnalyticsData, DateRange, JournalEntryRecord};

use super::feedback::FeedbackAnalysis;

const CSV_MIME: &str = "text/csv";
const TEXT_MIME: &str = "text/plain";

/// Entries listed under TOP EMOTIONS in the report
const REPORT_TOP_EMOTIONS: usize = 10;

/// Days listed under RECENT SENTIMENT TRENDS in the report
const REPORT_RECENT_DAYS: usize = 7;

/// A generated export file
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportFile {
    pub filename: String,
    pub data: String,
    pub mime_type: String,
}

/// Column layout of the entry export
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportType {
    /// Ids, timestamps, labels and sessions
    #[default]
    Analytics,
    /// Content-free rows for model training
    Dataset,
}

impl ExportType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExportType::Analytics => "analytics",
            ExportType::Dataset => "dataset",
        }
    }
}

impl FromStr for ExportType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "analytics" => Ok(ExportType::Analytics),
            "dataset" => Ok(ExportType::Dataset),
            _ => Err(anyhow::anyhow!("Invalid export type: {}", s)),
        }
    }
}

/// Quote a field if it contains a delimiter, quote or line break
pub fn escape_csv_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Emotions joined with `;`, always quoted
fn emotions_field(emotions: &[String]) -> String {
    format!("\"{}\"", emotions.join(";").replace('"', "\"\""))
}

/// Percentage with one decimal, zero when the total is zero
fn percent(part: f64, total: f64) -> String {
    if total > 0.0 {
        format!("{:.1}", part / total * 100.0)
    } else {
        "0.0".to_string()
    }
}

/// Entries as CSV; no entries gives an empty body
pub fn entries_csv(entries: &[JournalEntryRecord], export_type: ExportType) -> String {
    if entries.is_empty() {
        return String::new();
    }

    let mut lines = Vec::with_capacity(entries.len() + 1);
    match export_type {
        ExportType::Dataset => {
            lines.push("emotions,sentiment,sentiment_score,risk_level,word_count,timestamp".to_string());
            lines.extend(entries.iter().map(|e| {
                format!(
                    "{},{},{},{},{},{}",
                    emotions_field(&e.emotions),
                    e.sentiment,
                    e.sentiment_score,
                    e.risk_level,
                    e.word_count(),
                    format_timestamp(&e.timestamp)
                )
            }));
        }
        ExportType::Analytics => {
            lines.push("id,timestamp,emotions,sentiment,risk_level,session_id".to_string());
            lines.extend(entries.iter().map(|e| {
                format!(
                    "{},{},{},{},{},{}",
                    escape_csv_field(&e.id),
                    format_timestamp(&e.timestamp),
                    emotions_field(&e.emotions),
                    e.sentiment,
                    e.risk_level,
                    escape_csv_field(&e.session_id)
                )
            }));
        }
    }

    lines.join("\n")
}

/// Entry export file named after its type
pub fn export_entries(entries: &[JournalEntryRecord], export_type: ExportType) -> ExportFile {
    ExportFile {
        filename: format!("mindmosaic-{}.csv", export_type.as_str()),
        data: entries_csv(entries, export_type),
        mime_type: CSV_MIME.to_string(),
    }
}

/// Dashboard metrics, emotion distribution and sentiment trend as CSV
pub fn export_analytics_csv(analytics: &AnalyticsData, range: Option<DateRange>, now: DateTime<Utc>) -> ExportFile {
    let date_range = range.map(|r| r.label()).unwrap_or_else(|| "All Time".to_string());
    let export_date = format_timestamp(&now);
    let counts = &analytics.risk_level_counts;
    let total = analytics.total_entries as f64;

    let metrics = [
        ("Total Entries", analytics.total_entries.to_string()),
        ("Average Session Length", analytics.average_session_length.to_string()),
        ("Low Risk Count", counts.get(RiskLevel::Low).to_string()),
        ("Medium Risk Count", counts.get(RiskLevel::Medium).to_string()),
        ("High Risk Count", counts.get(RiskLevel::High).to_string()),
    ];

    let mut rows = vec!["Metric,Value,Date Range,Export Date".to_string()];
    rows.extend(
        metrics
            .iter()
            .map(|(name, value)| format!("{},{},{},{}", name, value, date_range, export_date)),
    );

    rows.push(String::new());
    rows.push("Emotion,Count,Percentage".to_string());
    rows.extend(analytics.emotion_distribution.iter().map(|(emotion, count)| {
        format!("{},{},{}%", escape_csv_field(emotion), count, percent(*count as f64, total))
    }));

    rows.push(String::new());
    rows.push("Date,Sentiment Score".to_string());
    rows.extend(
        analytics
            .sentiment_trends
            .iter()
            .map(|point| format!("{},{}", point.date, point.sentiment)),
    );

    let slug = date_range.to_lowercase().replace(char::is_whitespace, "-");

    ExportFile {
        filename: format!("mindmosaic-analytics-{}-{}.csv", slug, now.timestamp_millis()),
        data: rows.join("\n"),
        mime_type: CSV_MIME.to_string(),
    }
}

/// Feedback aggregates as CSV
pub fn export_feedback_csv(analysis: &FeedbackAnalysis, now: DateTime<Utc>) -> ExportFile {
    let export_date = format_timestamp(&now);

    let mut rows = vec![
        "Metric,Value,Export Date".to_string(),
        format!("Total Feedback Entries,{},{}", analysis.total_feedback, export_date),
        format!("Average Rating,{:.2},{}", analysis.average_rating, export_date),
        format!("Helpful Percentage,{:.1}%,{}", analysis.helpful_percentage, export_date),
        String::new(),
        "Rating,Count".to_string(),
    ];
    rows.extend(
        analysis
            .rating_distribution
            .iter()
            .map(|(rating, count)| format!("{} stars,{}", rating, count)),
    );

    rows.push(String::new());
    rows.push("Theme,Mentions".to_string());
    rows.extend(
        analysis
            .common_themes
            .iter()
            .map(|t| format!("{},{}", t.theme, t.count)),
    );

    ExportFile {
        filename: format!("mindmosaic-feedback-{}.csv", now.timestamp_millis()),
        data: rows.join("\n"),
        mime_type: CSV_MIME.to_string(),
    }
}

fn section(rows: &mut Vec<String>, title: &str) {
    rows.push(String::new());
    rows.push(title.to_string());
    rows.push("=".repeat(title.len()));
}

/// Plain-text summary of analytics and feedback
pub fn generate_admin_report(analytics: &AnalyticsData, feedback: &FeedbackAnalysis, now: DateTime<Utc>) -> ExportFile {
    let total = analytics.total_entries as f64;
    let counts = &analytics.risk_level_counts;

    let mut rows = vec![
        "MindMosaic Admin Report".to_string(),
        format!("Generated: {}", format_timestamp(&now)),
    ];

    section(&mut rows, "SYSTEM OVERVIEW");
    rows.push(format!("Total Journal Entries: {}", analytics.total_entries));
    rows.push(format!(
        "Average Session Length: {} minutes",
        analytics.average_session_length
    ));

    section(&mut rows, "RISK ASSESSMENT");
    for (label, level) in [("Low", RiskLevel::Low), ("Medium", RiskLevel::Medium), ("High", RiskLevel::High)] {
        let count = counts.get(level);
        rows.push(format!(
            "{} Risk Entries: {} ({}%)",
            label,
            count,
            percent(count as f64, total)
        ));
    }

    section(&mut rows, "TOP EMOTIONS");
    let mut emotions: Vec<(&String, &i64)> = analytics.emotion_distribution.iter().collect();
    emotions.sort_by(|a, b| b.1.cmp(a.1));
    rows.extend(
        emotions
            .iter()
            .take(REPORT_TOP_EMOTIONS)
            .enumerate()
            .map(|(i, (emotion, count))| format!("{}. {}: {} occurrences", i + 1, emotion, count)),
    );

    section(&mut rows, "USER FEEDBACK");
    rows.push(format!("Total Feedback: {}", feedback.total_feedback));
    rows.push(format!("Average Rating: {:.2}/5", feedback.average_rating));
    rows.push(format!("Helpful Percentage: {:.1}%", feedback.helpful_percentage));

    section(&mut rows, "RECENT SENTIMENT TRENDS");
    let trends = &analytics.sentiment_trends;
    rows.extend(
        trends[trends.len().saturating_sub(REPORT_RECENT_DAYS)..]
            .iter()
            .map(|point| format!("{}: {:.2}", point.date, point.sentiment)),
    );

    ExportFile {
        filename: format!("mindmosaic-admin-report-{}.txt", now.timestamp_millis()),
        data: rows.join("\n"),
        mime_type: TEXT_MIME.to_string(),
    }
}
