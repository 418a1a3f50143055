/*!
 * Repository layer for database operations.
 *
 * This module provides a high-level API for all database operations,
 * abstracting away the SQL details and providing type-safe access.
 */

use anyhow::{anyhow, Result};
use chrono::{Duration, Utc};
use log::debug;
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde_json::json;
use std::collections::BTreeMap;

use super::connection::DatabaseConnection;
use super::models::{
    day_of, format_timestamp, parse_timestamp, AnalyticsData, AnonymizedEntry, CleanupReport,
    DailyTrend, DateRange, FeedbackRecord, JournalEntryRecord, NewJournalEntry, RiskLevelCounts,
    SentimentPoint, SessionRecord, SystemMetrics,
};
use crate::analysis::emotion::RiskLevel;

/// Days covered by the dashboard sentiment trend
const SENTIMENT_TREND_DAYS: i64 = 30;

/// Upper bound used when a query has no end date
const FAR_FUTURE: &str = "9999-12-31T23:59:59.999Z";

const ENTRY_COLUMNS: &str = "id, content, timestamp, emotions, sentiment, sentiment_score, risk_level, session_id, anonymous_user_id";

const SESSION_COLUMNS: &str = "session_id, start_time, end_time, total_entries, user_agent, referrer";

const FEEDBACK_COLUMNS: &str = "id, session_id, entry_id, rating, comments, helpful, supportive, accurate, emotional_support, timestamp";

/// Repository for database operations
#[derive(Clone, Debug)]
pub struct Repository {
    /// Database connection
    db: DatabaseConnection,
}

fn parse_entry_row(row: &Row) -> rusqlite::Result<JournalEntryRecord> {
    let emotions: String = row.get(3)?;
    Ok(JournalEntryRecord {
        id: row.get(0)?,
        content: row.get(1)?,
        timestamp: parse_timestamp(&row.get::<_, String>(2)?),
        emotions: serde_json::from_str(&emotions).unwrap_or_default(),
        sentiment: row.get::<_, String>(4)?.parse().unwrap_or_default(),
        sentiment_score: row.get(5)?,
        risk_level: row.get::<_, String>(6)?.parse().unwrap_or_default(),
        session_id: row.get(7)?,
        anonymous_user_id: row.get(8)?,
    })
}

fn parse_session_row(row: &Row) -> rusqlite::Result<SessionRecord> {
    Ok(SessionRecord {
        session_id: row.get(0)?,
        start_time: parse_timestamp(&row.get::<_, String>(1)?),
        end_time: row.get::<_, Option<String>>(2)?.map(|t| parse_timestamp(&t)),
        total_entries: row.get(3)?,
        user_agent: row.get(4)?,
        referrer: row.get(5)?,
    })
}

fn parse_feedback_row(row: &Row) -> rusqlite::Result<FeedbackRecord> {
    Ok(FeedbackRecord {
        id: row.get(0)?,
        session_id: row.get(1)?,
        entry_id: row.get(2)?,
        rating: row.get(3)?,
        comments: row.get(4)?,
        helpful: row.get(5)?,
        supportive: row.get(6)?,
        accurate: row.get(7)?,
        emotional_support: row.get(8)?,
        timestamp: parse_timestamp(&row.get::<_, String>(9)?),
    })
}

/// Stored bounds of an optional range; no range spans everything
fn range_bounds(range: Option<DateRange>) -> (String, String) {
    match range {
        Some(range) => (format_timestamp(&range.start), format_timestamp(&range.end)),
        None => (String::new(), FAR_FUTURE.to_string()),
    }
}

impl Repository {
    /// Create a new repository with the given database connection
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Create a repository with the default database location
    pub fn new_default() -> Result<Self> {
        let db = DatabaseConnection::new_default()?;
        Ok(Self::new(db))
    }

    /// Create a repository with an in-memory database (for testing)
    pub fn new_in_memory() -> Result<Self> {
        let db = DatabaseConnection::new_in_memory()?;
        Ok(Self::new(db))
    }

    /// Underlying connection
    pub fn connection(&self) -> &DatabaseConnection {
        &self.db
    }

    // =========================================================================
    // Journal Entry Operations
    // =========================================================================

    /// Store an entry, bump its session's entry count and the daily metrics
    ///
    /// All three writes happen in one transaction. Returns the new entry id.
    pub async fn log_journal_entry(&self, entry: &NewJournalEntry) -> Result<String> {
        let entry = entry.clone();
        let id = uuid::Uuid::new_v4().to_string();
        let entry_id = id.clone();

        self.db
            .transaction_async(move |tx| {
                let now = format_timestamp(&Utc::now());
                let timestamp = format_timestamp(&entry.timestamp);

                tx.execute(
                    r#"
                    INSERT INTO journal_entries (
                        id, content, timestamp, emotions, sentiment, sentiment_score,
                        risk_level, session_id, anonymous_user_id, created_at
                    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
                    "#,
                    params![
                        entry_id,
                        entry.content,
                        timestamp,
                        serde_json::to_string(&entry.emotions)?,
                        entry.sentiment.to_string(),
                        entry.sentiment_score,
                        entry.risk_level.to_string(),
                        entry.session_id,
                        entry.anonymous_user_id,
                        now,
                    ],
                )?;

                tx.execute(
                    r#"
                    INSERT INTO sessions (session_id, start_time, total_entries, created_at)
                    VALUES (?1, ?2, 1, ?3)
                    ON CONFLICT(session_id) DO UPDATE SET total_entries = total_entries + 1
                    "#,
                    params![entry.session_id, timestamp, now],
                )?;

                let day = day_of(&entry.timestamp);
                let metadata = json!({
                    "sentiment": entry.sentiment,
                    "risk_level": entry.risk_level,
                })
                .to_string();

                tx.execute(
                    r#"
                    INSERT INTO analytics (metric_name, metric_value, date, metadata, sample_count, created_at)
                    VALUES ('daily_entries', 1, ?1, ?2, 1, ?3)
                    ON CONFLICT(metric_name, date) DO UPDATE SET
                        metric_value = metric_value + 1,
                        sample_count = sample_count + 1,
                        metadata = excluded.metadata
                    "#,
                    params![day, metadata, now],
                )?;

                tx.execute(
                    r#"
                    INSERT INTO analytics (metric_name, metric_value, date, sample_count, created_at)
                    VALUES ('daily_sentiment_avg', ?2, ?1, 1, ?3)
                    ON CONFLICT(metric_name, date) DO UPDATE SET
                        metric_value = (metric_value * sample_count + excluded.metric_value) / (sample_count + 1),
                        sample_count = sample_count + 1
                    "#,
                    params![day, entry.sentiment_score, now],
                )?;

                Ok(())
            })
            .await?;

        debug!("Journal entry logged with ID: {}", id);
        Ok(id)
    }

    /// Entries of a session, oldest first
    pub async fn get_session_entries(&self, session_id: &str) -> Result<Vec<JournalEntryRecord>> {
        let session_id = session_id.to_string();

        self.db
            .execute_async(move |conn| {
                let mut stmt = conn.prepare(&format!(
                    "SELECT {} FROM journal_entries WHERE session_id = ?1 ORDER BY timestamp ASC",
                    ENTRY_COLUMNS
                ))?;
                let entries = stmt
                    .query_map([&session_id], parse_entry_row)?
                    .collect::<rusqlite::Result<Vec<_>>>()?;
                Ok(entries)
            })
            .await
    }

    /// Every entry, newest first
    pub async fn get_all_entries(&self) -> Result<Vec<JournalEntryRecord>> {
        self.db
            .execute_async(|conn| {
                let mut stmt = conn.prepare(&format!(
                    "SELECT {} FROM journal_entries ORDER BY timestamp DESC",
                    ENTRY_COLUMNS
                ))?;
                let entries = stmt
                    .query_map([], parse_entry_row)?
                    .collect::<rusqlite::Result<Vec<_>>>()?;
                Ok(entries)
            })
            .await
    }

    // =========================================================================
    // Session Operations
    // =========================================================================

    /// Record a session; an already recorded session is left untouched
    pub async fn create_session(&self, session: &SessionRecord) -> Result<()> {
        let session = session.clone();

        self.db
            .execute_async(move |conn| {
                conn.execute(
                    r#"
                    INSERT INTO sessions (
                        session_id, start_time, end_time, total_entries, user_agent, referrer, created_at
                    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                    ON CONFLICT(session_id) DO NOTHING
                    "#,
                    params![
                        session.session_id,
                        format_timestamp(&session.start_time),
                        session.end_time.as_ref().map(format_timestamp),
                        session.total_entries,
                        session.user_agent,
                        session.referrer,
                        format_timestamp(&Utc::now()),
                    ],
                )?;
                Ok(())
            })
            .await
    }

    /// Mark a session as ended now; returns false for unknown sessions
    pub async fn end_session(&self, session_id: &str) -> Result<bool> {
        let session_id = session_id.to_string();
        let now = format_timestamp(&Utc::now());

        self.db
            .execute_async(move |conn| {
                let updated = conn.execute(
                    "UPDATE sessions SET end_time = ?1 WHERE session_id = ?2 AND end_time IS NULL",
                    params![now, session_id],
                )?;
                Ok(updated > 0)
            })
            .await
    }

    /// Get a session by ID
    pub async fn get_session(&self, session_id: &str) -> Result<Option<SessionRecord>> {
        let session_id = session_id.to_string();

        self.db
            .execute_async(move |conn| Self::get_session_sync(conn, &session_id))
            .await
    }

    fn get_session_sync(conn: &Connection, session_id: &str) -> Result<Option<SessionRecord>> {
        let result = conn
            .query_row(
                &format!("SELECT {} FROM sessions WHERE session_id = ?1", SESSION_COLUMNS),
                [session_id],
                parse_session_row,
            )
            .optional()?;

        Ok(result)
    }

    /// Session counters for the dashboard
    pub async fn get_system_metrics(&self) -> Result<SystemMetrics> {
        let since = format_timestamp(&(Utc::now() - Duration::hours(24)));

        self.db
            .execute_async(move |conn| {
                let total_sessions: i64 =
                    conn.query_row("SELECT COUNT(*) FROM sessions", [], |row| row.get(0))?;
                let active_users: i64 = conn.query_row(
                    "SELECT COUNT(*) FROM sessions WHERE start_time >= ?1",
                    [&since],
                    |row| row.get(0),
                )?;

                Ok(SystemMetrics {
                    total_sessions,
                    active_users,
                })
            })
            .await
    }

    // =========================================================================
    // Analytics Operations
    // =========================================================================

    /// Dashboard aggregates, optionally limited to a time window
    pub async fn get_analytics_data(&self, range: Option<DateRange>) -> Result<AnalyticsData> {
        let (start, end) = range_bounds(range);
        let trend_start = format_timestamp(&(Utc::now() - Duration::days(SENTIMENT_TREND_DAYS)));

        self.db
            .execute_async(move |conn| {
                let total_entries: i64 = conn.query_row(
                    "SELECT COUNT(*) FROM journal_entries WHERE timestamp >= ?1 AND timestamp <= ?2",
                    params![start, end],
                    |row| row.get(0),
                )?;

                let mut stmt = conn.prepare(
                    r#"
                    SELECT e.value, COUNT(*)
                    FROM journal_entries j, json_each(j.emotions) e
                    WHERE j.timestamp >= ?1 AND j.timestamp <= ?2
                    GROUP BY e.value
                    "#,
                )?;
                let emotion_distribution: BTreeMap<String, i64> = stmt
                    .query_map(params![start, end], |row| Ok((row.get(0)?, row.get(1)?)))?
                    .collect::<rusqlite::Result<_>>()?;

                let trend_from = if trend_start > start { &trend_start } else { &start };
                let mut stmt = conn.prepare(
                    r#"
                    SELECT substr(timestamp, 1, 10) AS day, AVG(sentiment_score)
                    FROM journal_entries
                    WHERE timestamp >= ?1 AND timestamp <= ?2
                    GROUP BY day
                    ORDER BY day ASC
                    "#,
                )?;
                let sentiment_trends = stmt
                    .query_map(params![trend_from, end], |row| {
                        Ok(SentimentPoint {
                            date: row.get(0)?,
                            sentiment: row.get(1)?,
                        })
                    })?
                    .collect::<rusqlite::Result<Vec<_>>>()?;

                let mut risk_level_counts = RiskLevelCounts::default();
                let mut stmt = conn.prepare(
                    r#"
                    SELECT risk_level, COUNT(*)
                    FROM journal_entries
                    WHERE timestamp >= ?1 AND timestamp <= ?2
                    GROUP BY risk_level
                    "#,
                )?;
                let rows = stmt.query_map(params![start, end], |row| {
                    Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
                })?;
                for row in rows {
                    let (level, count) = row?;
                    match level.parse::<RiskLevel>() {
                        Ok(RiskLevel::Low) => risk_level_counts.low = count,
                        Ok(RiskLevel::Medium) => risk_level_counts.medium = count,
                        Ok(RiskLevel::High) => risk_level_counts.high = count,
                        Err(_) => debug!("Ignoring unknown risk level '{}'", level),
                    }
                }

                let mut stmt = conn.prepare(&format!(
                    "SELECT {} FROM sessions WHERE end_time IS NOT NULL AND start_time >= ?1 AND start_time <= ?2",
                    SESSION_COLUMNS
                ))?;
                let durations: Vec<f64> = stmt
                    .query_map(params![start, end], parse_session_row)?
                    .collect::<rusqlite::Result<Vec<_>>>()?
                    .iter()
                    .filter_map(SessionRecord::duration_minutes)
                    .collect();
                let average_session_length = if durations.is_empty() {
                    0.0
                } else {
                    durations.iter().sum::<f64>() / durations.len() as f64
                };

                Ok(AnalyticsData {
                    total_entries,
                    emotion_distribution,
                    sentiment_trends,
                    risk_level_counts,
                    average_session_length,
                })
            })
            .await
    }

    /// Per-day emotions and average sentiment over the last `days` days
    pub async fn get_emotion_trends(&self, session_id: Option<&str>, days: i64) -> Result<Vec<DailyTrend>> {
        let session_id = session_id.map(str::to_string);
        let window = DateRange::trailing_days(days, Utc::now())
            .ok_or_else(|| anyhow!("Trend window of {} days is out of range", days))?;
        let since = format_timestamp(&window.start);

        self.db
            .execute_async(move |conn| {
                let mut stmt = conn.prepare(&format!(
                    r#"
                    SELECT {} FROM journal_entries
                    WHERE timestamp >= ?1 AND (?2 IS NULL OR session_id = ?2)
                    ORDER BY timestamp ASC
                    "#,
                    ENTRY_COLUMNS
                ))?;
                let entries: Vec<JournalEntryRecord> = stmt
                    .query_map(params![since, session_id], parse_entry_row)?
                    .collect::<rusqlite::Result<Vec<_>>>()?;

                let mut by_day: BTreeMap<String, (Vec<String>, Vec<f64>)> = BTreeMap::new();
                for entry in entries {
                    let (emotions, sentiments) = by_day.entry(day_of(&entry.timestamp)).or_default();
                    for emotion in entry.emotions {
                        if !emotions.contains(&emotion) {
                            emotions.push(emotion);
                        }
                    }
                    sentiments.push(entry.sentiment_score);
                }

                Ok(by_day
                    .into_iter()
                    .map(|(date, (emotions, sentiments))| DailyTrend {
                        date,
                        emotions,
                        sentiment: sentiments.iter().sum::<f64>() / sentiments.len() as f64,
                    })
                    .collect())
            })
            .await
    }

    /// Entries in `range` with their text removed
    pub async fn export_anonymized_data(&self, range: DateRange) -> Result<Vec<AnonymizedEntry>> {
        let (start, end) = range_bounds(Some(range));

        self.db
            .execute_async(move |conn| {
                let mut stmt = conn.prepare(&format!(
                    "SELECT {} FROM journal_entries WHERE timestamp >= ?1 AND timestamp <= ?2 ORDER BY timestamp ASC",
                    ENTRY_COLUMNS
                ))?;
                let entries = stmt
                    .query_map(params![start, end], parse_entry_row)?
                    .map(|row| {
                        row.map(|entry| AnonymizedEntry {
                            word_count: entry.word_count(),
                            emotions: entry.emotions,
                            sentiment: entry.sentiment_score,
                            risk_level: entry.risk_level,
                            timestamp: entry.timestamp,
                        })
                    })
                    .collect::<rusqlite::Result<Vec<_>>>()?;
                Ok(entries)
            })
            .await
    }

    // =========================================================================
    // Feedback Operations
    // =========================================================================

    /// Store a feedback submission
    pub async fn log_feedback(&self, feedback: &FeedbackRecord) -> Result<()> {
        let feedback = feedback.clone();
        let id = feedback.id.clone();

        self.db
            .execute_async(move |conn| {
                conn.execute(
                    &format!(
                        "INSERT INTO user_feedback ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                        FEEDBACK_COLUMNS
                    ),
                    params![
                        feedback.id,
                        feedback.session_id,
                        feedback.entry_id,
                        feedback.rating,
                        feedback.comments,
                        feedback.helpful,
                        feedback.supportive,
                        feedback.accurate,
                        feedback.emotional_support,
                        format_timestamp(&feedback.timestamp),
                    ],
                )?;
                Ok(())
            })
            .await?;

        debug!("User feedback logged with ID: {}", id);
        Ok(())
    }

    /// Every feedback submission, newest first
    pub async fn list_feedback(&self) -> Result<Vec<FeedbackRecord>> {
        self.db
            .execute_async(|conn| {
                let mut stmt = conn.prepare(&format!(
                    "SELECT {} FROM user_feedback ORDER BY timestamp DESC",
                    FEEDBACK_COLUMNS
                ))?;
                let feedback = stmt
                    .query_map([], parse_feedback_row)?
                    .collect::<rusqlite::Result<Vec<_>>>()?;
                Ok(feedback)
            })
            .await
    }

    // =========================================================================
    // Maintenance
    // =========================================================================

    /// Delete everything older than `retention_days`
    pub async fn cleanup_old_data(&self, retention_days: u32) -> Result<CleanupReport> {
        let cutoff_time = Utc::now() - Duration::days(i64::from(retention_days));
        let cutoff = format_timestamp(&cutoff_time);
        let cutoff_day = day_of(&cutoff_time);

        self.db
            .transaction_async(move |tx| {
                Ok(CleanupReport {
                    entries_deleted: tx.execute("DELETE FROM journal_entries WHERE timestamp < ?1", [&cutoff])?,
                    sessions_deleted: tx.execute("DELETE FROM sessions WHERE start_time < ?1", [&cutoff])?,
                    feedback_deleted: tx.execute("DELETE FROM user_feedback WHERE timestamp < ?1", [&cutoff])?,
                    analytics_deleted: tx.execute("DELETE FROM analytics WHERE date < ?1", [&cutoff_day])?,
                })
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::emotion::Sentiment;
    use chrono::{DateTime, TimeZone};

    async fn create_test_repo() -> Repository {
        Repository::new_in_memory().expect("Failed to create test repository")
    }

    fn entry_at(session_id: &str, timestamp: DateTime<Utc>, emotions: &[&str], score: f64, risk: RiskLevel) -> NewJournalEntry {
        NewJournalEntry {
            content: "Midterms are coming and I feel stretched thin".to_string(),
            timestamp,
            emotions: emotions.iter().map(|s| s.to_string()).collect(),
            sentiment: if score < 0.0 { Sentiment::Negative } else { Sentiment::Positive },
            sentiment_score: score,
            risk_level: risk,
            session_id: session_id.to_string(),
            anonymous_user_id: None,
        }
    }

    fn metric(repo: &Repository, name: &str, day: &str) -> (f64, i64) {
        let name = name.to_string();
        let day = day.to_string();
        repo.db
            .execute(move |conn| {
                Ok(conn.query_row(
                    "SELECT metric_value, sample_count FROM analytics WHERE metric_name = ?1 AND date = ?2",
                    params![name, day],
                    |row| Ok((row.get(0)?, row.get(1)?)),
                )?)
            })
            .unwrap()
    }

    #[tokio::test]
    async fn test_logJournalEntry_shouldStoreEntryAndCountSession() {
        let repo = create_test_repo().await;
        let now = Utc::now();

        let first = repo
            .log_journal_entry(&entry_at("session_a", now, &["anxiety"], -0.4, RiskLevel::Low))
            .await
            .unwrap();
        repo.log_journal_entry(&entry_at("session_a", now + Duration::seconds(1), &["joy"], 0.6, RiskLevel::Low))
            .await
            .unwrap();

        let entries = repo.get_session_entries("session_a").await.unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].id, first);
        assert_eq!(entries[0].emotions, vec!["anxiety"]);
        assert_eq!(entries[1].sentiment, Sentiment::Positive);

        let session = repo.get_session("session_a").await.unwrap().unwrap();
        assert_eq!(session.total_entries, 2);
    }

    #[tokio::test]
    async fn test_logJournalEntry_shouldMaintainDailyMetrics() {
        let repo = create_test_repo().await;
        let day = Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap();

        repo.log_journal_entry(&entry_at("s", day, &[], -0.5, RiskLevel::Low)).await.unwrap();
        repo.log_journal_entry(&entry_at("s", day, &[], 0.3, RiskLevel::Low)).await.unwrap();
        repo.log_journal_entry(&entry_at("s", day, &[], 0.5, RiskLevel::Low)).await.unwrap();

        assert_eq!(metric(&repo, "daily_entries", "2024-03-01"), (3.0, 3));
        let (average, samples) = metric(&repo, "daily_sentiment_avg", "2024-03-01");
        assert!((average - 0.1).abs() < 1e-9);
        assert_eq!(samples, 3);
    }

    #[tokio::test]
    async fn test_createSession_afterEntry_shouldKeepCount() {
        let repo = create_test_repo().await;
        repo.log_journal_entry(&entry_at("s", Utc::now(), &[], 0.0, RiskLevel::Low)).await.unwrap();

        repo.create_session(&SessionRecord::new("s", 1)).await.unwrap();

        assert_eq!(repo.get_session("s").await.unwrap().unwrap().total_entries, 1);
    }

    #[tokio::test]
    async fn test_endSession_shouldSetEndTimeOnce() {
        let repo = create_test_repo().await;
        repo.create_session(&SessionRecord::new("s", 0)).await.unwrap();

        assert!(repo.end_session("s").await.unwrap());
        assert!(!repo.end_session("s").await.unwrap());
        assert!(!repo.end_session("unknown").await.unwrap());
        assert!(repo.get_session("s").await.unwrap().unwrap().end_time.is_some());
    }

    #[tokio::test]
    async fn test_getAnalyticsData_shouldAggregateEntriesAndSessions() {
        let repo = create_test_repo().await;
        let now = Utc::now();

        repo.log_journal_entry(&entry_at("a", now, &["anxiety", "fear"], -0.6, RiskLevel::Medium)).await.unwrap();
        repo.log_journal_entry(&entry_at("a", now, &["anxiety"], -0.2, RiskLevel::Low)).await.unwrap();
        repo.log_journal_entry(&entry_at("b", now, &["joy"], 0.8, RiskLevel::Low)).await.unwrap();

        let mut ended = SessionRecord::new("ended", 0);
        ended.start_time = now - Duration::minutes(30);
        ended.end_time = Some(now - Duration::minutes(10));
        repo.create_session(&ended).await.unwrap();

        let analytics = repo.get_analytics_data(None).await.unwrap();

        assert_eq!(analytics.total_entries, 3);
        assert_eq!(analytics.emotion_distribution["anxiety"], 2);
        assert_eq!(analytics.emotion_distribution["fear"], 1);
        assert_eq!(analytics.risk_level_counts, RiskLevelCounts { low: 2, medium: 1, high: 0 });
        assert_eq!(analytics.sentiment_trends.len(), 1);
        assert!((analytics.average_session_length - 20.0).abs() < 1e-6);
    }

    #[tokio::test]
    async fn test_getAnalyticsData_withRange_shouldExcludeOutsideEntries() {
        let repo = create_test_repo().await;
        let now = Utc::now();
        repo.log_journal_entry(&entry_at("a", now - Duration::days(10), &["sadness"], -0.3, RiskLevel::Low)).await.unwrap();
        repo.log_journal_entry(&entry_at("a", now, &["joy"], 0.3, RiskLevel::Low)).await.unwrap();

        let range = DateRange::new(now - Duration::days(1), now + Duration::days(1));
        let analytics = repo.get_analytics_data(Some(range)).await.unwrap();

        assert_eq!(analytics.total_entries, 1);
        assert!(!analytics.emotion_distribution.contains_key("sadness"));
    }

    #[tokio::test]
    async fn test_getEmotionTrends_shouldGroupByDay() {
        let repo = create_test_repo().await;
        let today = Utc::now();
        let yesterday = today - Duration::days(1);

        repo.log_journal_entry(&entry_at("a", yesterday, &["fear"], -0.4, RiskLevel::Low)).await.unwrap();
        repo.log_journal_entry(&entry_at("a", today, &["joy", "fear"], 0.2, RiskLevel::Low)).await.unwrap();
        repo.log_journal_entry(&entry_at("a", today, &["joy"], 0.6, RiskLevel::Low)).await.unwrap();
        repo.log_journal_entry(&entry_at("b", today, &["anger"], -0.9, RiskLevel::Low)).await.unwrap();

        let trends = repo.get_emotion_trends(Some("a"), 30).await.unwrap();

        assert_eq!(trends.len(), 2);
        assert_eq!(trends[0].emotions, vec!["fear"]);
        assert_eq!(trends[1].emotions, vec!["joy", "fear"]);
        assert!((trends[1].sentiment - 0.4).abs() < 1e-9);

        let all = repo.get_emotion_trends(None, 30).await.unwrap();
        assert!(all[1].emotions.contains(&"anger".to_string()));
    }

    #[tokio::test]
    async fn test_getEmotionTrends_withOutOfRangeDays_shouldError() {
        let repo = create_test_repo().await;

        assert!(repo.get_emotion_trends(None, i64::MAX).await.is_err());
        assert!(repo.get_emotion_trends(None, 0).await.is_err());
    }

    #[tokio::test]
    async fn test_exportAnonymizedData_shouldOmitContent() {
        let repo = create_test_repo().await;
        let now = Utc::now();
        repo.log_journal_entry(&entry_at("a", now, &["anxiety"], -0.4, RiskLevel::High)).await.unwrap();

        let exported = repo
            .export_anonymized_data(DateRange::new(now - Duration::hours(1), now + Duration::hours(1)))
            .await
            .unwrap();

        assert_eq!(exported.len(), 1);
        assert_eq!(exported[0].word_count, 8);
        assert_eq!(exported[0].risk_level, RiskLevel::High);
        let json = serde_json::to_string(&exported[0]).unwrap();
        assert!(!json.contains("Midterms"));
    }

    #[tokio::test]
    async fn test_logFeedback_shouldRoundTripThroughList() {
        let repo = create_test_repo().await;
        let feedback = FeedbackRecord {
            id: "f1".to_string(),
            session_id: "s".to_string(),
            entry_id: None,
            rating: 4,
            comments: Some("Very supportive".to_string()),
            helpful: true,
            supportive: true,
            accurate: false,
            emotional_support: "much_better".to_string(),
            timestamp: Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap(),
        };

        repo.log_feedback(&feedback).await.unwrap();

        assert_eq!(repo.list_feedback().await.unwrap(), vec![feedback]);
    }

    #[tokio::test]
    async fn test_getSystemMetrics_shouldCountRecentSessions() {
        let repo = create_test_repo().await;
        let mut old = SessionRecord::new("old", 0);
        old.start_time = Utc::now() - Duration::days(3);
        repo.create_session(&old).await.unwrap();
        repo.create_session(&SessionRecord::new("new", 0)).await.unwrap();

        let metrics = repo.get_system_metrics().await.unwrap();

        assert_eq!(metrics, SystemMetrics { total_sessions: 2, active_users: 1 });
    }

    #[tokio::test]
    async fn test_cleanupOldData_shouldRemoveOnlyExpiredRows() {
        let repo = create_test_repo().await;
        let now = Utc::now();
        repo.log_journal_entry(&entry_at("old", now - Duration::days(100), &[], 0.0, RiskLevel::Low)).await.unwrap();
        repo.log_journal_entry(&entry_at("new", now, &[], 0.0, RiskLevel::Low)).await.unwrap();

        let report = repo.cleanup_old_data(90).await.unwrap();

        assert_eq!(report.entries_deleted, 1);
        assert_eq!(report.sessions_deleted, 1);
        assert_eq!(report.analytics_deleted, 2);
        assert_eq!(repo.get_all_entries().await.unwrap().len(), 1);
        assert!(repo.get_session("new").await.unwrap().is_some());
    }
}
