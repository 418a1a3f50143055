/*!
 * Journal service: the two entry submission flows and session queries.
 *
 * The form flow answers first-time entries and never fails once input is
 * accepted. The API flow continues a session, frames follow-ups with the
 * previous entry and reports trends.
 */

use chrono::Utc;
use log::{debug, info, warn};
use serde::Serialize;

use crate::analysis::emotion::{recommendations_for, EmotionAnalysis, EmotionDetector, EmotionScore, RiskLevel, Sentiment};
use crate::analysis::responder::{PreviousExchange, ResponseGenerator, SupportResponse};
use crate::analysis::trends::{analyze_trends, EmotionTrend};
use crate::database::models::{JournalEntryRecord, NewJournalEntry};
use crate::database::repository::Repository;
use crate::errors::{AppError, ValidationError};
use crate::session::{generate_session_id, SessionManager};
use crate::validation::journal::{MAX_CHARS, MIN_CHARS};

/// Most suggestions returned by the API flow
const MAX_SUGGESTIONS: usize = 5;

/// Entries needed before a session has trends
const MIN_ENTRIES_FOR_TRENDS: usize = 2;

pub const CONTENT_REQUIRED: &str = "Journal content is required";
pub const CONTENT_TOO_LONG: &str = "Journal content too long. Please limit to 5000 characters.";
pub const FORM_CONTENT_TOO_SHORT: &str = "Please share more about what's on your mind (at least 10 characters).";
pub const FORM_GENERIC_ERROR: &str = "Something went wrong. Please try again, or contact support if the problem persists.";
pub const ANALYZE_FAILED: &str = "Unable to process your entry right now. Please try again.";
pub const TRENDS_NEED_MORE_ENTRIES: &str = "More entries needed for trend analysis";

const FALLBACK_REPLY: &str = "I'm experiencing some technical difficulties, but I want you to know that I'm here to listen. Your feelings are valid, and it's brave of you to reach out. If you're in crisis, please contact your campus counseling center or call 988 for immediate support.";

const FALLBACK_SUGGESTIONS: [&str; 3] = [
    "Take a few deep breaths",
    "Reach out to someone you trust",
    "Practice self-compassion",
];

const FALLBACK_RESOURCES: [&str; 3] = [
    "Campus Counseling Center",
    "Crisis Text Line: Text HOME to 741741",
    "National Suicide Prevention Lifeline: 988",
];

/// Result of the form submission flow
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormSubmissionResult {
    pub success: bool,
    /// Empty when the submission was rejected
    pub session_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ai_response: Option<SupportResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emotion_analysis: Option<EmotionAnalysis>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FormSubmissionResult {
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            session_id: String::new(),
            ai_response: None,
            emotion_analysis: None,
            error: Some(message.into()),
        }
    }
}

/// Analysis returned by the API flow
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JournalAnalysis {
    /// Stored entry id, `fallback` for the static answer
    pub id: String,
    pub ai_response: String,
    pub emotions: Vec<EmotionScore>,
    pub sentiment: Sentiment,
    pub sentiment_score: f64,
    pub risk_level: RiskLevel,
    pub suggestions: Vec<String>,
    pub resources: Vec<String>,
    pub confidence: f64,
    pub emotional_state: String,
    /// Session trends, only for follow-up entries
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trends: Option<Vec<EmotionTrend>>,
}

impl JournalAnalysis {
    /// Static answer used when the flow fails unexpectedly
    pub fn fallback() -> Self {
        Self {
            id: "fallback".to_string(),
            ai_response: FALLBACK_REPLY.to_string(),
            emotions: vec![EmotionScore::neutral()],
            sentiment: Sentiment::Neutral,
            sentiment_score: 0.0,
            risk_level: RiskLevel::Low,
            suggestions: FALLBACK_SUGGESTIONS.iter().map(|s| s.to_string()).collect(),
            resources: FALLBACK_RESOURCES.iter().map(|s| s.to_string()).collect(),
            confidence: 0.5,
            emotional_state: "seeking support".to_string(),
            trends: None,
        }
    }
}

/// An analyzed entry together with the session it was filed under
#[derive(Debug, Clone, PartialEq)]
pub struct AnalyzeOutcome {
    pub session_id: String,
    pub analysis: JournalAnalysis,
}

/// Trends of one session, or a note that there are too few entries
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionTrends {
    pub trends: Vec<EmotionTrend>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub insights: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patterns: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Journal service combining analysis, reply generation and storage
#[derive(Debug, Clone)]
pub struct JournalService {
    repo: Repository,
    sessions: SessionManager,
    detector: EmotionDetector,
    responder: ResponseGenerator,
}

impl JournalService {
    pub fn new(repo: Repository, detector: EmotionDetector, responder: ResponseGenerator) -> Self {
        Self {
            sessions: SessionManager::new(repo.clone()),
            repo,
            detector,
            responder,
        }
    }

    pub fn repository(&self) -> &Repository {
        &self.repo
    }

    pub fn sessions(&self) -> &SessionManager {
        &self.sessions
    }

    /// Form submission flow for a standalone entry
    ///
    /// Detection and generation run concurrently, each with its own
    /// fallback. Storage failures are logged and do not fail the submission.
    pub async fn submit_entry(&self, content: &str) -> FormSubmissionResult {
        if content.trim().chars().count() < MIN_CHARS {
            return FormSubmissionResult::failed(FORM_CONTENT_TOO_SHORT);
        }

        let session_id = generate_session_id();
        info!("Form submission for {} ({} chars)", session_id, content.chars().count());

        let (analysis, reply) = tokio::join!(self.detector.detect(content), self.responder.respond(content, &[]));

        let entry = new_entry(content, &analysis, &session_id);
        if let Err(e) = self.repo.log_journal_entry(&entry).await {
            warn!("Failed to log journal entry for {}: {}", session_id, e);
        }
        self.sessions.start(&session_id, 1).await;

        FormSubmissionResult {
            success: true,
            session_id,
            ai_response: Some(reply),
            emotion_analysis: Some(analysis),
            error: None,
        }
    }

    /// API flow: analyze an entry within a new or existing session
    ///
    /// Rejected input yields `AppError::Validation`; storage failures
    /// propagate so the caller can answer with the static fallback.
    pub async fn analyze_entry(&self, content: &str, session_id: Option<String>) -> Result<AnalyzeOutcome, AppError> {
        if content.trim().is_empty() {
            return Err(ValidationError::new(CONTENT_REQUIRED).into());
        }
        if content.chars().count() > MAX_CHARS {
            return Err(ValidationError::new(CONTENT_TOO_LONG).into());
        }

        let session_id = session_id
            .filter(|id| !id.is_empty())
            .unwrap_or_else(generate_session_id);

        let previous_entries = self.repo.get_session_entries(&session_id).await?;
        let is_follow_up = !previous_entries.is_empty();
        debug!(
            "Analyzing entry for {} ({} previous entries)",
            session_id,
            previous_entries.len()
        );

        let analysis = self.detector.detect(content).await;
        let emotions = analysis.emotion_names();

        let reply = match previous_entries.last() {
            Some(last) => {
                let previous = previous_exchange(last);
                self.responder.respond_follow_up(&previous, content, &emotions).await
            }
            None => self.responder.respond(content, &emotions).await,
        };

        let entry_id = self
            .repo
            .log_journal_entry(&new_entry(content, &analysis, &session_id))
            .await?;

        let trends = if is_follow_up {
            let entries = self.repo.get_session_entries(&session_id).await?;
            Some(entries.iter().map(EmotionTrend::from).collect())
        } else {
            None
        };

        let suggestions = reply
            .suggestions
            .into_iter()
            .chain(analysis.recommendations)
            .take(MAX_SUGGESTIONS)
            .collect();

        Ok(AnalyzeOutcome {
            session_id,
            analysis: JournalAnalysis {
                id: entry_id,
                ai_response: reply.response,
                emotions: analysis.emotions,
                sentiment: analysis.sentiment,
                sentiment_score: analysis.sentiment_score,
                risk_level: analysis.risk_level,
                suggestions,
                resources: reply.resources,
                confidence: reply.confidence,
                emotional_state: analysis.emotional_state,
                trends,
            },
        })
    }

    /// Entries of a session, oldest first
    pub async fn session_entries(&self, session_id: &str) -> anyhow::Result<Vec<JournalEntryRecord>> {
        self.repo.get_session_entries(session_id).await
    }

    /// Trends, insights and patterns of a session
    pub async fn session_trends(&self, session_id: &str) -> anyhow::Result<SessionTrends> {
        let entries = self.repo.get_session_entries(session_id).await?;

        if entries.len() < MIN_ENTRIES_FOR_TRENDS {
            return Ok(SessionTrends {
                trends: Vec::new(),
                insights: None,
                patterns: None,
                message: Some(TRENDS_NEED_MORE_ENTRIES.to_string()),
            });
        }

        let report = analyze_trends(entries.iter().map(EmotionTrend::from).collect());

        Ok(SessionTrends {
            trends: report.trends,
            insights: Some(report.insights),
            patterns: Some(report.patterns),
            message: None,
        })
    }
}

fn new_entry(content: &str, analysis: &EmotionAnalysis, session_id: &str) -> NewJournalEntry {
    NewJournalEntry {
        content: content.to_string(),
        timestamp: Utc::now(),
        emotions: analysis.emotion_names(),
        sentiment: analysis.sentiment,
        sentiment_score: analysis.sentiment_score,
        risk_level: analysis.risk_level,
        session_id: session_id.to_string(),
        anonymous_user_id: None,
    }
}

/// Replies are not stored, so the earlier suggestions are rebuilt from
/// the previous entry's primary emotion
fn previous_exchange(entry: &JournalEntryRecord) -> PreviousExchange {
    let primary = entry.emotions.first().map(String::as_str).unwrap_or("neutral");

    PreviousExchange {
        content: entry.content.clone(),
        suggestions: recommendations_for(primary),
    }
}
