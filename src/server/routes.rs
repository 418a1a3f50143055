/*!
 * Journal, session and feedback handlers.
 */

use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use log::warn;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{json, Value};

use super::error::ApiError;
use super::state::SharedState;
use crate::errors::AppError;
use crate::journal_service::{JournalAnalysis, FormSubmissionResult, ANALYZE_FAILED, FORM_GENERIC_ERROR};
use crate::validation::journal::{
    char_count_display, form_state, format_validation_message, is_likely_spam, CharCountDisplay, FormState,
    MessageKind,
};
use crate::validation::{validate_feedback, FeedbackSubmission};

pub const SESSION_HEADER: &str = "x-session-id";
pub const SESSION_ID_REQUIRED: &str = "Session ID is required";
pub const INVALID_ACTION_SPECIFIED: &str = "Invalid action specified";
pub const SESSION_DATA_FAILED: &str = "Unable to retrieve session data";
pub const SESSION_NOT_FOUND: &str = "Session not found";
pub const FEEDBACK_SAVED: &str =
    "Thank you for your detailed feedback! This helps us improve MindMosaic's emotional support.";
pub const FEEDBACK_SAVE_FAILED: &str = "Unable to save feedback. Please try again.";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeRequest {
    /// Anything but a JSON string counts as missing content
    #[serde(default, deserialize_with = "string_or_empty")]
    pub content: String,
    #[serde(default)]
    pub session_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionQuery {
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub action: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct JournalForm {
    #[serde(default)]
    pub content: String,
}

/// Live feedback for the entry being typed
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftCheck {
    pub form: FormState,
    pub counter: CharCountDisplay,
    /// Errors then warnings, with their marker glyphs
    pub messages: Vec<String>,
    pub likely_spam: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EndSessionRequest {
    #[serde(default)]
    pub session_id: Option<String>,
}

fn string_or_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::String(text) => text,
        _ => String::new(),
    })
}

fn required_session(session_id: Option<String>) -> Result<String, ApiError> {
    session_id
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| ApiError::bad_request(SESSION_ID_REQUIRED))
}

/// Analyze an entry; unexpected failures still answer with a usable body
pub async fn analyze_entry(
    State(state): State<SharedState>,
    body: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> Response {
    let request = match body {
        Ok(Json(request)) => request,
        Err(rejection) => {
            warn!("Rejected analyze body: {}", rejection.body_text());
            return analyze_fallback();
        }
    };

    match state.journal.analyze_entry(&request.content, request.session_id).await {
        Ok(outcome) => {
            let mut response = Json(outcome.analysis).into_response();
            match HeaderValue::from_str(&outcome.session_id) {
                Ok(value) => {
                    response.headers_mut().insert(SESSION_HEADER, value);
                }
                Err(_) => warn!("Session id is not a valid header value"),
            }
            response
        }
        Err(AppError::Validation(err)) => ApiError::BadRequest(err.to_string()).into_response(),
        Err(err) => {
            warn!("Analyze flow failed: {}", err);
            analyze_fallback()
        }
    }
}

fn analyze_fallback() -> Response {
    Json(json!({
        "error": ANALYZE_FAILED,
        "fallback": JournalAnalysis::fallback(),
    }))
    .into_response()
}

/// Entries or trends of a session
pub async fn session_data(
    State(state): State<SharedState>,
    Query(query): Query<SessionQuery>,
) -> Result<Response, ApiError> {
    let session_id = required_session(query.session_id)?;

    match query.action.as_deref() {
        Some("entries") => {
            let entries = state
                .journal
                .session_entries(&session_id)
                .await
                .map_err(|e| ApiError::internal(SESSION_DATA_FAILED, e))?;
            Ok(Json(json!({ "entries": entries })).into_response())
        }
        Some("trends") => {
            let trends = state
                .journal
                .session_trends(&session_id)
                .await
                .map_err(|e| ApiError::internal(SESSION_DATA_FAILED, e))?;
            Ok(Json(trends).into_response())
        }
        _ => Err(ApiError::bad_request(INVALID_ACTION_SPECIFIED)),
    }
}

/// Validate a draft without storing or analyzing it
pub async fn check_draft(body: Result<Json<JournalForm>, JsonRejection>) -> Result<Json<DraftCheck>, ApiError> {
    let Json(form) = body?;
    let state = form_state(&form.content);
    let messages = state
        .errors
        .iter()
        .map(|m| format_validation_message(MessageKind::Error, m))
        .chain(state.warnings.iter().map(|m| format_validation_message(MessageKind::Warning, m)))
        .collect();

    Ok(Json(DraftCheck {
        counter: char_count_display(&form.content),
        likely_spam: is_likely_spam(&form.content),
        messages,
        form: state,
    }))
}

/// Form submission of a standalone entry
pub async fn submit_journal(
    State(state): State<SharedState>,
    body: Result<Json<JournalForm>, JsonRejection>,
) -> (StatusCode, Json<FormSubmissionResult>) {
    let form = match body {
        Ok(Json(form)) => form,
        Err(rejection) => {
            warn!("Rejected journal form: {}", rejection.body_text());
            return (StatusCode::BAD_REQUEST, Json(FormSubmissionResult::failed(FORM_GENERIC_ERROR)));
        }
    };

    let result = state.journal.submit_entry(&form.content).await;
    let status = if result.success { StatusCode::OK } else { StatusCode::BAD_REQUEST };
    (status, Json(result))
}

pub async fn submit_feedback(
    State(state): State<SharedState>,
    body: Result<Json<FeedbackSubmission>, JsonRejection>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let Json(submission) = body?;

    let record = validate_feedback(submission).map_err(|e| ApiError::BadRequest(e.to_string()))?;

    state
        .journal
        .repository()
        .log_feedback(&record)
        .await
        .map_err(|e| ApiError::internal(FEEDBACK_SAVE_FAILED, e))?;

    Ok(Json(json!({ "success": true, "message": FEEDBACK_SAVED })))
}

/// Summary of one session
pub async fn session_summary(
    State(state): State<SharedState>,
    Query(query): Query<SessionQuery>,
) -> Result<Response, ApiError> {
    let session_id = required_session(query.session_id)?;

    let summary = state
        .journal
        .sessions()
        .summary(&session_id)
        .await
        .map_err(|e| ApiError::internal(SESSION_DATA_FAILED, e))?;

    summary
        .map(|summary| Json(summary).into_response())
        .ok_or_else(|| ApiError::NotFound(SESSION_NOT_FOUND.to_string()))
}

pub async fn end_session(
    State(state): State<SharedState>,
    body: Result<Json<EndSessionRequest>, JsonRejection>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let Json(request) = body?;
    let session_id = required_session(request.session_id)?;

    let ended = state
        .journal
        .sessions()
        .end(&session_id)
        .await
        .map_err(|e| ApiError::internal(SESSION_DATA_FAILED, e))?;

    Ok(Json(json!({ "ended": ended })))
}

pub async fn health() -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": Utc::now(),
    }))
}
