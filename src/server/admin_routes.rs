/*!
 * Administrator handlers. Everything except login requires a bearer token.
 */

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    http::{header, HeaderMap},
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use log::{debug, info};
use serde::Deserialize;
use serde_json::json;

use super::error::{ApiError, INTERNAL_ERROR};
use super::state::SharedState;
use crate::admin::auth::bearer_token;
use crate::admin::{AdminToken, DateRangeFilter, EntryFilter, ExportFile, ExportType, TrainingAction, TrainingOutput};
use crate::database::{DateRange, MAX_RANGE_DAYS};

pub const INVALID_ACTION: &str = "Invalid action";
pub const INVALID_DAYS: &str = "Days must be a whole number between 1 and 3650";
pub const DEFAULT_TREND_DAYS: i64 = 30;

#[derive(Debug, Default, Deserialize)]
pub struct AdminQuery {
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub days: Option<i64>,
    #[serde(default, rename = "type")]
    pub export_type: Option<String>,
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub emotion: Option<String>,
    #[serde(default)]
    pub range: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct TrainingRequest {
    #[serde(default)]
    pub action: Option<String>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl AdminQuery {
    fn entry_filter(&self) -> Result<EntryFilter, ApiError> {
        let range = match self.range.as_deref() {
            Some(range) => range
                .parse::<DateRangeFilter>()
                .map_err(|e| ApiError::BadRequest(e.to_string()))?,
            None => DateRangeFilter::All,
        };

        Ok(EntryFilter {
            search: non_empty(self.search.clone()),
            emotion: non_empty(self.emotion.clone()).filter(|e| e != "all"),
            range,
        })
    }

    /// Trailing window ending now, when `days` was given
    fn date_range(&self) -> Result<Option<DateRange>, ApiError> {
        self.days
            .map(|days| DateRange::trailing_days(days, Utc::now()).ok_or_else(|| ApiError::bad_request(INVALID_DAYS)))
            .transpose()
    }

    fn trend_days(&self) -> Result<i64, ApiError> {
        let days = self.days.unwrap_or(DEFAULT_TREND_DAYS);
        if (1..=MAX_RANGE_DAYS).contains(&days) {
            Ok(days)
        } else {
            Err(ApiError::bad_request(INVALID_DAYS))
        }
    }
}

/// Reject requests without a live admin token
fn authorize(state: &SharedState, headers: &HeaderMap) -> Result<String, ApiError> {
    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(bearer_token)
        .ok_or(ApiError::Unauthorized)?;

    state.admin.auth().verify(token)?;
    Ok(token.to_string())
}

fn file_response(file: ExportFile) -> Response {
    (
        [
            (header::CONTENT_TYPE, file.mime_type),
            (header::CONTENT_DISPOSITION, format!("attachment; filename={}", file.filename)),
        ],
        file.data,
    )
        .into_response()
}

fn internal(err: anyhow::Error) -> ApiError {
    ApiError::internal(INTERNAL_ERROR, err)
}

pub async fn login(
    State(state): State<SharedState>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<AdminToken>, ApiError> {
    let Json(request) = body?;
    let purged = state.admin.auth().purge_expired();
    if purged > 0 {
        debug!("Purged {} expired admin tokens", purged);
    }

    let token = state.admin.auth().login(&request.email, &request.password)?;
    Ok(Json(token))
}

pub async fn logout(State(state): State<SharedState>, headers: HeaderMap) -> Result<Json<serde_json::Value>, ApiError> {
    let token = authorize(&state, &headers)?;
    let revoked = state.admin.auth().logout(&token);
    info!("Admin logged out");
    Ok(Json(json!({ "success": revoked })))
}

/// Dashboard data, exports and reports selected by `action`
pub async fn dashboard(
    State(state): State<SharedState>,
    headers: HeaderMap,
    query: Result<Query<AdminQuery>, QueryRejection>,
) -> Result<Response, ApiError> {
    authorize(&state, &headers)?;
    let Query(query) = query?;
    let admin = &state.admin;

    match query.action.as_deref() {
        Some("analytics") => {
            let analytics = admin.analytics(query.date_range()?).await.map_err(internal)?;
            Ok(Json(analytics).into_response())
        }
        Some("trends") => {
            let trends = admin.trends(query.trend_days()?).await.map_err(internal)?;
            Ok(Json(trends).into_response())
        }
        Some("entries") => {
            let filter = query.entry_filter()?;
            let entries = admin.entries(&filter).await.map_err(internal)?;
            Ok(Json(json!({ "entries": entries })).into_response())
        }
        Some("export") => {
            let export_type = match query.export_type.as_deref() {
                Some(kind) => kind
                    .parse::<ExportType>()
                    .map_err(|e| ApiError::BadRequest(e.to_string()))?,
                None => ExportType::default(),
            };
            let file = admin.export_entries(export_type).await.map_err(internal)?;
            Ok(file_response(file))
        }
        Some("export_analytics") => {
            let file = admin.export_analytics(query.date_range()?).await.map_err(internal)?;
            Ok(file_response(file))
        }
        Some("feedback") => {
            let file = admin.export_feedback().await.map_err(internal)?;
            Ok(file_response(file))
        }
        Some("feedback_summary") => {
            let analysis = admin.feedback_analysis().await.map_err(internal)?;
            Ok(Json(analysis).into_response())
        }
        Some("report") => {
            let file = admin.report().await.map_err(internal)?;
            Ok(file_response(file))
        }
        Some("metrics") => {
            let metrics = admin.metrics().await.map_err(internal)?;
            Ok(Json(metrics).into_response())
        }
        _ => Err(ApiError::bad_request(INVALID_ACTION)),
    }
}

pub async fn training(
    State(state): State<SharedState>,
    headers: HeaderMap,
    body: Result<Json<TrainingRequest>, JsonRejection>,
) -> Result<Json<TrainingOutput>, ApiError> {
    authorize(&state, &headers)?;
    let Json(request) = body?;

    let action = request
        .action
        .as_deref()
        .and_then(|action| action.parse::<TrainingAction>().ok())
        .ok_or_else(|| ApiError::bad_request(INVALID_ACTION))?;

    info!("Running training action {:?}", action);
    let output = state.admin.run_training(action).await.map_err(internal)?;
    Ok(Json(output))
}
