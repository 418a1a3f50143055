/*!
 * Error responses of the HTTP surface.
 */

use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use log::{debug, error};
use serde_json::json;
use thiserror::Error;

use crate::errors::{AdminError, AppError};

pub const UNAUTHORIZED: &str = "Unauthorized";
pub const INTERNAL_ERROR: &str = "Internal server error";
pub const INVALID_BODY: &str = "Invalid request body";
pub const INVALID_QUERY: &str = "Invalid query parameters";

/// Failure answered with `{"error": message}`
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{}", UNAUTHORIZED)]
    Unauthorized,

    #[error("{0}")]
    NotFound(String),

    /// Internal failure; the client only sees `public`
    #[error("{public}: {cause}")]
    Internal { public: String, cause: anyhow::Error },
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn internal(public: impl Into<String>, cause: impl Into<anyhow::Error>) -> Self {
        ApiError::Internal {
            public: public.into(),
            cause: cause.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn public_message(&self) -> String {
        match self {
            ApiError::BadRequest(message) | ApiError::NotFound(message) => message.clone(),
            ApiError::Unauthorized => UNAUTHORIZED.to_string(),
            ApiError::Internal { public, .. } => public.clone(),
        }
    }
}

impl From<AdminError> for ApiError {
    fn from(err: AdminError) -> Self {
        match err {
            AdminError::InvalidCredentials | AdminError::Unauthorized => ApiError::Unauthorized,
            AdminError::EmptyDataset => ApiError::internal(INTERNAL_ERROR, err),
        }
    }
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        match err {
            AppError::Validation(v) => ApiError::BadRequest(v.to_string()),
            AppError::Admin(a) => a.into(),
            other => ApiError::internal(INTERNAL_ERROR, other),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        debug!("Rejected request body: {}", rejection.body_text());
        ApiError::bad_request(INVALID_BODY)
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        debug!("Rejected query: {}", rejection.body_text());
        ApiError::bad_request(INVALID_QUERY)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Internal { public, cause } = &self {
            error!("{}: {:#}", public, cause);
        }

        (self.status(), Json(json!({ "error": self.public_message() }))).into_response()
    }
}
