//! HTTP error responses.

use axum::{Json, http::StatusCode, response::IntoResponse};
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

use crate::base::error::TriageError;

/// Errors surfaced by the HTTP handlers.
///
/// Bodies follow the `{"detail": "..."}` shape.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    NotFound(String),
    #[error(transparent)]
    Triage(#[from] TriageError),
    #[error("triage did not finish within {0} seconds")]
    TimedOut(u64),
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<anyhow::Error> for ApiError {
    fn from(value: anyhow::Error) -> Self {
        ApiError::Internal(format!("{value:#}"))
    }
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::TimedOut(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Triage(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn detail(&self) -> String {
        match self {
            ApiError::Triage(TriageError::NoMatchFound) => "No suitable employer found".to_string(),
            ApiError::TimedOut(_) => "Triage timed out, please retry".to_string(),
            ApiError::Internal(_) => "Internal server error".to_string(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status_code();

        if status.is_server_error() {
            error!(status = %status, error = %self, "Request failed.");
        } else {
            warn!(status = %status, error = %self, "Request rejected.");
        }

        (status, Json(json!({ "detail": self.detail() }))).into_response()
    }
}
