use axum::extract::multipart::MultipartError;
use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use sqlx::Error as SqlxError;
use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum DashboardError {
    #[error("invalid username or password")]
    InvalidCredentials,

    #[error("Not authenticated; log in first")]
    Unauthenticated,

    #[error("CSV ingest error: {0}")]
    Ingest(#[from] IngestError),

    #[error("Upload is missing the `file` field")]
    MissingUpload,

    #[error("Multipart error: {0}")]
    Multipart(#[from] MultipartError),

    #[error("Database error: {0}")]
    DatabaseError(#[from] SqlxError),

    #[error("Session encoding error: {0}")]
    SessionEncoding(#[from] serde_json::Error),
}

/// Failure to turn an uploaded file into sales rows.
#[derive(Debug, ThisError)]
pub enum IngestError {
    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("missing required column(s): {}", .0.join(", "))]
    MissingColumns(Vec<&'static str>),

    #[error("row {row}: invalid value {value:?} in column `{column}`")]
    InvalidField {
        row: usize,
        column: &'static str,
        value: String,
    },
}

impl IntoResponse for DashboardError {
    fn into_response(self) -> axum::response::Response {
        let (status, code) = match &self {
            DashboardError::InvalidCredentials => (StatusCode::UNAUTHORIZED, "INVALID_CREDENTIALS"),
            DashboardError::Unauthenticated => (StatusCode::UNAUTHORIZED, "UNAUTHENTICATED"),
            DashboardError::Ingest(_) => (StatusCode::UNPROCESSABLE_ENTITY, "INVALID_CSV"),
            DashboardError::MissingUpload => (StatusCode::BAD_REQUEST, "MISSING_FILE"),
            DashboardError::Multipart(e) => (e.status(), "BAD_UPLOAD"),
            DashboardError::DatabaseError(_) | DashboardError::SessionEncoding(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
            }
        };

        let message = match &self {
            DashboardError::DatabaseError(e) => {
                tracing::error!(error = %e, "database failure");
                "An internal server error occurred.".to_string()
            }
            DashboardError::SessionEncoding(e) => {
                tracing::error!(error = %e, "failed to encode session");
                "An internal server error occurred.".to_string()
            }
            DashboardError::Ingest(e) => e.to_string(),
            other => other.to_string(),
        };

        let body = ApiErrorBody {
            code: code.to_string(),
            message,
        };
        (status, Json(ApiErrorResponse { error: body })).into_response()
    }
}

/// Standardized API error response body
#[derive(Serialize)]
pub struct ApiErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Serialize)]
pub struct ApiErrorResponse {
    pub error: ApiErrorBody,
}
