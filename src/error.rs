use std::path::PathBuf;

use axum::{Json, http::StatusCode, response::{IntoResponse, Response}};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

/// Failure of a course sync. Every variant is fatal for the course being synced.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("{}: {message}", .file.display())]
    Schema { file: PathBuf, message: String },

    #[error("{context}: {message}")]
    CrossReference { context: String, message: String },

    #[error("UUID {uuid} used in multiple {kind}: {}", .identifiers.join(", "))]
    IdentityCollision {
        uuid: String,
        kind: &'static str,
        identifiers: Vec<String>,
    },

    #[error("{context}: {message}")]
    Structural { context: String, message: String },

    #[error("question {qid} references unknown tags: {}", .tags.join(", "))]
    UnknownTags { qid: String, tags: Vec<String> },

    #[error("I/O error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SyncError {
    pub fn schema(file: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        SyncError::Schema {
            file: file.into(),
            message: message.into(),
        }
    }

    pub fn structural(context: impl Into<String>, message: impl Into<String>) -> Self {
        SyncError::Structural {
            context: context.into(),
            message: message.into(),
        }
    }

    pub fn cross_reference(context: impl Into<String>, message: impl Into<String>) -> Self {
        SyncError::CrossReference {
            context: context.into(),
            message: message.into(),
        }
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        SyncError::Io {
            path: path.into(),
            source,
        }
    }

    /// True for errors caused by the course content rather than the environment.
    pub fn is_content_error(&self) -> bool {
        matches!(
            self,
            SyncError::Schema { .. }
                | SyncError::CrossReference { .. }
                | SyncError::IdentityCollision { .. }
                | SyncError::Structural { .. }
                | SyncError::UnknownTags { .. }
        )
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Sync failed: {0}")]
    Sync(#[from] SyncError),

    #[error("Not found")]
    NotFound,

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal server error")]
    InternalServerError,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::NotFound => (StatusCode::NOT_FOUND, "Not Found".to_string()),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Sync(e @ SyncError::IdentityCollision { .. }) => {
                (StatusCode::CONFLICT, e.to_string())
            }
            AppError::Sync(e) if e.is_content_error() => {
                (StatusCode::UNPROCESSABLE_ENTITY, e.to_string())
            }
            AppError::Sync(e) => {
                error!("sync error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Sync failed".to_string(),
                )
            }
            AppError::Database(e) => {
                error!("database error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Database error occurred".to_string(),
                )
            }
            AppError::InternalServerError => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
        };

        let body = Json(ErrorResponse {
            error: status.to_string(),
            message: error_message,
        });

        (status, body).into_response()
    }
}
