//! Application error type.
//!
//! Every handler returns `AppResult<T>`; `AppError` renders itself as an
//! `ApiResponse` error envelope with a matching HTTP status.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::response::ApiResponse;

/// Result alias used across services.
pub type AppResult<T> = Result<T, AppError>;

/// Errors surfaced by the services.
#[derive(Debug, Error)]
pub enum AppError {
    /// Invalid request input.
    #[error("validation failed: {0}")]
    Validation(String),

    /// Free-form SQL rejected before execution.
    #[error("unsafe SQL: {0}")]
    UnsafeSql(String),

    /// No environment with the given name is configured.
    #[error("environment not found: {0}")]
    EnvironmentNotFound(String),

    /// Date range mode selected on an object without date-like columns.
    #[error("no date columns found in {0}")]
    NoDateColumns(String),

    /// The query returned no rows, so there is nothing to export.
    #[error("query returned no rows")]
    EmptyResult,

    /// A user query failed on the warehouse.
    #[error("SQL execution failed: {message}")]
    SqlExecution {
        message: String,
        /// Advisory fix text; never validated or applied.
        suggestion: Option<String>,
    },

    /// Could not open a warehouse connection.
    #[error("database connection failed: {0}")]
    DatabaseConnection(String),

    /// A catalog lookup or other internal query failed.
    #[error("database query failed: {0}")]
    DatabaseQuery(String),

    /// A downstream HTTP service failed.
    #[error("external service error: {0}")]
    ExternalService(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Stable error code for clients.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::UnsafeSql(_) => "UNSAFE_SQL",
            AppError::EnvironmentNotFound(_) => "ENVIRONMENT_NOT_FOUND",
            AppError::NoDateColumns(_) => "NO_DATE_COLUMNS",
            AppError::EmptyResult => "EMPTY_RESULT",
            AppError::SqlExecution { .. } => "SQL_EXECUTION_ERROR",
            AppError::DatabaseConnection(_) => "DATABASE_CONNECTION",
            AppError::DatabaseQuery(_) => "DATABASE_QUERY",
            AppError::ExternalService(_) => "EXTERNAL_SERVICE",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// HTTP status for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::UnsafeSql(_) => StatusCode::BAD_REQUEST,
            AppError::EnvironmentNotFound(_) | AppError::EmptyResult => StatusCode::NOT_FOUND,
            AppError::NoDateColumns(_) | AppError::SqlExecution { .. } => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            AppError::DatabaseConnection(_)
            | AppError::DatabaseQuery(_)
            | AppError::ExternalService(_) => StatusCode::BAD_GATEWAY,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AppError::Validation(errors.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        match status {
            StatusCode::INTERNAL_SERVER_ERROR | StatusCode::BAD_GATEWAY => {
                tracing::error!(code = self.code(), error = %self, "请求失败");
            }
            _ => {
                tracing::warn!(code = self.code(), error = %self, "请求被拒绝");
            }
        }

        let body = match &self {
            AppError::SqlExecution {
                message,
                suggestion,
            } => ApiResponse::err_with_details(
                self.code(),
                message.clone(),
                serde_json::json!({ "suggested_fix": suggestion }),
            ),
            _ => ApiResponse::err(self.code(), self.to_string()),
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sql_execution_maps_to_unprocessable() {
        let err = AppError::SqlExecution {
            message: "syntax error at or near \"FORM\"".into(),
            suggestion: None,
        };
        assert_eq!(err.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(err.code(), "SQL_EXECUTION_ERROR");
    }

    #[test]
    fn test_connection_errors_are_bad_gateway() {
        assert_eq!(
            AppError::DatabaseConnection("refused".into()).status(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            AppError::ExternalService("timeout".into()).status(),
            StatusCode::BAD_GATEWAY
        );
    }
}
