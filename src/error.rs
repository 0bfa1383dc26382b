use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Closed set of failure kinds surfaced by the portal. Everything the
/// handlers and workflow functions can fail with maps onto one of these.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("resource not found")]
    NotFound,
    #[error("{0}")]
    Validation(String),
    #[error("the record was modified by another user")]
    Conflict,
    #[error("authentication required")]
    Unauthorized,
    #[error("insufficient permissions for this operation")]
    Forbidden,
    #[error("database operation failed")]
    Database(sqlx::Error),
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => AppError::NotFound,
            other => AppError::Database(other),
        }
    }
}

/// Classifies an insert failure: a unique-constraint violation becomes
/// a validation error with the given message, anything else keeps its
/// usual mapping. Pre-insert existence checks race with concurrent
/// writers, so the constraint is the authoritative guard.
pub fn on_unique_violation(err: sqlx::Error, message: &str) -> AppError {
    if let sqlx::Error::Database(ref db_err) = err {
        if db_err.code().as_deref() == Some("23505") {
            return AppError::Validation(message.to_string());
        }
    }
    AppError::from(err)
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Conflict => StatusCode::CONFLICT,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::Database(err) => {
                log::error!("database error: {}", err);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_unique_errors_keep_their_classification() {
        assert!(matches!(
            on_unique_violation(sqlx::Error::RowNotFound, "duplicate"),
            AppError::NotFound
        ));
        assert!(matches!(
            on_unique_violation(sqlx::Error::PoolTimedOut, "duplicate"),
            AppError::Database(_)
        ));
    }
}
