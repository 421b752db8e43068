use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use sqlx::Error as SqlxError;
use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum MenuDbError {
    #[error("Configuration error: {0}")]
    Config(#[from] Box<figment::Error>),

    #[error("Missing configuration value: {0}")]
    MissingConfig(&'static str),

    #[error("Invalid database URL: {0}")]
    InvalidDatabaseUrl(String),

    #[error("Database connection error: {0}")]
    Connection(#[source] SqlxError),

    #[error("Database query error: {0}")]
    Query(#[source] SqlxError),

    #[error("Invalid SQL identifier: {0:?}")]
    InvalidIdentifier(String),

    #[error("Unsupported column type: {0:?}")]
    InvalidColumnType(String),

    #[error("Invalid image URL {url:?}: {reason}")]
    InvalidImageUrl { url: String, reason: String },

    #[error("Password hashing failed: {0}")]
    PasswordHash(String),

    #[error("Target state still not satisfied after applying: {0}")]
    Unverified(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<figment::Error> for MenuDbError {
    fn from(e: figment::Error) -> Self {
        MenuDbError::Config(Box::new(e))
    }
}

/// Transport-level driver errors count as connection failures, everything else
/// (syntax, constraints, decoding) as query failures.
impl From<SqlxError> for MenuDbError {
    fn from(e: SqlxError) -> Self {
        match e {
            SqlxError::Io(_)
            | SqlxError::Tls(_)
            | SqlxError::PoolTimedOut
            | SqlxError::PoolClosed
            | SqlxError::WorkerCrashed => MenuDbError::Connection(e),
            other => MenuDbError::Query(other),
        }
    }
}

impl IntoResponse for MenuDbError {
    fn into_response(self) -> axum::response::Response {
        let (status, error_body) = match self {
            MenuDbError::Connection(_) => (
                StatusCode::SERVICE_UNAVAILABLE,
                ApiErrorBody {
                    code: "DATABASE_UNAVAILABLE".to_string(),
                    message: "The database is unavailable.".to_string(),
                },
            ),
            MenuDbError::InvalidIdentifier(_)
            | MenuDbError::InvalidColumnType(_)
            | MenuDbError::InvalidImageUrl { .. } => (
                StatusCode::BAD_REQUEST,
                ApiErrorBody {
                    code: "BAD_REQUEST".to_string(),
                    message: "The request was invalid.".to_string(),
                },
            ),
            _ => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiErrorBody {
                    code: "INTERNAL_ERROR".to_string(),
                    message: "An internal server error occurred.".to_string(),
                },
            ),
        };
        (status, Json(ApiErrorResponse { error: error_body })).into_response()
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn driver_errors_are_classified() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        assert!(matches!(
            MenuDbError::from(SqlxError::Io(io)),
            MenuDbError::Connection(_)
        ));
        assert!(matches!(
            MenuDbError::from(SqlxError::RowNotFound),
            MenuDbError::Query(_)
        ));
    }

    #[test]
    fn responses_hide_internal_details() {
        let resp = MenuDbError::Query(SqlxError::RowNotFound).into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let resp = MenuDbError::Connection(SqlxError::PoolTimedOut).into_response();
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
