use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::warn;

use crate::db::postgres;
use crate::router::MenuState;

/// `{status, message, timestamp}` body shared by the liveness endpoints.
#[derive(Debug, Serialize)]
pub struct StatusBody {
    pub status: &'static str,
    pub message: &'static str,
    pub timestamp: DateTime<Utc>,
}

impl StatusBody {
    fn new(status: &'static str, message: &'static str) -> Self {
        Self {
            status,
            message,
            timestamp: Utc::now(),
        }
    }
}

/// GET /test -> confirms the process is serving requests; never touches the database.
pub async fn test_handler() -> Json<StatusBody> {
    Json(StatusBody::new("ok", "Server is running"))
}

/// GET /api/health -> round-trips `SELECT 1` through the pool.
pub async fn health_handler(State(state): State<MenuState>) -> impl IntoResponse {
    match postgres::ping(&state.pool).await {
        Ok(()) => (
            StatusCode::OK,
            Json(StatusBody::new("ok", "Database connection healthy")),
        ),
        Err(e) => {
            warn!(error = %e, "health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(StatusBody::new("error", "Database connection failed")),
            )
        }
    }
}
