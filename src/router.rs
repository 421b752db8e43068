use crate::handlers::{menu, status};
use axum::{Router, routing::get};
use sqlx::PgPool;

/// Shared state for the HTTP surface. The pool is built by the caller and passed in.
#[derive(Clone)]
pub struct MenuState {
    pub pool: PgPool,
}

impl MenuState {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

pub fn menu_router(state: MenuState) -> Router {
    Router::new()
        .route("/test", get(status::test_handler))
        .route("/api/health", get(status::health_handler))
        .route("/api/menu/categories", get(menu::categories_handler))
        .with_state(state)
}
