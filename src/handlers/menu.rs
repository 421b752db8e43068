use axum::{Json, extract::State};
use serde_json::Value;
use tracing::debug;

use crate::db::postgres;
use crate::{MenuDbError, router::MenuState};

/// GET /api/menu/categories -> every row of `categories`, ordered by id.
pub async fn categories_handler(
    State(state): State<MenuState>,
) -> Result<Json<Vec<Value>>, MenuDbError> {
    let rows = postgres::list_categories(&state.pool).await?;
    debug!(count = rows.len(), "served menu categories");
    Ok(Json(rows))
}
