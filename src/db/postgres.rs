use crate::db::ident::Identifier;
use crate::db::models::{AdminUser, ColumnInfo, ImageCoverage};
use crate::db::schema::{
    ADMIN_EXISTS, ADMIN_ROLE, COLUMN_EXISTS, COUNT_ADMINS, IMAGE_COVERAGE, LIST_ADMINS,
    LIST_CATEGORIES, LIST_COLUMNS, LIST_TABLES, PING,
};
use crate::error::MenuDbError;
use serde_json::Value;
use sqlx::PgExecutor;
use sqlx::types::Json;

/// Base tables in the connection's current schema.
pub async fn list_tables<'e>(db: impl PgExecutor<'e>) -> Result<Vec<String>, MenuDbError> {
    let rows: Vec<(String,)> = sqlx::query_as(LIST_TABLES).fetch_all(db).await?;
    Ok(rows.into_iter().map(|(name,)| name).collect())
}

/// Columns of `table` in ordinal order; empty when the table does not exist.
pub async fn list_columns<'e>(
    db: impl PgExecutor<'e>,
    table: &Identifier,
) -> Result<Vec<ColumnInfo>, MenuDbError> {
    let cols = sqlx::query_as::<_, ColumnInfo>(LIST_COLUMNS)
        .bind(table.as_str())
        .fetch_all(db)
        .await?;
    Ok(cols)
}

pub async fn column_exists<'e>(
    db: impl PgExecutor<'e>,
    table: &Identifier,
    column: &Identifier,
) -> Result<bool, MenuDbError> {
    let (exists,): (bool,) = sqlx::query_as(COLUMN_EXISTS)
        .bind(table.as_str())
        .bind(column.as_str())
        .fetch_one(db)
        .await?;
    Ok(exists)
}

pub async fn admin_exists<'e>(db: impl PgExecutor<'e>) -> Result<bool, MenuDbError> {
    let (exists,): (bool,) = sqlx::query_as(ADMIN_EXISTS)
        .bind(ADMIN_ROLE)
        .fetch_one(db)
        .await?;
    Ok(exists)
}

pub async fn count_admins<'e>(db: impl PgExecutor<'e>) -> Result<i64, MenuDbError> {
    let (count,): (i64,) = sqlx::query_as(COUNT_ADMINS)
        .bind(ADMIN_ROLE)
        .fetch_one(db)
        .await?;
    Ok(count)
}

pub async fn list_admins<'e>(db: impl PgExecutor<'e>) -> Result<Vec<AdminUser>, MenuDbError> {
    let admins = sqlx::query_as::<_, AdminUser>(LIST_ADMINS)
        .bind(ADMIN_ROLE)
        .fetch_all(db)
        .await?;
    Ok(admins)
}

pub async fn image_coverage<'e>(
    db: impl PgExecutor<'e>,
    name_pattern: &str,
) -> Result<ImageCoverage, MenuDbError> {
    let coverage = sqlx::query_as::<_, ImageCoverage>(IMAGE_COVERAGE)
        .bind(name_pattern)
        .fetch_one(db)
        .await?;
    Ok(coverage)
}

/// Every `categories` row as JSON, column names as keys.
pub async fn list_categories<'e>(db: impl PgExecutor<'e>) -> Result<Vec<Value>, MenuDbError> {
    let rows: Vec<(Json<Value>,)> = sqlx::query_as(LIST_CATEGORIES).fetch_all(db).await?;
    Ok(rows.into_iter().map(|(Json(row),)| row).collect())
}

pub async fn ping<'e>(db: impl PgExecutor<'e>) -> Result<(), MenuDbError> {
    sqlx::query(PING).execute(db).await?;
    Ok(())
}
