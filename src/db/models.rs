use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// One row of `information_schema.columns`, reduced to what the inspect command prints.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, FromRow)]
pub struct ColumnInfo {
    pub column_name: String,
    pub data_type: String,
    pub is_nullable: bool,
    pub column_default: Option<String>,
}

/// A user with the admin role. The password hash is never selected.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, FromRow)]
pub struct AdminUser {
    pub id: i64,
    pub name: Option<String>,
    pub email: Option<String>,
}

/// Counts behind the image-patch assertion for one name pattern.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, FromRow)]
pub struct ImageCoverage {
    pub matching: i64,
    pub missing: i64,
}
