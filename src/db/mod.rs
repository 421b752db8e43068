//! Database module: connection handling, catalog queries and row models.
//!
//! Layout:
//! - `connect.rs`: building connect options from config, opening/closing handles
//! - `ident.rs`: validated SQL identifiers and column types for DDL
//! - `models.rs`: Rust structs mirroring rows returned by the catalog queries
//! - `postgres.rs`: read-only queries (information_schema, admins, categories)
//! - `schema.rs`: SQL text used by the queries and mutations

pub mod connect;
pub mod ident;
pub mod models;
pub mod postgres;
pub mod schema;

pub use connect::{close, connect, connect_options, lazy_pool, redact_url, target_label};
pub use ident::{ColumnType, Identifier};
pub use models::{AdminUser, ColumnInfo};
