use super::Mutation;
use crate::db::postgres;
use crate::db::{ColumnType, Identifier};
use crate::error::MenuDbError;
use sqlx::PgConnection;

/// `ALTER TABLE <table> ADD COLUMN <column> <type>`, skipped when the column exists.
/// The new column is nullable and has no default.
#[derive(Debug, Clone)]
pub struct AddColumn {
    table: Identifier,
    column: Identifier,
    sql_type: ColumnType,
}

impl AddColumn {
    pub fn new(table: &str, column: &str, sql_type: &str) -> Result<Self, MenuDbError> {
        Ok(Self {
            table: Identifier::new(table)?,
            column: Identifier::new(column)?,
            sql_type: ColumnType::new(sql_type)?,
        })
    }

    /// Scheduled pickup time for orders.
    pub fn pickup_time() -> Self {
        Self {
            table: Identifier("orders".to_string()),
            column: Identifier("pickup_time".to_string()),
            sql_type: ColumnType("TIMESTAMP".to_string()),
        }
    }

    pub fn ddl(&self) -> String {
        format!(
            "ALTER TABLE {} ADD COLUMN {} {}",
            self.table.quoted(),
            self.column.quoted(),
            self.sql_type
        )
    }
}

impl Mutation<PgConnection> for AddColumn {
    fn describe(&self) -> String {
        format!("add column {}.{} {}", self.table, self.column, self.sql_type)
    }

    async fn is_satisfied(&self, conn: &mut PgConnection) -> Result<bool, MenuDbError> {
        postgres::column_exists(&mut *conn, &self.table, &self.column).await
    }

    async fn apply(&self, conn: &mut PgConnection) -> Result<u64, MenuDbError> {
        let done = sqlx::query(&self.ddl()).execute(&mut *conn).await?;
        Ok(done.rows_affected())
    }

    async fn observe(&self, conn: &mut PgConnection) -> Result<String, MenuDbError> {
        let columns = postgres::list_columns(&mut *conn, &self.table).await?;
        let state = match columns.iter().find(|c| c.column_name == self.column.as_str()) {
            Some(col) => format!(
                "{}.{} is {} ({})",
                self.table,
                self.column,
                col.data_type,
                if col.is_nullable { "nullable" } else { "not null" }
            ),
            None if columns.is_empty() => format!("table {} not found", self.table),
            None => format!("{}.{} absent", self.table, self.column),
        };
        Ok(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pickup_time_ddl() {
        assert_eq!(
            AddColumn::pickup_time().ddl(),
            r#"ALTER TABLE "orders" ADD COLUMN "pickup_time" TIMESTAMP"#
        );
    }

    #[test]
    fn custom_columns_are_validated() {
        let m = AddColumn::new("Menu_Items", "spice_level", "smallint").unwrap();
        assert_eq!(
            m.ddl(),
            r#"ALTER TABLE "menu_items" ADD COLUMN "spice_level" SMALLINT"#
        );
        assert!(AddColumn::new("orders", "x\"; --", "text").is_err());
        assert!(AddColumn::new("orders", "note", "text; drop table orders").is_err());
        assert!(matches!(
            AddColumn::new("orders", "x", "text not null"),
            Err(MenuDbError::InvalidColumnType(_))
        ));
    }
}
