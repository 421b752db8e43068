use super::Mutation;
use crate::config::AdminConfig;
use crate::db::postgres;
use crate::db::schema::{ADMIN_ROLE, INSERT_ADMIN};
use crate::error::MenuDbError;
use crate::password::hash_password;
use sqlx::PgConnection;
use std::fmt;

/// Insert one admin user unless any user already holds the admin role.
#[derive(Clone)]
pub struct BootstrapAdmin {
    name: String,
    email: String,
    password: String,
}

impl fmt::Debug for BootstrapAdmin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BootstrapAdmin")
            .field("name", &self.name)
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

impl BootstrapAdmin {
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Result<Self, MenuDbError> {
        let password = password.into();
        if password.is_empty() {
            return Err(MenuDbError::MissingConfig("ADMIN_PASSWORD"));
        }
        let email = email.into();
        if email.trim().is_empty() {
            return Err(MenuDbError::MissingConfig("ADMIN_EMAIL"));
        }
        Ok(Self {
            name: name.into(),
            email,
            password,
        })
    }

    pub fn from_config(cfg: &AdminConfig) -> Result<Self, MenuDbError> {
        let password = cfg
            .password
            .clone()
            .ok_or(MenuDbError::MissingConfig("ADMIN_PASSWORD"))?;
        let email = cfg
            .email
            .clone()
            .ok_or(MenuDbError::MissingConfig("ADMIN_EMAIL"))?;
        let name = cfg.name.clone().unwrap_or_else(|| "Admin".to_string());
        Self::new(name, email, password)
    }

    pub fn email(&self) -> &str {
        &self.email
    }
}

impl Mutation<PgConnection> for BootstrapAdmin {
    fn describe(&self) -> String {
        format!("bootstrap admin user {}", self.email)
    }

    async fn is_satisfied(&self, conn: &mut PgConnection) -> Result<bool, MenuDbError> {
        postgres::admin_exists(&mut *conn).await
    }

    async fn apply(&self, conn: &mut PgConnection) -> Result<u64, MenuDbError> {
        let hash = hash_password(&self.password)?;
        let done = sqlx::query(INSERT_ADMIN)
            .bind(&self.name)
            .bind(&self.email)
            .bind(hash)
            .bind(ADMIN_ROLE)
            .execute(&mut *conn)
            .await?;
        Ok(done.rows_affected())
    }

    async fn observe(&self, conn: &mut PgConnection) -> Result<String, MenuDbError> {
        let count = postgres::count_admins(&mut *conn).await?;
        Ok(format!("{count} admin user(s)"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_is_required() {
        let cfg = AdminConfig {
            password: None,
            ..AdminConfig::default()
        };
        assert!(matches!(
            BootstrapAdmin::from_config(&cfg),
            Err(MenuDbError::MissingConfig("ADMIN_PASSWORD"))
        ));
        assert!(BootstrapAdmin::new("Admin", "a@b.c", "").is_err());
    }

    #[test]
    fn debug_output_omits_the_password() {
        let cfg = AdminConfig {
            password: Some("pa55word".into()),
            ..AdminConfig::default()
        };
        let admin = BootstrapAdmin::from_config(&cfg).unwrap();
        assert_eq!(admin.email(), "admin@restaurant.local");
        assert!(!format!("{admin:?}").contains("pa55word"));
    }
}
