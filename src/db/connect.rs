use crate::config::DatabaseConfig;
use crate::error::MenuDbError;
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions, PgSslMode};
use sqlx::{Connection, PgConnection};
use std::io;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

/// Build driver options from config. `DATABASE_URL` wins over the discrete fields;
/// the TLS flags are applied on top of either.
pub fn connect_options(cfg: &DatabaseConfig) -> Result<PgConnectOptions, MenuDbError> {
    cfg.ensure_present()?;

    let opts = match cfg.url.as_deref() {
        Some(url) => PgConnectOptions::from_str(url)
            .map_err(|e| MenuDbError::InvalidDatabaseUrl(e.to_string()))?,
        None => {
            let mut opts = PgConnectOptions::new_without_pgpass().port(cfg.port);
            if let Some(host) = cfg.host.as_deref() {
                opts = opts.host(host);
            }
            if let Some(user) = cfg.user.as_deref() {
                opts = opts.username(user);
            }
            if let Some(password) = cfg.password.as_deref() {
                opts = opts.password(password);
            }
            if let Some(name) = cfg.name.as_deref() {
                opts = opts.database(name);
            }
            opts
        }
    };

    Ok(match ssl_mode(cfg) {
        Some(mode) => opts.ssl_mode(mode),
        None => opts,
    })
}

fn ssl_mode(cfg: &DatabaseConfig) -> Option<PgSslMode> {
    match cfg.ssl? {
        false => Some(PgSslMode::Disable),
        true if cfg.ssl_reject_unauthorized => Some(PgSslMode::VerifyFull),
        true => Some(PgSslMode::Require),
    }
}

/// Open the single connection a mutator run works on.
pub async fn connect(cfg: &DatabaseConfig) -> Result<PgConnection, MenuDbError> {
    let opts = connect_options(cfg)?;
    let target = target_label(cfg);
    info!(db = %target, "connecting to database");

    let timeout = Duration::from_secs(cfg.connect_timeout_secs.max(1));
    let conn = tokio::time::timeout(timeout, PgConnection::connect_with(&opts))
        .await
        .map_err(|_| {
            MenuDbError::Connection(sqlx::Error::Io(io::Error::new(
                io::ErrorKind::TimedOut,
                format!("no connection within {}s", timeout.as_secs()),
            )))
        })?
        .map_err(MenuDbError::Connection)?;

    debug!(db = %target, "database connection established");
    Ok(conn)
}

/// Release the connection. Errors here are logged only; the outcome is already decided.
pub async fn close(conn: PgConnection) {
    match conn.close().await {
        Ok(()) => debug!("database connection closed"),
        Err(e) => warn!(error = %e, "failed to close database connection cleanly"),
    }
}

/// Pool for the HTTP server. Connections are opened on first use.
pub fn lazy_pool(cfg: &DatabaseConfig) -> Result<PgPool, MenuDbError> {
    let opts = connect_options(cfg)?;
    Ok(PgPoolOptions::new()
        .max_connections(5)
        .acquire_timeout(Duration::from_secs(cfg.connect_timeout_secs.max(1)))
        .connect_lazy_with(opts))
}

/// Human-readable connection target without secrets.
pub fn target_label(cfg: &DatabaseConfig) -> String {
    if let Some(url) = cfg.url.as_deref() {
        return redact_url(url);
    }
    format!(
        "{}@{}:{}/{}",
        cfg.user.as_deref().unwrap_or("-"),
        cfg.host.as_deref().unwrap_or("-"),
        cfg.port,
        cfg.name.as_deref().unwrap_or("-"),
    )
}

/// Mask the password component of a connection URL.
pub fn redact_url(raw: &str) -> String {
    match Url::parse(raw) {
        Ok(mut url) => {
            if url.password().is_some() {
                let _ = url.set_password(Some("***"));
            }
            url.to_string()
        }
        Err(_) => "<unparseable url>".to_string(),
    }
}
