use crate::error::MenuDbError;
use figment::{
    Figment, Metadata, Profile, Provider,
    providers::{Env, Format, Serialized, Toml},
    value::{Dict, Map, Tag, Value},
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Default location of the optional config file, relative to the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "menudb.toml";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub loglevel: String,
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub admin: AdminConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            loglevel: "info".to_string(),
            database: DatabaseConfig::default(),
            server: ServerConfig::default(),
            admin: AdminConfig::default(),
        }
    }
}

#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Full connection string; takes precedence over the discrete fields below.
    pub url: Option<String>,
    pub host: Option<String>,
    pub port: u16,
    pub user: Option<String>,
    pub password: Option<String>,
    pub name: Option<String>,
    /// `None` leaves the driver's default TLS negotiation in place.
    pub ssl: Option<bool>,
    pub ssl_reject_unauthorized: bool,
    pub connect_timeout_secs: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            host: None,
            port: 5432,
            user: None,
            password: None,
            name: None,
            ssl: None,
            ssl_reject_unauthorized: true,
            connect_timeout_secs: 10,
        }
    }
}

impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("url", &self.url.as_deref().map(crate::db::redact_url))
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("name", &self.name)
            .field("ssl", &self.ssl)
            .field("ssl_reject_unauthorized", &self.ssl_reject_unauthorized)
            .field("connect_timeout_secs", &self.connect_timeout_secs)
            .finish()
    }
}

impl DatabaseConfig {
    /// Checks that enough is present to build a connection. Values are not otherwise validated.
    pub fn ensure_present(&self) -> Result<(), MenuDbError> {
        if self.url.is_some() {
            return Ok(());
        }
        if self.host.is_none() {
            return Err(MenuDbError::MissingConfig("DB_HOST (or DATABASE_URL)"));
        }
        if self.user.is_none() {
            return Err(MenuDbError::MissingConfig("DB_USER (or DATABASE_URL)"));
        }
        if self.name.is_none() {
            return Err(MenuDbError::MissingConfig("DB_NAME (or DATABASE_URL)"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
        }
    }
}

impl ServerConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AdminConfig {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            name: Some("Admin".to_string()),
            email: Some("admin@restaurant.local".to_string()),
            password: None,
        }
    }
}

impl fmt::Debug for AdminConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdminConfig")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl Config {
    /// Layered sources: defaults, then the TOML file, then the environment.
    pub fn figment(path: &Path) -> Figment {
        Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file(path))
            .merge(Env::raw().only(&["loglevel"]))
            .merge(nested_env("DB_", "database", &["host", "user", "password", "name"]))
            .merge(nested_env("SERVER_", "server", &[]))
            .merge(nested_env("ADMIN_", "admin", &["name", "email", "password"]))
            .merge(TextEnv(TEXT_ENV))
    }

    pub fn load(path: Option<&Path>) -> Result<Self, MenuDbError> {
        let path = path.unwrap_or_else(|| Path::new(DEFAULT_CONFIG_FILE));
        Ok(Self::figment(path).extract()?)
    }
}

fn nested_env(prefix: &'static str, section: &'static str, text_keys: &[&str]) -> Env {
    Env::prefixed(prefix)
        .ignore(text_keys)
        .map(move |key| format!("{section}.{}", key.as_str().to_ascii_lowercase()).into())
}

/// Variables taken verbatim: `(variable, section, field)`.
const TEXT_ENV: &[(&str, &str, &str)] = &[
    ("DATABASE_URL", "database", "url"),
    ("DB_HOST", "database", "host"),
    ("DB_USER", "database", "user"),
    ("DB_PASSWORD", "database", "password"),
    ("DB_NAME", "database", "name"),
    ("ADMIN_NAME", "admin", "name"),
    ("ADMIN_EMAIL", "admin", "email"),
    ("ADMIN_PASSWORD", "admin", "password"),
];

/// Environment provider that keeps values as strings.
///
/// `Env` infers types, so `007` would become the integer 7 and `[x]` an array. Credentials
/// and names must reach the driver exactly as written.
struct TextEnv(&'static [(&'static str, &'static str, &'static str)]);

impl Provider for TextEnv {
    fn metadata(&self) -> Metadata {
        Metadata::named("environment variable(s)")
    }

    fn data(&self) -> Result<Map<Profile, Dict>, figment::Error> {
        let mut dict = Dict::new();
        for &(var, section, field) in self.0 {
            let Ok(value) = std::env::var(var) else {
                continue;
            };
            let entry = dict
                .entry(section.to_string())
                .or_insert_with(|| Value::Dict(Tag::Default, Dict::new()));
            if let Value::Dict(_, fields) = entry {
                fields.insert(field.to_string(), Value::from(value));
            }
        }
        Ok(Profile::Default.collect(dict))
    }
}
