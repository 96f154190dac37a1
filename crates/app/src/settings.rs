//! Handles settings for the application. Configuration is read from
//! `settings.toml` (or the file named by `SAMS_CONFIG`) and overridden by
//! `SAMS__<SECTION>__<KEY>` environment variables.
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

const DEFAULT_CONFIG_PATH: &str = "settings";

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct App {
    pub level: String,
}

impl Default for App {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct Server {
    #[serde(default = "default_bind")]
    pub bind: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// HMAC key for session tokens. Required.
    pub token_secret: String,
    #[serde(default = "default_allowed_origin")]
    pub allowed_origin: String,
}

fn default_bind() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_allowed_origin() -> String {
    "*".to_string()
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseKind {
    /// Volatile, single connection.
    Memory,
    #[default]
    Sqlite,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Database {
    pub kind: DatabaseKind,
    pub path: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub idle_timeout_secs: u64,
    pub connect_timeout_secs: u64,
    /// Longest wait for a pooled connection before the operation fails.
    pub acquire_timeout_secs: u64,
}

impl Default for Database {
    fn default() -> Self {
        Self {
            kind: DatabaseKind::Sqlite,
            path: "sams.db".to_string(),
            max_connections: 10,
            min_connections: 2,
            idle_timeout_secs: 30,
            connect_timeout_secs: 10,
            acquire_timeout_secs: 30,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub app: App,
    pub server: Server,
    #[serde(default)]
    pub database: Database,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let path =
            std::env::var("SAMS_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        let settings = Config::builder()
            .add_source(File::with_name(&path).required(false))
            .add_source(
                Environment::with_prefix("SAMS")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Self::from_config(settings)
    }

    fn from_config(config: Config) -> Result<Self, ConfigError> {
        let settings: Self = config.try_deserialize()?;
        if settings.server.token_secret.trim().is_empty() {
            return Err(ConfigError::Message(
                "server.token_secret must not be empty".to_string(),
            ));
        }
        Ok(settings)
    }
}
