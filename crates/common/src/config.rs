//! Application configuration.

use serde::Deserialize;
use std::path::Path;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// API server configuration.
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Pretty-ID allocator configuration.
    pub allocator: AllocatorConfig,
    /// Outbound email configuration. Absent outside production; feedback
    /// delivery refuses to run without it.
    #[serde(default)]
    pub email: Option<EmailConfig>,
}

/// API server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to bind to.
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Database connection configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// `PostgreSQL` connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

/// Pretty-ID allocator configuration.
///
/// The allocator runs as its own process; the API server reaches it over
/// plain HTTP.
#[derive(Debug, Clone, Deserialize)]
pub struct AllocatorConfig {
    /// Host the allocator binds to / is reachable at.
    #[serde(default = "default_allocator_host")]
    pub host: String,
    /// Port the allocator listens on.
    #[serde(default = "default_allocator_port")]
    pub port: u16,
    /// Path of the allocation endpoint.
    #[serde(default = "default_allocator_path")]
    pub path: String,
}

impl AllocatorConfig {
    /// Full URL of the allocation endpoint.
    #[must_use]
    pub fn url(&self) -> String {
        format!("http://{}:{}{}", self.host, self.port, self.path)
    }
}

/// Outbound email (SMTP) configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct EmailConfig {
    /// SMTP relay host.
    pub smtp_host: String,
    /// SMTP username.
    pub smtp_username: String,
    /// SMTP password.
    pub smtp_password: String,
    /// Address signup and feedback mail is sent from, and feedback is
    /// delivered to.
    pub main_address: String,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

const fn default_port() -> u16 {
    3000
}

const fn default_max_connections() -> u32 {
    100
}

const fn default_min_connections() -> u32 {
    5
}

fn default_allocator_host() -> String {
    "localhost".to_string()
}

const fn default_allocator_port() -> u16 {
    3001
}

fn default_allocator_path() -> String {
    "/nextPrettyId".to_string()
}

impl Config {
    /// Load configuration from files and environment variables.
    ///
    /// Configuration is loaded in the following order:
    /// 1. `config/default.toml`
    /// 2. `config/{environment}.toml` (based on `DYNSTORY_ENV`)
    /// 3. Environment variables with `DYNSTORY_` prefix
    pub fn load() -> Result<Self, config::ConfigError> {
        let env = std::env::var("DYNSTORY_ENV").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("DYNSTORY")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Load configuration from a specific file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::from(path.as_ref()))
            .add_source(
                config::Environment::with_prefix("DYNSTORY")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}
