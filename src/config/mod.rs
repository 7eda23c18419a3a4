//! Typed configuration.
//!
//! Process settings come from environment variables and load once at
//! startup. What to poll, and how, comes from a TOML file. Both fail fast.
//! Sensitive values wrapped in secrecy::SecretString to prevent log leaks.

pub mod poll;
pub mod secrets;

pub use poll::{ClusterConfig, MarkPolicy, PollConfig, ProwConfig};

use crate::error::{Error, Result};
use secrecy::SecretString;

#[derive(Debug)]
pub struct Config {
    pub database_url: SecretString,
    pub otel_endpoint: Option<String>,
    pub log_level: String,
    /// `LOG_FORMAT=json` switches stderr logs to JSON lines.
    pub json_logs: bool,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// In local dev, call `dotenvy::dotenv().ok()` before this.
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            database_url: SecretString::from(required_var("DATABASE_URL")?),
            otel_endpoint: std::env::var("OTEL_ENDPOINT").ok(),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            json_logs: std::env::var("LOG_FORMAT").is_ok_and(|f| f.eq_ignore_ascii_case("json")),
        })
    }
}

fn required_var(name: &str) -> Result<String> {
    std::env::var(name)
        .map_err(|_| Error::Config(format!("required environment variable {name} is not set")))
}
