//! services/client/src/config.rs
//!
//! Defines the client's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use reqwest::Url;
use std::path::PathBuf;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    /// Base URL of the Arsipku REST API.
    pub api_url: Url,
    /// Where the bearer token is persisted between runs.
    pub token_path: PathBuf,
    pub page_size: u32,
    pub log_level: Level,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any key lookup. `from_env` passes the
    /// process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // --- API Endpoint ---
        let api_url_str =
            lookup("ARSIPKU_API_URL").unwrap_or_else(|| "http://localhost:8081".to_string());
        let api_url = Url::parse(&api_url_str).map_err(|e| {
            ConfigError::InvalidValue("ARSIPKU_API_URL".to_string(), e.to_string())
        })?;

        // --- Local Storage ---
        let token_path = lookup("ARSIPKU_TOKEN_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("./.arsipku/token"));

        // --- Lists ---
        let page_size = match lookup("ARSIPKU_PAGE_SIZE") {
            None => 10,
            Some(raw) => match raw.trim().parse::<u32>() {
                Ok(size) if size > 0 => size,
                _ => {
                    return Err(ConfigError::InvalidValue(
                        "ARSIPKU_PAGE_SIZE".to_string(),
                        format!("'{}' is not a positive integer", raw),
                    ))
                }
            },
        };

        let log_level_str = lookup("RUST_LOG").unwrap_or_else(|| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        Ok(Self {
            api_url,
            token_path,
            page_size,
            log_level,
        })
    }
}
