//! Application configuration.
//!
//! Layers, lowest priority first: built-in defaults, an optional TOML file,
//! `CARBON__*` environment variables, then the bare `PERPLEXITY_API_KEY` and
//! `OPENWEATHER_API_KEY` variables.

use std::path::Path;

use ::config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::models::Region;
use crate::storage::PoolConfig;
use crate::Result;

/// Config file looked up in the working directory when none is given
pub const DEFAULT_CONFIG_FILE: &str = "carbontrack";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Requests allowed per client per window
    pub rate_limit_requests: u32,
    pub rate_limit_window_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5000,
            rate_limit_requests: 100,
            rate_limit_window_secs: 60,
        }
    }
}

impl ServerConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// SQLite file path, or `:memory:`
    pub path: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connect_timeout_secs: u64,
    pub idle_timeout_secs: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        let pool = PoolConfig::default();
        Self {
            path: crate::DEFAULT_DB_FILE.to_string(),
            max_connections: pool.max_connections,
            min_connections: pool.min_connections,
            connect_timeout_secs: pool.connect_timeout_secs,
            idle_timeout_secs: pool.idle_timeout_secs,
        }
    }
}

impl DatabaseConfig {
    pub fn pool(&self) -> PoolConfig {
        PoolConfig {
            max_connections: self.max_connections,
            min_connections: self.min_connections,
            connect_timeout_secs: self.connect_timeout_secs,
            idle_timeout_secs: self.idle_timeout_secs,
        }
    }
}

/// Text generation service settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssistantConfig {
    /// Unset disables AI suggestions and chat
    pub api_key: Option<String>,
    pub endpoint: String,
    pub model: String,
    pub temperature: f32,
    pub suggestion_max_tokens: u32,
    pub chat_max_tokens: u32,
    pub timeout_secs: u64,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            endpoint: "https://api.perplexity.ai/chat/completions".to_string(),
            model: "sonar-pro".to_string(),
            temperature: 0.7,
            suggestion_max_tokens: 250,
            chat_max_tokens: 500,
            timeout_secs: 15,
        }
    }
}

/// Weather service settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherConfig {
    /// Unset disables weather lookups
    pub api_key: Option<String>,
    pub endpoint: String,
    pub timeout_secs: u64,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            endpoint: "https://api.openweathermap.org/data/2.5/weather".to_string(),
            timeout_secs: 5,
        }
    }
}

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    /// Location used when a request does not name one
    pub region: Region,
    pub assistant: AssistantConfig,
    pub weather: WeatherConfig,
}

impl AppConfig {
    /// Load configuration, reading `path` if given or `carbontrack.toml` if present
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let file = match path {
            Some(p) => File::from(p).required(true),
            None => File::with_name(DEFAULT_CONFIG_FILE).required(false),
        };

        let config = Config::builder()
            .add_source(file)
            .add_source(Environment::with_prefix("CARBON").separator("__"))
            .set_override_option("assistant.api_key", std::env::var("PERPLEXITY_API_KEY").ok())?
            .set_override_option("weather.api_key", std::env::var("OPENWEATHER_API_KEY").ok())?
            .build()?;

        Ok(config.try_deserialize()?)
    }
}
