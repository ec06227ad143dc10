//! Carbon Tracker Library
//!
//! Estimates a personal carbon footprint from lifestyle activity data.
//!
//! # Features
//!
//! - Regional emission factors for transport, food, energy and waste
//! - Derived environmental impact metrics (Earths, trees, sustainability score)
//! - AI-assisted suggestions with a static fallback
//! - SQLite persistence of calculations, analytics and goals
//! - Optional HTTP API via axum
//!
//! # Example
//!
//! ```rust
//! use carbon_tracker::engine::{compute, derive};
//! use carbon_tracker::models::{classify, ActivityRecord, TransportMode};
//!
//! let activity = ActivityRecord {
//!     transport_mode: Some(TransportMode::Car),
//!     transport_distance: Some(100.0),
//!     ..Default::default()
//! };
//!
//! let result = compute(&activity, classify("Germany"));
//! let impact = derive(result.total);
//! assert!(impact.is_some());
//! ```

pub mod config;
pub mod engine;
pub mod models;
pub mod services;
pub mod storage;
pub mod utils;

#[cfg(feature = "api")]
pub mod api;

use thiserror::Error;

/// Result type alias for carbon tracker operations
pub type Result<T> = std::result::Result<T, CarbonTrackerError>;

/// Errors that can occur in the carbon tracker
#[derive(Error, Debug)]
pub enum CarbonTrackerError {
    /// Database operation failed
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Invalid user input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Resource not found
    #[error("{resource} not found: {id}")]
    NotFound {
        resource: &'static str,
        id: String,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Validation error with details
    #[error("Validation failed: {field} - {message}")]
    Validation {
        field: String,
        message: String,
    },

    /// Rate limit exceeded
    #[error("Rate limit exceeded, retry after {retry_after_secs} seconds")]
    RateLimited {
        retry_after_secs: u64,
    },

    /// An external collaborator (weather, AI assistant) failed
    #[error("{service} unavailable: {message}")]
    Upstream {
        service: &'static str,
        message: String,
    },

    /// Internal error (should not expose details to users)
    #[error("Internal error")]
    Internal(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl CarbonTrackerError {
    /// Create a validation error for a request field
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create an upstream error for a named collaborator
    pub fn upstream(service: &'static str, message: impl Into<String>) -> Self {
        Self::Upstream {
            service,
            message: message.into(),
        }
    }

    /// Create a not found error for a user
    pub fn user_not_found(id: impl Into<String>) -> Self {
        Self::NotFound {
            resource: "User",
            id: id.into(),
        }
    }

    /// Wrap an error as internal (hides details from users)
    pub fn internal<E>(error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Internal(Box::new(error))
    }

    /// Check if this is a transient error that could be retried
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Database(_) | Self::RateLimited { .. } | Self::Io(_) | Self::Upstream { .. }
        )
    }

    /// Get HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            Self::NotFound { .. } => 404,
            Self::InvalidInput(_) | Self::Validation { .. } => 400,
            Self::RateLimited { .. } => 429,
            Self::Upstream { .. } => 502,
            Self::Config(_) => 500,
            Self::Database(_) | Self::Io(_) | Self::Serialization(_) | Self::Internal(_) => 500,
        }
    }
}

impl From<reqwest::Error> for CarbonTrackerError {
    fn from(err: reqwest::Error) -> Self {
        let service = if err.is_timeout() { "timeout" } else { "http" };
        Self::Upstream {
            service,
            message: err.to_string(),
        }
    }
}

impl From<::config::ConfigError> for CarbonTrackerError {
    fn from(err: ::config::ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}

// Re-export commonly used types for convenience
pub use config::AppConfig;
pub use engine::{compute, derive, FactorTable};
pub use models::{ActivityRecord, FootprintResult, ImpactMetrics, RegionClass};
pub use storage::{Repository, SqliteRepository};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default database filename
pub const DEFAULT_DB_FILE: &str = "carbon.db";

/// Annual CO2 absorption of one mature tree, in kg
pub const KG_CO2_PER_TREE_YEAR: f64 = 22.0;

/// Round to a fixed number of decimal places.
///
/// Values too large to scale are returned unchanged, and negative zero is
/// normalised to zero.
pub fn round_to(value: f64, places: i32) -> f64 {
    let scale = 10f64.powi(places);
    let scaled = value * scale;
    if !scaled.is_finite() {
        return value;
    }
    scaled.round() / scale + 0.0
}
