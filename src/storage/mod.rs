//! Storage layer for calculations, analytics, goals and accounts.
//!
//! This module provides the `Repository` trait defining the storage interface,
//! along with the SQLite implementation.

mod repository;
mod sqlite;

pub use repository::{Repository, RepositoryExt, HISTORY_LIMIT};
pub use sqlite::SqliteRepository;

#[cfg(test)]
pub use repository::mock;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

/// Connection pool configuration
#[derive(Debug, Clone)]
pub struct PoolConfig {
    /// Maximum connections in pool
    pub max_connections: u32,
    /// Minimum connections to keep alive
    pub min_connections: u32,
    /// Connection timeout in seconds
    pub connect_timeout_secs: u64,
    /// Idle connection timeout in seconds
    pub idle_timeout_secs: u64,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_connections: 10,
            min_connections: 1,
            connect_timeout_secs: 30,
            idle_timeout_secs: 600,
        }
    }
}

/// Health check result for storage
#[derive(Debug, Clone, Serialize)]
pub struct HealthCheck {
    /// Whether storage is healthy
    pub healthy: bool,
    /// Response time in milliseconds
    pub latency_ms: u64,
    /// Connection pool status
    pub pool_size: u32,
    /// Idle connections
    pub idle_connections: u32,
    /// Any error message
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl HealthCheck {
    pub fn healthy(latency_ms: u64) -> Self {
        Self {
            healthy: true,
            latency_ms,
            pool_size: 0,
            idle_connections: 0,
            error: None,
        }
    }

    pub fn unhealthy(error: impl Into<String>) -> Self {
        Self {
            healthy: false,
            latency_ms: 0,
            pool_size: 0,
            idle_connections: 0,
            error: Some(error.into()),
        }
    }
}

/// Fixed-width UTC timestamp so stored values compare correctly as text
pub(crate) fn timestamp(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}
