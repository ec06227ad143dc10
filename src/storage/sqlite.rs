//! SQLite implementation of the Repository trait.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{sqlite::SqlitePoolOptions, Pool, Row, Sqlite};
use std::time::{Duration, Instant};
use tracing::{debug, error, info, instrument};
use uuid::Uuid;

use crate::models::{
    AnalyticsEvent, Breakdown, Calculation, CarbonGoal, DashboardStats, UserAccount,
};
use crate::{CarbonTrackerError, Result};

use super::{timestamp, HealthCheck, PoolConfig, Repository};

const DEADLINE_FORMAT: &str = "%Y-%m-%d";

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id TEXT PRIMARY KEY,
        email TEXT UNIQUE,
        premium INTEGER NOT NULL DEFAULT 0,
        created_at TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS calculations (
        id TEXT PRIMARY KEY,
        user_id TEXT NOT NULL,
        carbon_total REAL NOT NULL,
        breakdown TEXT NOT NULL,
        created_at TEXT NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_calculations_user ON calculations(user_id, created_at)",
    r#"
    CREATE TABLE IF NOT EXISTS analytics (
        id TEXT PRIMARY KEY,
        event_type TEXT NOT NULL,
        user_id TEXT,
        data TEXT,
        created_at TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS goals (
        id TEXT PRIMARY KEY,
        user_id TEXT NOT NULL,
        target_carbon REAL NOT NULL,
        current_carbon REAL NOT NULL,
        deadline TEXT NOT NULL,
        created_at TEXT NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_goals_user ON goals(user_id)",
];

/// SQLite-backed repository implementation
pub struct SqliteRepository {
    pool: Pool<Sqlite>,
    db_path: String,
}

impl SqliteRepository {
    /// Create a new SQLite repository
    #[instrument(skip_all)]
    pub async fn new(db_path: &str) -> Result<Self> {
        Self::with_config(db_path, PoolConfig::default()).await
    }

    /// Create with custom pool configuration
    pub async fn with_config(db_path: &str, config: PoolConfig) -> Result<Self> {
        info!("Connecting to SQLite database: {}", db_path);

        let pool = if db_path == ":memory:" {
            // Every connection to :memory: is a separate database
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
                .connect("sqlite::memory:")
                .await?
        } else {
            SqlitePoolOptions::new()
                .max_connections(config.max_connections)
                .min_connections(config.min_connections)
                .acquire_timeout(Duration::from_secs(config.connect_timeout_secs))
                .idle_timeout(Duration::from_secs(config.idle_timeout_secs))
                .connect(&format!("sqlite:{}?mode=rwc", db_path))
                .await?
        };

        let repo = Self {
            pool,
            db_path: db_path.to_string(),
        };

        repo.initialize().await?;

        Ok(repo)
    }

    /// Get a reference to the connection pool
    pub fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }

    /// Path this repository was opened with
    pub fn db_path(&self) -> &str {
        &self.db_path
    }
}

#[async_trait]
impl Repository for SqliteRepository {
    // =========================================================================
    // Calculation operations
    // =========================================================================

    #[instrument(skip(self, calculation), fields(user = %calculation.user_id))]
    async fn save_calculation(&self, calculation: &Calculation) -> Result<Uuid> {
        calculation.ensure_finite()?;
        let breakdown = serde_json::to_string(&calculation.breakdown)?;

        sqlx::query(
            r#"
            INSERT INTO calculations (id, user_id, carbon_total, breakdown, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(calculation.id.to_string())
        .bind(&calculation.user_id)
        .bind(calculation.total)
        .bind(&breakdown)
        .bind(timestamp(&calculation.created_at))
        .execute(&self.pool)
        .await?;

        debug!("Saved calculation {}", calculation.id);
        Ok(calculation.id)
    }

    #[instrument(skip(self))]
    async fn recent_calculations(&self, user_id: &str, limit: usize) -> Result<Vec<Calculation>> {
        let rows = sqlx::query(
            r#"
            SELECT id, user_id, carbon_total, breakdown, created_at
            FROM calculations
            WHERE user_id = ?1
            ORDER BY created_at DESC, rowid DESC
            LIMIT ?2
            "#,
        )
        .bind(user_id)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_calculation).collect()
    }

    // =========================================================================
    // Analytics operations
    // =========================================================================

    #[instrument(skip(self, event), fields(event_type = event.event_type.as_str()))]
    async fn track_event(&self, event: &AnalyticsEvent) -> Result<()> {
        let data = event.data.as_ref().map(serde_json::to_string).transpose()?;

        sqlx::query(
            r#"
            INSERT INTO analytics (id, event_type, user_id, data, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(event.id.to_string())
        .bind(event.event_type.as_str())
        .bind(&event.user_id)
        .bind(&data)
        .bind(timestamp(&event.created_at))
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn dashboard_stats(&self) -> Result<DashboardStats> {
        let week_ago = timestamp(&(Utc::now() - chrono::Duration::days(7)));

        let totals = sqlx::query(
            "SELECT COUNT(*) AS count, COALESCE(SUM(carbon_total), 0.0) AS carbon FROM calculations",
        )
        .fetch_one(&self.pool)
        .await?;

        let premium: i64 = sqlx::query("SELECT COUNT(*) AS count FROM users WHERE premium = 1")
            .fetch_one(&self.pool)
            .await?
            .get("count");

        let weekly: i64 =
            sqlx::query("SELECT COUNT(*) AS count FROM calculations WHERE created_at >= ?1")
                .bind(&week_ago)
                .fetch_one(&self.pool)
                .await?
                .get("count");

        Ok(DashboardStats::from_counts(
            totals.get::<i64, _>("count") as u64,
            totals.get::<f64, _>("carbon"),
            premium as u64,
            weekly as u64,
        ))
    }

    // =========================================================================
    // User operations
    // =========================================================================

    #[instrument(skip(self))]
    async fn get_user(&self, user_id: &str) -> Result<Option<UserAccount>> {
        let row = sqlx::query("SELECT id, email, premium, created_at FROM users WHERE id = ?1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(row_to_user).transpose()
    }

    async fn is_premium(&self, user_id: &str) -> Result<bool> {
        let premium: Option<i64> = sqlx::query("SELECT premium FROM users WHERE id = ?1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?
            .map(|row| row.get("premium"));

        Ok(premium.unwrap_or(0) != 0)
    }

    #[instrument(skip(self))]
    async fn set_premium(&self, user_id: &str, premium: bool) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO users (id, email, premium, created_at)
            VALUES (?1, NULL, ?2, ?3)
            ON CONFLICT(id) DO UPDATE SET premium = excluded.premium
            "#,
        )
        .bind(user_id)
        .bind(premium as i64)
        .bind(timestamp(&Utc::now()))
        .execute(&self.pool)
        .await?;

        info!("User {} premium = {}", user_id, premium);
        Ok(())
    }

    // =========================================================================
    // Goal operations
    // =========================================================================

    #[instrument(skip(self, goal), fields(user = %goal.user_id))]
    async fn save_goal(&self, goal: &CarbonGoal) -> Result<Uuid> {
        sqlx::query(
            r#"
            INSERT INTO goals (id, user_id, target_carbon, current_carbon, deadline, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(goal.id.to_string())
        .bind(&goal.user_id)
        .bind(goal.target_carbon)
        .bind(goal.current_carbon)
        .bind(goal.deadline.format(DEADLINE_FORMAT).to_string())
        .bind(timestamp(&goal.created_at))
        .execute(&self.pool)
        .await?;

        Ok(goal.id)
    }

    #[instrument(skip(self))]
    async fn goals_for_user(&self, user_id: &str) -> Result<Vec<CarbonGoal>> {
        let rows = sqlx::query(
            r#"
            SELECT id, user_id, target_carbon, current_carbon, deadline, created_at
            FROM goals
            WHERE user_id = ?1
            ORDER BY created_at DESC, rowid DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_goal).collect()
    }

    // =========================================================================
    // Database management
    // =========================================================================

    async fn initialize(&self) -> Result<()> {
        info!("Initializing database schema...");

        for statement in SCHEMA {
            sqlx::query(statement).execute(&self.pool).await?;
        }

        info!("Database schema initialized successfully");
        Ok(())
    }

    async fn health_check(&self) -> HealthCheck {
        let start = Instant::now();

        match sqlx::query("SELECT 1").fetch_one(&self.pool).await {
            Ok(_) => {
                let latency = start.elapsed().as_millis() as u64;
                let mut check = HealthCheck::healthy(latency);
                check.pool_size = self.pool.size();
                check.idle_connections = self.pool.num_idle() as u32;
                check
            }
            Err(e) => {
                error!("Health check failed: {}", e);
                HealthCheck::unhealthy(e.to_string())
            }
        }
    }

    async fn close(&self) -> Result<()> {
        self.pool.close().await;
        Ok(())
    }
}

// Helper functions to convert rows to models

fn parse_id(row: &sqlx::sqlite::SqliteRow) -> Result<Uuid> {
    let id_str: String = row.get("id");
    Uuid::parse_str(&id_str)
        .map_err(|_| CarbonTrackerError::InvalidInput(format!("Invalid UUID: {}", id_str)))
}

fn parse_timestamp(row: &sqlx::sqlite::SqliteRow, column: &str) -> Result<DateTime<Utc>> {
    let raw: String = row.get(column);
    DateTime::parse_from_rfc3339(&raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| CarbonTrackerError::InvalidInput(format!("Invalid timestamp: {}", raw)))
}

fn row_to_calculation(row: &sqlx::sqlite::SqliteRow) -> Result<Calculation> {
    let breakdown_json: String = row.get("breakdown");
    let breakdown: Breakdown = serde_json::from_str(&breakdown_json)?;

    Ok(Calculation {
        id: parse_id(row)?,
        user_id: row.get("user_id"),
        total: row.get("carbon_total"),
        breakdown,
        created_at: parse_timestamp(row, "created_at")?,
    })
}

fn row_to_user(row: &sqlx::sqlite::SqliteRow) -> Result<UserAccount> {
    Ok(UserAccount {
        id: row.get("id"),
        email: row.get("email"),
        premium: row.get::<i64, _>("premium") != 0,
        created_at: parse_timestamp(row, "created_at")?,
    })
}

fn row_to_goal(row: &sqlx::sqlite::SqliteRow) -> Result<CarbonGoal> {
    let deadline_str: String = row.get("deadline");
    let deadline = NaiveDate::parse_from_str(&deadline_str, DEADLINE_FORMAT)
        .map_err(|_| CarbonTrackerError::InvalidInput(format!("Invalid date: {}", deadline_str)))?;

    Ok(CarbonGoal {
        id: parse_id(row)?,
        user_id: row.get("user_id"),
        target_carbon: row.get("target_carbon"),
        current_carbon: row.get("current_carbon"),
        deadline,
        created_at: parse_timestamp(row, "created_at")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EventType, FootprintResult, RegionClass};
    use crate::storage::RepositoryExt;
    use serde_json::json;

    async fn memory_repo() -> SqliteRepository {
        SqliteRepository::new(":memory:").await.unwrap()
    }

    fn result_with_total(total: f64) -> FootprintResult {
        let mut result = FootprintResult::zero(RegionClass::Europe);
        result.total = total;
        result.breakdown.transport = total;
        result
    }

    #[tokio::test]
    async fn test_calculation_roundtrip_and_order() {
        let repo = memory_repo().await;

        let mut older = Calculation::from_result("alice", &result_with_total(10.0));
        older.created_at = Utc::now() - chrono::Duration::days(30);
        repo.save_calculation(&older).await.unwrap();
        repo.record_result("alice", &result_with_total(20.5)).await.unwrap();
        repo.record_result("bob", &result_with_total(99.0)).await.unwrap();

        let recent = repo.recent_calculations("alice", 10).await.unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].total, 20.5);
        assert_eq!(recent[0].breakdown.transport, 20.5);
        assert_eq!(recent[1].id, older.id);

        let limited = repo.recent_calculations("alice", 1).await.unwrap();
        assert_eq!(limited.len(), 1);
    }

    #[tokio::test]
    async fn test_dashboard_stats() {
        let repo = memory_repo().await;

        let mut old = Calculation::from_result("alice", &result_with_total(100.0));
        old.created_at = Utc::now() - chrono::Duration::days(8);
        repo.save_calculation(&old).await.unwrap();
        repo.record_result("alice", &result_with_total(10.0)).await.unwrap();
        repo.set_premium("alice", true).await.unwrap();
        repo.set_premium("bob", false).await.unwrap();

        let stats = repo.dashboard_stats().await.unwrap();
        assert_eq!(stats.total_calculations, 2);
        assert_eq!(stats.total_carbon_kg, 110.0);
        assert_eq!(stats.premium_users, 1);
        assert_eq!(stats.trees_equivalent, 5.0);
        assert_eq!(stats.weekly_calculations, 1);
    }

    #[tokio::test]
    async fn test_non_finite_result_is_not_stored() {
        let repo = memory_repo().await;
        repo.record_result("zed", &result_with_total(3.0)).await.unwrap();

        let err = repo
            .record_result("zed", &result_with_total(f64::INFINITY))
            .await
            .unwrap_err();
        assert!(matches!(err, CarbonTrackerError::InvalidInput(_)));

        let history = repo.history("zed").await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].total, 3.0);
        assert_eq!(repo.dashboard_stats().await.unwrap().total_carbon_kg, 3.0);
    }

    #[tokio::test]
    async fn test_empty_dashboard() {
        let repo = memory_repo().await;
        let stats = repo.dashboard_stats().await.unwrap();
        assert_eq!(stats, DashboardStats::default());
    }

    #[tokio::test]
    async fn test_premium_upsert() {
        let repo = memory_repo().await;
        assert!(!repo.is_premium("carol").await.unwrap());
        assert!(repo.get_user("carol").await.unwrap().is_none());

        repo.set_premium("carol", true).await.unwrap();
        repo.set_premium("carol", true).await.unwrap();
        assert!(repo.is_premium("carol").await.unwrap());

        let user = repo.get_user("carol").await.unwrap().unwrap();
        assert!(user.premium);
        assert!(user.email.is_none());
    }

    #[tokio::test]
    async fn test_goals_roundtrip() {
        let repo = memory_repo().await;
        let deadline = NaiveDate::from_ymd_opt(2030, 12, 31).unwrap();
        let goal = CarbonGoal::new("dave", 1500.0, 4200.0, deadline);
        repo.save_goal(&goal).await.unwrap();

        let goals = repo.goals_for_user("dave").await.unwrap();
        assert_eq!(goals.len(), 1);
        assert_eq!(goals[0].deadline, deadline);
        assert_eq!(goals[0].target_carbon, 1500.0);
        assert!(repo.goals_for_user("erin").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_track_event_with_and_without_data() {
        let repo = memory_repo().await;
        repo.track_event(&AnalyticsEvent::new(EventType::Calculation, None))
            .await
            .unwrap();
        repo.track_event(
            &AnalyticsEvent::new(EventType::EcobotChat, Some("frank".into()))
                .with_data(json!({"response_length": 42})),
        )
        .await
        .unwrap();

        let count: i64 = sqlx::query("SELECT COUNT(*) AS count FROM analytics")
            .fetch_one(repo.pool())
            .await
            .unwrap()
            .get("count");
        assert_eq!(count, 2);
    }

    #[tokio::test]
    async fn test_file_database_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("carbon.db");
        let path = path.to_str().unwrap();

        {
            let repo = SqliteRepository::new(path).await.unwrap();
            repo.record_result("gina", &result_with_total(5.0)).await.unwrap();
            repo.close().await.unwrap();
        }

        let reopened = SqliteRepository::new(path).await.unwrap();
        assert_eq!(reopened.history("gina").await.unwrap().len(), 1);
        assert!(reopened.health_check().await.healthy);
    }
}
