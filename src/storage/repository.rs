//! Repository trait defining the storage interface.

use async_trait::async_trait;
use uuid::Uuid;

use crate::models::{
    AnalyticsEvent, Calculation, CarbonGoal, DashboardStats, FootprintResult, HistoryEntry,
    UserAccount,
};
use crate::Result;

use super::HealthCheck;

/// Calculations returned by a history lookup
pub const HISTORY_LIMIT: usize = 10;

/// Main repository trait for data access.
///
/// Implementations can use different backends (SQLite, in-memory, etc).
#[async_trait]
pub trait Repository: Send + Sync {
    // =========================================================================
    // Calculation operations
    // =========================================================================

    /// Store a calculation
    async fn save_calculation(&self, calculation: &Calculation) -> Result<Uuid>;

    /// Most recent calculations for a user, newest first
    async fn recent_calculations(&self, user_id: &str, limit: usize) -> Result<Vec<Calculation>>;

    // =========================================================================
    // Analytics operations
    // =========================================================================

    /// Record an analytics event
    async fn track_event(&self, event: &AnalyticsEvent) -> Result<()>;

    /// Aggregate counters across all users
    async fn dashboard_stats(&self) -> Result<DashboardStats>;

    // =========================================================================
    // User operations
    // =========================================================================

    /// Get an account by ID
    async fn get_user(&self, user_id: &str) -> Result<Option<UserAccount>>;

    /// Whether a user has premium; unknown users do not
    async fn is_premium(&self, user_id: &str) -> Result<bool>;

    /// Set the premium flag, creating the account if needed
    async fn set_premium(&self, user_id: &str, premium: bool) -> Result<()>;

    // =========================================================================
    // Goal operations
    // =========================================================================

    /// Store a reduction goal
    async fn save_goal(&self, goal: &CarbonGoal) -> Result<Uuid>;

    /// Goals for a user, newest first
    async fn goals_for_user(&self, user_id: &str) -> Result<Vec<CarbonGoal>>;

    // =========================================================================
    // Database management
    // =========================================================================

    /// Initialize database schema
    async fn initialize(&self) -> Result<()>;

    /// Check database health
    async fn health_check(&self) -> HealthCheck;

    /// Close database connections
    async fn close(&self) -> Result<()>;
}

/// Extension trait for repository with utility methods
#[async_trait]
pub trait RepositoryExt: Repository {
    /// Snapshot and store a footprint result for a user
    async fn record_result(&self, user_id: &str, result: &FootprintResult) -> Result<Uuid> {
        let calculation = Calculation::from_result(user_id, result);
        self.save_calculation(&calculation).await
    }

    /// The user's last calculations in client shape
    async fn history(&self, user_id: &str) -> Result<Vec<HistoryEntry>> {
        let calculations = self.recent_calculations(user_id, HISTORY_LIMIT).await?;
        Ok(calculations.into_iter().map(HistoryEntry::from).collect())
    }
}

// Blanket implementation for all Repository implementations
impl<T: Repository + ?Sized> RepositoryExt for T {}

/// Mock repository for testing
#[cfg(test)]
pub mod mock {
    use super::*;
    use chrono::Utc;
    use std::collections::HashMap;
    use std::sync::RwLock;

    #[derive(Default)]
    pub struct MockRepository {
        calculations: RwLock<Vec<Calculation>>,
        events: RwLock<Vec<AnalyticsEvent>>,
        users: RwLock<HashMap<String, UserAccount>>,
        goals: RwLock<Vec<CarbonGoal>>,
    }

    impl MockRepository {
        pub fn new() -> Self {
            Self::default()
        }

        /// Events recorded so far
        pub fn events(&self) -> Vec<AnalyticsEvent> {
            self.events.read().unwrap().clone()
        }
    }

    #[async_trait]
    impl Repository for MockRepository {
        async fn save_calculation(&self, calculation: &Calculation) -> Result<Uuid> {
            calculation.ensure_finite()?;
            let mut calculations = self.calculations.write().unwrap();
            calculations.push(calculation.clone());
            Ok(calculation.id)
        }

        async fn recent_calculations(
            &self,
            user_id: &str,
            limit: usize,
        ) -> Result<Vec<Calculation>> {
            let calculations = self.calculations.read().unwrap();
            let mut mine: Vec<Calculation> = calculations
                .iter()
                .filter(|c| c.user_id == user_id)
                .cloned()
                .collect();
            mine.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            mine.truncate(limit);
            Ok(mine)
        }

        async fn track_event(&self, event: &AnalyticsEvent) -> Result<()> {
            self.events.write().unwrap().push(event.clone());
            Ok(())
        }

        async fn dashboard_stats(&self) -> Result<DashboardStats> {
            let calculations = self.calculations.read().unwrap();
            let users = self.users.read().unwrap();
            let week_ago = Utc::now() - chrono::Duration::days(7);

            Ok(DashboardStats::from_counts(
                calculations.len() as u64,
                calculations.iter().map(|c| c.total).sum(),
                users.values().filter(|u| u.premium).count() as u64,
                calculations.iter().filter(|c| c.created_at >= week_ago).count() as u64,
            ))
        }

        async fn get_user(&self, user_id: &str) -> Result<Option<UserAccount>> {
            Ok(self.users.read().unwrap().get(user_id).cloned())
        }

        async fn is_premium(&self, user_id: &str) -> Result<bool> {
            Ok(self
                .users
                .read()
                .unwrap()
                .get(user_id)
                .map_or(false, |u| u.premium))
        }

        async fn set_premium(&self, user_id: &str, premium: bool) -> Result<()> {
            let mut users = self.users.write().unwrap();
            users
                .entry(user_id.to_string())
                .or_insert_with(|| UserAccount {
                    id: user_id.to_string(),
                    email: None,
                    premium,
                    created_at: Utc::now(),
                })
                .premium = premium;
            Ok(())
        }

        async fn save_goal(&self, goal: &CarbonGoal) -> Result<Uuid> {
            self.goals.write().unwrap().push(goal.clone());
            Ok(goal.id)
        }

        async fn goals_for_user(&self, user_id: &str) -> Result<Vec<CarbonGoal>> {
            let goals = self.goals.read().unwrap();
            let mut mine: Vec<CarbonGoal> =
                goals.iter().filter(|g| g.user_id == user_id).cloned().collect();
            mine.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            Ok(mine)
        }

        async fn initialize(&self) -> Result<()> {
            Ok(())
        }

        async fn health_check(&self) -> HealthCheck {
            HealthCheck::healthy(0)
        }

        async fn close(&self) -> Result<()> {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::mock::MockRepository;
    use super::*;
    use crate::models::RegionClass;

    #[tokio::test]
    async fn test_history_is_limited_and_newest_first() {
        let repo = MockRepository::new();
        for i in 0..12 {
            let mut result = FootprintResult::zero(RegionClass::Global);
            result.total = i as f64;
            let mut calc = Calculation::from_result("alice", &result);
            calc.created_at = calc.created_at + chrono::Duration::seconds(i);
            repo.save_calculation(&calc).await.unwrap();
        }
        repo.record_result("bob", &FootprintResult::zero(RegionClass::Us))
            .await
            .unwrap();

        let history = repo.history("alice").await.unwrap();
        assert_eq!(history.len(), HISTORY_LIMIT);
        assert_eq!(history[0].total, 11.0);
        assert_eq!(history[9].total, 2.0);
    }

    #[tokio::test]
    async fn test_premium_upsert() {
        let repo = MockRepository::new();
        assert!(!repo.is_premium("carol").await.unwrap());

        repo.set_premium("carol", true).await.unwrap();
        assert!(repo.is_premium("carol").await.unwrap());

        repo.set_premium("carol", false).await.unwrap();
        assert!(!repo.is_premium("carol").await.unwrap());
        assert!(repo.get_user("carol").await.unwrap().is_some());
    }

    #[test]
    fn test_goals_are_scoped_to_user() {
        let repo = MockRepository::new();
        let deadline = chrono::NaiveDate::from_ymd_opt(2031, 3, 1).unwrap();

        tokio_test::block_on(async {
            repo.save_goal(&CarbonGoal::new("dana", 2000.0, 4500.0, deadline))
                .await
                .unwrap();
            repo.save_goal(&CarbonGoal::new("eli", 1000.0, 3000.0, deadline))
                .await
                .unwrap();

            let goals = repo.goals_for_user("dana").await.unwrap();
            assert_eq!(goals.len(), 1);
            assert_eq!(goals[0].target_carbon, 2000.0);
        });
    }
}
