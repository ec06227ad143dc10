//! Persisted records: calculations, analytics events, goals and accounts.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Breakdown, FootprintResult};
use crate::{round_to, CarbonTrackerError, Result, KG_CO2_PER_TREE_YEAR};

/// A stored footprint calculation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Calculation {
    pub id: Uuid,
    pub user_id: String,
    pub total: f64,
    pub breakdown: Breakdown,
    pub created_at: DateTime<Utc>,
}

impl Calculation {
    /// Snapshot a footprint result for a user
    pub fn from_result(user_id: impl Into<String>, result: &FootprintResult) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id: user_id.into(),
            total: result.total,
            breakdown: result.breakdown,
            created_at: Utc::now(),
        }
    }

    /// Fail unless every stored figure is finite
    pub fn ensure_finite(&self) -> Result<()> {
        if self.total.is_finite() && self.breakdown.is_finite() {
            Ok(())
        } else {
            Err(CarbonTrackerError::InvalidInput(format!(
                "Calculation {} has a non-finite footprint",
                self.id
            )))
        }
    }
}

/// History row as returned to clients
#[derive(Debug, Clone, Serialize)]
pub struct HistoryEntry {
    pub total: f64,
    pub breakdown: Breakdown,
    pub date: DateTime<Utc>,
}

impl From<Calculation> for HistoryEntry {
    fn from(calc: Calculation) -> Self {
        Self {
            total: calc.total,
            breakdown: calc.breakdown,
            date: calc.created_at,
        }
    }
}

/// Kind of tracked analytics event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    Calculation,
    EcobotChat,
    PremiumUpgrade,
}

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Calculation => "calculation",
            Self::EcobotChat => "ecobot_chat",
            Self::PremiumUpgrade => "premium_upgrade",
        }
    }
}

/// An analytics event with optional JSON payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticsEvent {
    pub id: Uuid,
    pub event_type: EventType,
    pub user_id: Option<String>,
    pub data: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
}

impl AnalyticsEvent {
    pub fn new(event_type: EventType, user_id: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            event_type,
            user_id,
            data: None,
            created_at: Utc::now(),
        }
    }

    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = Some(data);
        self
    }
}

/// A user's carbon reduction goal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CarbonGoal {
    pub id: Uuid,
    pub user_id: String,
    /// Target kg CO2e
    pub target_carbon: f64,
    /// Footprint at the time the goal was set
    pub current_carbon: f64,
    pub deadline: NaiveDate,
    pub created_at: DateTime<Utc>,
}

impl CarbonGoal {
    pub fn new(
        user_id: impl Into<String>,
        target_carbon: f64,
        current_carbon: f64,
        deadline: NaiveDate,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id: user_id.into(),
            target_carbon,
            current_carbon,
            deadline,
            created_at: Utc::now(),
        }
    }
}

/// Minimal account record; only the premium flag matters to the engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserAccount {
    pub id: String,
    pub email: Option<String>,
    pub premium: bool,
    pub created_at: DateTime<Utc>,
}

/// Aggregate counters for the analytics dashboard
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardStats {
    pub total_calculations: u64,
    pub total_carbon_kg: f64,
    pub premium_users: u64,
    pub trees_equivalent: f64,
    pub weekly_calculations: u64,
}

impl DashboardStats {
    /// Build stats from raw counters, applying display rounding
    pub fn from_counts(
        total_calculations: u64,
        total_carbon_kg: f64,
        premium_users: u64,
        weekly_calculations: u64,
    ) -> Self {
        Self {
            total_calculations,
            total_carbon_kg: round_to(total_carbon_kg, 2),
            premium_users,
            trees_equivalent: round_to(total_carbon_kg / KG_CO2_PER_TREE_YEAR, 1),
            weekly_calculations,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RegionClass;

    #[test]
    fn test_calculation_from_result() {
        let mut result = FootprintResult::zero(RegionClass::Europe);
        result.total = 12.5;
        result.breakdown.food = 12.5;

        let calc = Calculation::from_result("user-1", &result);
        assert_eq!(calc.user_id, "user-1");
        assert_eq!(calc.total, 12.5);
        assert_eq!(calc.breakdown.food, 12.5);

        let entry = HistoryEntry::from(calc.clone());
        assert_eq!(entry.date, calc.created_at);
    }

    #[test]
    fn test_dashboard_rounding() {
        let stats = DashboardStats::from_counts(3, 100.456, 1, 2);
        assert_eq!(stats.total_carbon_kg, 100.46);
        assert_eq!(stats.trees_equivalent, 4.6);
    }

    #[test]
    fn test_event_type_tags() {
        assert_eq!(EventType::EcobotChat.as_str(), "ecobot_chat");
        assert_eq!(
            serde_json::to_string(&EventType::PremiumUpgrade).unwrap(),
            "\"premium_upgrade\""
        );
    }
}
