//! Derived environmental impact metrics.

use serde::{Deserialize, Serialize};

/// Impact tier of an annual footprint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImpactLevel {
    Low,
    Moderate,
    High,
}

impl ImpactLevel {
    /// Display color used by clients
    pub fn color(&self) -> &'static str {
        match self {
            Self::Low => "#22C55E",
            Self::Moderate => "#F59E0B",
            Self::High => "#EF4444",
        }
    }
}

impl std::fmt::Display for ImpactLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Low => "Low",
            Self::Moderate => "Moderate",
            Self::High => "High",
        };
        write!(f, "{}", s)
    }
}

/// Rank against the global per-capita average.
///
/// Emitting less than the average ranks "Above average".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GlobalRank {
    #[serde(rename = "Above average")]
    AboveAverage,
    #[serde(rename = "Below average")]
    BelowAverage,
}

impl std::fmt::Display for GlobalRank {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AboveAverage => write!(f, "Above average"),
            Self::BelowAverage => write!(f, "Below average"),
        }
    }
}

/// Secondary sustainability metrics computed from a footprint total
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImpactMetrics {
    /// Total in metric tons CO2e
    pub carbon_tons: f64,
    /// Multiple of the global per-capita average
    pub earths_needed: f64,
    /// Mature trees needed to absorb the total
    pub trees_needed: u64,
    pub hectares_needed: f64,
    /// 0 (worst) to 100 (best)
    pub sustainability_score: f64,
    pub impact_level: ImpactLevel,
    pub impact_color: String,
    /// Linear heuristic, not a physical model
    pub years_to_offset: f64,
    pub global_rank: GlobalRank,
}
