//! Environmental impact derivation.

use crate::models::{GlobalRank, ImpactLevel, ImpactMetrics};
use crate::round_to;

/// Global per-capita emissions, metric tons CO2e per year
pub const GLOBAL_AVERAGE_TONS_PER_PERSON: f64 = 4.7;
/// Mature trees needed to absorb one ton per year
pub const TREES_PER_TON: f64 = 48.0;
pub const CARBON_TO_HECTARES_FACTOR: f64 = 0.42;
/// Score points lost per multiple of the global average
pub const SCORE_PENALTY_FACTOR: f64 = 45.0;
/// Below this many tons the impact is Low
pub const LOW_THRESHOLD_TONS: f64 = 1.8;
/// At or above this many tons the impact is High
pub const HIGH_THRESHOLD_TONS: f64 = 4.2;
pub const OFFSET_YEARS_FACTOR: f64 = 1.8;

/// Derive impact metrics from a total in kg CO2e.
///
/// Returns `None` for totals that are zero, negative or NaN.
pub fn derive(total_kg: f64) -> Option<ImpactMetrics> {
    if !(total_kg > 0.0) {
        return None;
    }

    let tons = total_kg / 1000.0;
    let ratio = tons / GLOBAL_AVERAGE_TONS_PER_PERSON;

    let impact_level = if tons < LOW_THRESHOLD_TONS {
        ImpactLevel::Low
    } else if tons < HIGH_THRESHOLD_TONS {
        ImpactLevel::Moderate
    } else {
        ImpactLevel::High
    };

    // Lower emissions rank "Above average"
    let global_rank = if tons < GLOBAL_AVERAGE_TONS_PER_PERSON {
        GlobalRank::AboveAverage
    } else {
        GlobalRank::BelowAverage
    };

    Some(ImpactMetrics {
        carbon_tons: round_to(tons, 3),
        earths_needed: round_to(ratio, 3),
        trees_needed: (tons * TREES_PER_TON).trunc() as u64,
        hectares_needed: round_to(tons * CARBON_TO_HECTARES_FACTOR, 3),
        sustainability_score: round_to((100.0 - ratio * SCORE_PENALTY_FACTOR).clamp(0.0, 100.0), 1),
        impact_color: impact_level.color().to_string(),
        impact_level,
        years_to_offset: round_to(tons * OFFSET_YEARS_FACTOR, 1),
        global_rank,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_non_positive_totals_have_no_metrics() {
        assert!(derive(0.0).is_none());
        assert!(derive(-12.0).is_none());
        assert!(derive(f64::NAN).is_none());
    }

    #[test]
    fn test_global_average_total() {
        let metrics = derive(4700.0).unwrap();
        assert_relative_eq!(metrics.carbon_tons, 4.7);
        assert_relative_eq!(metrics.earths_needed, 1.0);
        assert_eq!(metrics.impact_level, ImpactLevel::High);
        assert_eq!(metrics.impact_color, "#EF4444");
        assert_eq!(metrics.global_rank, GlobalRank::BelowAverage);
        assert_eq!(metrics.trees_needed, 225);
        assert_relative_eq!(metrics.sustainability_score, 55.0);
    }

    #[test]
    fn test_low_footprint() {
        let metrics = derive(17.1).unwrap();
        assert_eq!(metrics.impact_level, ImpactLevel::Low);
        assert_eq!(metrics.global_rank, GlobalRank::AboveAverage);
        assert_eq!(metrics.trees_needed, 0);
        assert_relative_eq!(metrics.carbon_tons, 0.017);
        assert_relative_eq!(metrics.sustainability_score, 99.8);
    }

    #[test]
    fn test_moderate_band() {
        assert_eq!(derive(1800.0).unwrap().impact_level, ImpactLevel::Moderate);
        assert_eq!(derive(4199.0).unwrap().impact_level, ImpactLevel::Moderate);
        assert_eq!(derive(4200.0).unwrap().impact_level, ImpactLevel::High);
    }

    #[test]
    fn test_score_is_clamped() {
        for total in [1.0, 500.0, 10_000.0, 50_000.0, 1e9] {
            let score = derive(total).unwrap().sustainability_score;
            assert!((0.0..=100.0).contains(&score), "{total} -> {score}");
        }
        assert_eq!(derive(50_000.0).unwrap().sustainability_score, 0.0);
    }

    #[test]
    fn test_trees_are_truncated() {
        // 1.99 t * 48 = 95.52
        assert_eq!(derive(1990.0).unwrap().trees_needed, 95);
    }
}
