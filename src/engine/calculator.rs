//! Footprint calculation.

use tracing::debug;

use super::FactorTable;
use crate::models::{ActivityRecord, Breakdown, EnergySource, FootprintResult, RegionClass};
use crate::{round_to, KG_CO2_PER_TREE_YEAR};

/// Decimal places kept on breakdown entries, total and trees_saved
pub const FOOTPRINT_PRECISION: i32 = 2;

/// Compute a footprint with the standard factor table
pub fn compute(activity: &ActivityRecord, region: RegionClass) -> FootprintResult {
    compute_with(FactorTable::standard(), activity, region)
}

/// Compute a footprint against an explicit factor table.
///
/// Each category is evaluated independently. A category whose inputs are
/// absent or whose tag is unrecognized contributes zero.
pub fn compute_with(
    table: &FactorTable,
    activity: &ActivityRecord,
    region: RegionClass,
) -> FootprintResult {
    let raw = Breakdown {
        transport: transport_emissions(table, activity, region),
        food: food_emissions(table, activity, region),
        energy: energy_emissions(table, activity, region),
        waste: waste_emissions(table, activity, region),
    };

    let breakdown = raw.map(|v| round_to(v, FOOTPRINT_PRECISION));
    let total = round_to(breakdown.sum(), FOOTPRINT_PRECISION);
    // Derived from the rounded total so the response is self-consistent
    let trees_saved = round_to(total / KG_CO2_PER_TREE_YEAR, FOOTPRINT_PRECISION);

    debug!(%region, total, "Computed footprint");

    FootprintResult {
        total,
        breakdown,
        trees_saved,
        region_category: region,
    }
}

fn transport_emissions(table: &FactorTable, activity: &ActivityRecord, region: RegionClass) -> f64 {
    match (&activity.transport_mode, activity.transport_distance) {
        (Some(mode), Some(distance)) => table
            .transport(mode, region)
            .map(|factor| distance * factor)
            .unwrap_or(0.0),
        _ => 0.0,
    }
}

fn food_emissions(table: &FactorTable, activity: &ActivityRecord, region: RegionClass) -> f64 {
    activity
        .food_choices
        .iter()
        .filter_map(|item| table.food(item, region))
        .fold(0.0, |acc, factor| acc + factor)
}

fn energy_emissions(table: &FactorTable, activity: &ActivityRecord, region: RegionClass) -> f64 {
    activity
        .energy_kwh
        .and_then(|kwh| {
            table
                .energy(&EnergySource::Electricity, region)
                .map(|factor| kwh * factor)
        })
        .unwrap_or(0.0)
}

fn waste_emissions(table: &FactorTable, activity: &ActivityRecord, region: RegionClass) -> f64 {
    match (&activity.waste_type, activity.waste_amount) {
        (Some(waste_type), Some(amount)) => table
            .waste(waste_type, region)
            .map(|factor| amount * factor)
            .unwrap_or(0.0),
        _ => 0.0,
    }
}
