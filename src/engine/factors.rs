//! Regional emission factor table.
//!
//! Units are kg CO2e per km (transport), per serving (food), per kWh (energy)
//! and per kg (waste). Every tag carries a `global` value; regional values
//! override it when present.

use crate::models::{Category, EnergySource, FoodItem, RegionClass, TransportMode, WasteType};

/// Emission factor for one activity tag across regions
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegionalFactor {
    pub global: f64,
    pub europe: Option<f64>,
    pub us: Option<f64>,
    pub asia: Option<f64>,
}

impl RegionalFactor {
    /// Factor with an override for every region
    pub const fn new(global: f64, europe: f64, us: f64, asia: f64) -> Self {
        Self {
            global,
            europe: Some(europe),
            us: Some(us),
            asia: Some(asia),
        }
    }

    /// Factor with no regional overrides
    pub const fn global_only(global: f64) -> Self {
        Self {
            global,
            europe: None,
            us: None,
            asia: None,
        }
    }

    /// Factor for a region, falling back to `global`
    pub fn for_region(&self, region: RegionClass) -> f64 {
        let regional = match region {
            RegionClass::Europe => self.europe,
            RegionClass::Us => self.us,
            RegionClass::Asia => self.asia,
            RegionClass::Global => None,
        };
        regional.unwrap_or(self.global)
    }
}

type FactorEntries = &'static [(&'static str, RegionalFactor)];

const TRANSPORT: FactorEntries = &[
    ("car", RegionalFactor::new(0.171, 0.142, 0.192, 0.156)),
    ("bus", RegionalFactor::new(0.089, 0.076, 0.105, 0.068)),
    ("train", RegionalFactor::new(0.041, 0.035, 0.058, 0.044)),
    ("subway", RegionalFactor::new(0.052, 0.045, 0.068, 0.055)),
    ("flight", RegionalFactor::new(0.255, 0.228, 0.275, 0.242)),
    ("walking", RegionalFactor::new(0.0, 0.0, 0.0, 0.0)),
    ("bicycle", RegionalFactor::new(0.0, 0.0, 0.0, 0.0)),
];

const FOOD: FactorEntries = &[
    ("beef", RegionalFactor::new(26.5, 24.8, 29.2, 21.5)),
    ("chicken", RegionalFactor::new(6.8, 6.4, 7.3, 5.9)),
    ("fish", RegionalFactor::new(6.0, 5.7, 6.4, 5.4)),
    ("rice", RegionalFactor::new(2.6, 2.4, 2.9, 2.1)),
    ("vegetables", RegionalFactor::new(0.48, 0.42, 0.58, 0.35)),
    ("fruits", RegionalFactor::new(0.42, 0.38, 0.52, 0.28)),
    ("dairy", RegionalFactor::new(2.3, 2.1, 2.6, 1.9)),
];

// Only `electricity` is consulted by the calculator. The gas and oil rows are
// reference data with no input field that reaches them.
const ENERGY: FactorEntries = &[
    ("electricity", RegionalFactor::new(0.485, 0.312, 0.685, 0.584)),
    ("natural_gas", RegionalFactor::new(2.1, 1.9, 2.3, 2.0)),
    ("heating_oil", RegionalFactor::new(2.8, 2.6, 3.0, 2.7)),
];

const WASTE: FactorEntries = &[
    ("landfill", RegionalFactor::new(0.72, 0.64, 0.82, 0.58)),
    ("recycling", RegionalFactor::new(0.16, 0.13, 0.19, 0.11)),
    ("composting", RegionalFactor::new(0.11, 0.09, 0.13, 0.08)),
];

static STANDARD: FactorTable = FactorTable {
    transport: TRANSPORT,
    food: FOOD,
    energy: ENERGY,
    waste: WASTE,
};

/// Immutable emission factor lookup keyed by category, tag and region
#[derive(Debug, Clone, Copy)]
pub struct FactorTable {
    transport: FactorEntries,
    food: FactorEntries,
    energy: FactorEntries,
    waste: FactorEntries,
}

impl FactorTable {
    /// The authoritative reference table
    pub fn standard() -> &'static FactorTable {
        &STANDARD
    }

    fn entries(&self, category: Category) -> FactorEntries {
        match category {
            Category::Transport => self.transport,
            Category::Food => self.food,
            Category::Energy => self.energy,
            Category::Waste => self.waste,
        }
    }

    /// Raw entry for a tag, if the table defines it
    pub fn entry(&self, category: Category, tag: &str) -> Option<&RegionalFactor> {
        self.entries(category)
            .iter()
            .find(|(name, _)| *name == tag)
            .map(|(_, factor)| factor)
    }

    /// Factor for a tag in a region; `None` for tags the table does not define
    pub fn lookup(&self, category: Category, tag: &str, region: RegionClass) -> Option<f64> {
        self.entry(category, tag).map(|f| f.for_region(region))
    }

    /// Tags defined for a category, in table order
    pub fn tags(&self, category: Category) -> impl Iterator<Item = &'static str> {
        self.entries(category).iter().map(|(name, _)| *name)
    }

    pub fn transport(&self, mode: &TransportMode, region: RegionClass) -> Option<f64> {
        self.typed_lookup(Category::Transport, mode.is_recognized(), mode.as_str(), region)
    }

    pub fn food(&self, item: &FoodItem, region: RegionClass) -> Option<f64> {
        self.typed_lookup(Category::Food, item.is_recognized(), item.as_str(), region)
    }

    pub fn energy(&self, source: &EnergySource, region: RegionClass) -> Option<f64> {
        self.typed_lookup(Category::Energy, source.is_recognized(), source.as_str(), region)
    }

    pub fn waste(&self, waste_type: &WasteType, region: RegionClass) -> Option<f64> {
        self.typed_lookup(Category::Waste, waste_type.is_recognized(), waste_type.as_str(), region)
    }

    fn typed_lookup(
        &self,
        category: Category,
        recognized: bool,
        tag: &str,
        region: RegionClass,
    ) -> Option<f64> {
        if !recognized {
            return None;
        }
        self.lookup(category, tag, region)
    }
}
