//! Footprint results and per-category breakdown.

use serde::{Deserialize, Serialize};

use super::RegionClass;

/// Emission category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Transport,
    Food,
    Energy,
    Waste,
}

impl Category {
    /// All categories in canonical order
    pub fn all() -> [Self; 4] {
        [Self::Transport, Self::Food, Self::Energy, Self::Waste]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Transport => "transport",
            Self::Food => "food",
            Self::Energy => "energy",
            Self::Waste => "waste",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// kg CO2e per category. All four keys are always present.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Breakdown {
    pub transport: f64,
    pub food: f64,
    pub energy: f64,
    pub waste: f64,
}

impl Breakdown {
    pub fn get(&self, category: Category) -> f64 {
        match category {
            Category::Transport => self.transport,
            Category::Food => self.food,
            Category::Energy => self.energy,
            Category::Waste => self.waste,
        }
    }

    /// Whether every category holds a finite value
    pub fn is_finite(&self) -> bool {
        self.iter().all(|(_, value)| value.is_finite())
    }

    /// Sum of all categories
    pub fn sum(&self) -> f64 {
        self.transport + self.food + self.energy + self.waste
    }

    /// (category, value) pairs in canonical order
    pub fn iter(&self) -> impl Iterator<Item = (Category, f64)> + '_ {
        Category::all().into_iter().map(move |c| (c, self.get(c)))
    }

    /// Categories ordered by contribution, largest first.
    ///
    /// The sort is stable, so equal contributions keep canonical order.
    pub fn ranked(&self) -> Vec<(Category, f64)> {
        let mut ranked: Vec<(Category, f64)> = self.iter().collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
        ranked
    }

    /// Apply a function to every category
    pub fn map(&self, mut f: impl FnMut(f64) -> f64) -> Self {
        Self {
            transport: f(self.transport),
            food: f(self.food),
            energy: f(self.energy),
            waste: f(self.waste),
        }
    }
}

/// Outcome of a footprint calculation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FootprintResult {
    /// Total kg CO2e
    pub total: f64,
    /// Per-category kg CO2e
    pub breakdown: Breakdown,
    /// Tree-years of absorption equivalent to the total
    pub trees_saved: f64,
    /// Region class whose factors were used
    pub region_category: RegionClass,
}

impl FootprintResult {
    /// A zero result for a region
    pub fn zero(region_category: RegionClass) -> Self {
        Self {
            total: 0.0,
            breakdown: Breakdown::default(),
            trees_saved: 0.0,
            region_category,
        }
    }

    pub fn is_finite(&self) -> bool {
        self.total.is_finite() && self.trees_saved.is_finite() && self.breakdown.is_finite()
    }

    /// Categories with a nonzero contribution, largest first
    pub fn contributing_categories(&self) -> Vec<Category> {
        self.breakdown
            .ranked()
            .into_iter()
            .filter(|(_, value)| *value > 0.0)
            .map(|(category, _)| category)
            .collect()
    }
}

impl std::fmt::Display for FootprintResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:.2} kg CO2e ({}): transport {:.2}, food {:.2}, energy {:.2}, waste {:.2}",
            self.total,
            self.region_category,
            self.breakdown.transport,
            self.breakdown.food,
            self.breakdown.energy,
            self.breakdown.waste
        )
    }
}
