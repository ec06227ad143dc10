//! Region classification.

use serde::{Deserialize, Serialize};

const EUROPE_COUNTRIES: [&str; 10] = [
    "Germany",
    "France",
    "UK",
    "Italy",
    "Spain",
    "Netherlands",
    "Switzerland",
    "Sweden",
    "Norway",
    "Denmark",
];

const US_COUNTRIES: [&str; 3] = ["United States", "USA", "Canada"];

const ASIA_COUNTRIES: [&str; 8] = [
    "China",
    "Japan",
    "India",
    "South Korea",
    "Singapore",
    "Thailand",
    "Vietnam",
    "Indonesia",
];

/// Region class used to select emission factors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RegionClass {
    Europe,
    Us,
    Asia,
    #[default]
    Global,
}

impl RegionClass {
    /// All region classes
    pub fn all() -> [Self; 4] {
        [Self::Europe, Self::Us, Self::Asia, Self::Global]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Europe => "europe",
            Self::Us => "us",
            Self::Asia => "asia",
            Self::Global => "global",
        }
    }
}

impl std::fmt::Display for RegionClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Map a country name to its region class.
///
/// Matching is exact and case-sensitive; anything not listed is `Global`.
pub fn classify(country: &str) -> RegionClass {
    if EUROPE_COUNTRIES.contains(&country) {
        RegionClass::Europe
    } else if US_COUNTRIES.contains(&country) {
        RegionClass::Us
    } else if ASIA_COUNTRIES.contains(&country) {
        RegionClass::Asia
    } else {
        RegionClass::Global
    }
}

/// Location descriptor returned to clients and used for weather lookups
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Region {
    pub country: String,
    pub city: String,
    pub region: String,
}

impl Default for Region {
    fn default() -> Self {
        Self {
            country: "Global".into(),
            city: "Unknown".into(),
            region: "Unknown".into(),
        }
    }
}

impl Region {
    pub fn new(country: impl Into<String>, city: impl Into<String>) -> Self {
        Self {
            country: country.into(),
            city: city.into(),
            region: "Unknown".into(),
        }
    }

    /// Region class for this location's country
    pub fn class(&self) -> RegionClass {
        classify(&self.country)
    }

    /// Whether the city is known well enough for a weather lookup
    pub fn has_city(&self) -> bool {
        !self.city.is_empty() && self.city != "Unknown"
    }
}
