//! Activity input models.
//!
//! Activity tags are closed enums with an explicit `Unrecognized` variant, so an
//! unknown tag from a client deserializes successfully and later contributes
//! zero instead of failing the request.

use serde::{Deserialize, Serialize};

/// Declares a string-tagged activity enum with an `Unrecognized` fallback.
macro_rules! activity_tag {
    (
        $(#[$meta:meta])*
        $name:ident { $($variant:ident => $tag:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(from = "String", into = "String")]
        pub enum $name {
            $($variant,)+
            /// A tag not present in the factor table
            Unrecognized(String),
        }

        impl $name {
            /// Every recognized variant, in table order
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// The wire tag for this variant
            pub fn as_str(&self) -> &str {
                match self {
                    $(Self::$variant => $tag,)+
                    Self::Unrecognized(tag) => tag,
                }
            }

            /// Whether this tag is known to the factor table
            pub fn is_recognized(&self) -> bool {
                !matches!(self, Self::Unrecognized(_))
            }
        }

        impl From<String> for $name {
            fn from(tag: String) -> Self {
                match tag.as_str() {
                    $($tag => Self::$variant,)+
                    _ => Self::Unrecognized(tag),
                }
            }
        }

        impl From<&str> for $name {
            fn from(tag: &str) -> Self {
                Self::from(tag.to_string())
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                match value {
                    $name::Unrecognized(tag) => tag,
                    other => other.as_str().to_string(),
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.as_str())
            }
        }
    };
}

activity_tag! {
    /// Mode of transport for the distance travelled
    TransportMode {
        Car => "car",
        Bus => "bus",
        Train => "train",
        Subway => "subway",
        Flight => "flight",
        Walking => "walking",
        Bicycle => "bicycle",
    }
}

activity_tag! {
    /// One serving of a food type
    FoodItem {
        Beef => "beef",
        Chicken => "chicken",
        Fish => "fish",
        Rice => "rice",
        Vegetables => "vegetables",
        Fruits => "fruits",
        Dairy => "dairy",
    }
}

activity_tag! {
    /// Household energy source
    EnergySource {
        Electricity => "electricity",
        NaturalGas => "natural_gas",
        HeatingOil => "heating_oil",
    }
}

activity_tag! {
    /// How waste is disposed of
    WasteType {
        Landfill => "landfill",
        Recycling => "recycling",
        Composting => "composting",
    }
}

/// A parsed, type-validated set of lifestyle activities.
///
/// Every field is optional. `None` means the category was not evaluated, which
/// is distinct from `Some(0.0)` even though both contribute nothing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActivityRecord {
    /// Transport mode
    #[serde(default)]
    pub transport_mode: Option<TransportMode>,
    /// Distance travelled, in km
    #[serde(default)]
    pub transport_distance: Option<f64>,
    /// One entry per serving; repeated tags count repeatedly
    #[serde(default)]
    pub food_choices: Vec<FoodItem>,
    /// Electricity consumed, in kWh
    #[serde(default)]
    pub energy_kwh: Option<f64>,
    /// Waste disposal route
    #[serde(default)]
    pub waste_type: Option<WasteType>,
    /// Waste produced, in kg
    #[serde(default)]
    pub waste_amount: Option<f64>,
}

impl ActivityRecord {
    /// Set transport mode and distance
    pub fn with_transport(mut self, mode: TransportMode, distance: f64) -> Self {
        self.transport_mode = Some(mode);
        self.transport_distance = Some(distance);
        self
    }

    /// Add one serving of a food
    pub fn with_food(mut self, food: FoodItem) -> Self {
        self.food_choices.push(food);
        self
    }

    /// Set electricity consumption
    pub fn with_energy(mut self, kwh: f64) -> Self {
        self.energy_kwh = Some(kwh);
        self
    }

    /// Set waste type and amount
    pub fn with_waste(mut self, waste_type: WasteType, amount: f64) -> Self {
        self.waste_type = Some(waste_type);
        self.waste_amount = Some(amount);
        self
    }

    /// Check whether nothing at all was provided
    pub fn is_empty(&self) -> bool {
        self.transport_mode.is_none()
            && self.transport_distance.is_none()
            && self.food_choices.is_empty()
            && self.energy_kwh.is_none()
            && self.waste_type.is_none()
            && self.waste_amount.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_tags_parse() {
        assert_eq!(TransportMode::from("car"), TransportMode::Car);
        assert_eq!(FoodItem::from("vegetables"), FoodItem::Vegetables);
        assert_eq!(EnergySource::from("natural_gas"), EnergySource::NaturalGas);
        assert_eq!(WasteType::from("composting"), WasteType::Composting);
    }

    #[test]
    fn test_unknown_tag_is_unrecognized() {
        let mode = TransportMode::from("hoverboard");
        assert_eq!(mode, TransportMode::Unrecognized("hoverboard".into()));
        assert!(!mode.is_recognized());
        assert_eq!(mode.as_str(), "hoverboard");
    }

    #[test]
    fn test_tags_are_case_sensitive() {
        assert!(!TransportMode::from("Car").is_recognized());
    }

    #[test]
    fn test_activity_record_deserialize() {
        let json = r#"{
            "transport_mode": "train",
            "transport_distance": 42.5,
            "food_choices": ["beef", "tofu", "beef"],
            "waste_type": "recycling"
        }"#;

        let record: ActivityRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.transport_mode, Some(TransportMode::Train));
        assert_eq!(record.transport_distance, Some(42.5));
        assert_eq!(record.food_choices.len(), 3);
        assert_eq!(record.food_choices[1], FoodItem::Unrecognized("tofu".into()));
        assert_eq!(record.waste_type, Some(WasteType::Recycling));
        assert!(record.waste_amount.is_none());
        assert!(record.energy_kwh.is_none());
    }

    #[test]
    fn test_tag_serializes_as_string() {
        let json = serde_json::to_string(&FoodItem::Dairy).unwrap();
        assert_eq!(json, "\"dairy\"");

        let json = serde_json::to_string(&WasteType::Unrecognized("ash".into())).unwrap();
        assert_eq!(json, "\"ash\"");
    }

    #[test]
    fn test_empty_record() {
        assert!(ActivityRecord::default().is_empty());
        assert!(!ActivityRecord::default().with_energy(0.0).is_empty());
    }
}
