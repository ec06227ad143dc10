//! Data models for the carbon tracker.
//!
//! This module contains the core data structures used throughout the
//! application: activity input, region classes, footprint results, impact
//! metrics and the records that get persisted.

mod activity;
mod footprint;
mod impact;
mod record;
mod region;

pub use activity::{ActivityRecord, EnergySource, FoodItem, TransportMode, WasteType};
pub use footprint::{Breakdown, Category, FootprintResult};
pub use impact::{GlobalRank, ImpactLevel, ImpactMetrics};
pub use record::{
    AnalyticsEvent, Calculation, CarbonGoal, DashboardStats, EventType, HistoryEntry,
    UserAccount,
};
pub use region::{classify, Region, RegionClass};
