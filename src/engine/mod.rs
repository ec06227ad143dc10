//! Footprint engine: factor table, calculator, impact deriver and suggestion
//! selector.
//!
//! Everything here except [`suggestions::select`] is pure and synchronous.

pub mod calculator;
pub mod factors;
pub mod impact;
pub mod suggestions;

pub use calculator::{compute, compute_with};
pub use factors::{FactorTable, RegionalFactor};
pub use impact::derive;
pub use suggestions::{fallback, select, SuggestionOptions};
