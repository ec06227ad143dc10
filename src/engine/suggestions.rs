//! Suggestion selection.
//!
//! Premium users get suggestions from the text generator when one is
//! available. Everyone else, and every generator failure, gets the static
//! themed list ranked by the footprint breakdown.

use std::time::Duration;

use tracing::{debug, info, warn};

use crate::models::{Category, FootprintResult, Region};
use crate::services::{suggestion_prompt, TextGenerator, WeatherSnapshot};

/// Most suggestions returned from the static list
pub const MAX_FALLBACK_SUGGESTIONS: usize = 7;
/// Most suggestions kept from a generator reply
pub const MAX_GENERATED_SUGGESTIONS: usize = 5;
/// Fewer usable generated lines than this triggers the fallback
pub const MIN_GENERATED_SUGGESTIONS: usize = 3;

const TRANSPORT_TIPS: &[&str] = &[
    "Consider using public transportation or carpooling for your daily commute",
    "Explore electric vehicle options for your next car purchase",
    "Try walking or cycling for short trips under 2 miles",
    "Plan your errands to minimize multiple trips",
    "Consider telecommuting options to reduce commute emissions",
];

const FOOD_TIPS: &[&str] = &[
    "Try incorporating more plant-based meals into your diet",
    "Support local farmers and reduce food transportation emissions",
    "Reduce food waste by planning meals and using leftovers",
    "Choose seasonal and organic produce when possible",
    "Consider growing your own herbs and vegetables",
];

const ENERGY_TIPS: &[&str] = &[
    "Switch to energy-efficient appliances and turn off unused electronics",
    "Consider installing solar panels or switching to renewable energy",
    "Use LED light bulbs and natural lighting when possible",
    "Adjust your thermostat to reduce heating and cooling costs",
    "Unplug chargers and devices when not in use",
];

const WASTE_TIPS: &[&str] = &[
    "Start composting organic waste and reduce single-use plastics",
    "Implement a zero-waste lifestyle with reusable containers",
    "Recycle paper, glass, and metal products properly",
    "Choose products with minimal packaging",
    "Repair items instead of replacing them when possible",
];

const GENERAL_TIPS: &[&str] = &[
    "Support businesses that prioritize sustainability and environmental responsibility",
    "Educate yourself and others about climate change and its local impacts",
    "Participate in local environmental initiatives and community clean-up events",
    "Consider carbon offset programs for unavoidable emissions from essential activities",
    "Track your progress and set monthly reduction goals to maintain motivation",
];

/// Themed tips for a category
pub fn tips_for(category: Category) -> &'static [&'static str] {
    match category {
        Category::Transport => TRANSPORT_TIPS,
        Category::Food => FOOD_TIPS,
        Category::Energy => ENERGY_TIPS,
        Category::Waste => WASTE_TIPS,
    }
}

/// Limits applied when delegating to a text generator
#[derive(Debug, Clone, Copy)]
pub struct SuggestionOptions {
    pub max_tokens: u32,
    pub timeout: Duration,
}

impl Default for SuggestionOptions {
    fn default() -> Self {
        Self {
            max_tokens: 250,
            timeout: Duration::from_secs(15),
        }
    }
}

/// Static suggestions for a footprint.
///
/// Themed lists for every contributing category come first, largest
/// contribution first, then the general list. Duplicates are dropped.
pub fn fallback(result: &FootprintResult) -> Vec<String> {
    let themed = result
        .contributing_categories()
        .into_iter()
        .flat_map(|category| tips_for(category).iter());

    let mut selected: Vec<String> = Vec::with_capacity(MAX_FALLBACK_SUGGESTIONS);
    for tip in themed.chain(GENERAL_TIPS.iter()) {
        if selected.len() == MAX_FALLBACK_SUGGESTIONS {
            break;
        }
        if !selected.iter().any(|s| s == tip) {
            selected.push((*tip).to_string());
        }
    }
    selected
}

/// Split a generator reply into usable suggestion lines
pub fn parse_generated(reply: &str) -> Vec<String> {
    reply
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Choose suggestions for a footprint. Never fails.
pub async fn select(
    result: &FootprintResult,
    region: &Region,
    weather: Option<&WeatherSnapshot>,
    is_premium: bool,
    generator: Option<&dyn TextGenerator>,
    options: SuggestionOptions,
) -> Vec<String> {
    let generator = match generator {
        Some(generator) if is_premium => generator,
        _ => {
            debug!(is_premium, "Using fallback suggestions");
            return fallback(result);
        }
    };

    let prompt = suggestion_prompt(result, region, weather);
    let reply = tokio::time::timeout(options.timeout, generator.complete(&prompt, options.max_tokens)).await;

    match reply {
        Ok(Ok(text)) => {
            let mut lines = parse_generated(&text);
            if lines.len() < MIN_GENERATED_SUGGESTIONS {
                warn!(lines = lines.len(), "Not enough generated suggestions, using fallback");
                return fallback(result);
            }
            lines.truncate(MAX_GENERATED_SUGGESTIONS);
            info!(count = lines.len(), "Generated suggestions");
            lines
        }
        Ok(Err(e)) => {
            warn!(error = %e, "Suggestion generator failed, using fallback");
            fallback(result)
        }
        Err(_) => {
            warn!(timeout_ms = options.timeout.as_millis() as u64, "Suggestion generator timed out, using fallback");
            fallback(result)
        }
    }
}
