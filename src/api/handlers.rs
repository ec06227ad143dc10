//! HTTP request handlers.

use axum::{extract::Extension, http::HeaderMap, Json};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

use crate::engine::{self, SuggestionOptions};
use crate::models::{
    ActivityRecord, AnalyticsEvent, CarbonGoal, EventType, FoodItem, Region, TransportMode,
    WasteType,
};
use crate::services::{chat_prompt, WeatherSnapshot};
use crate::storage::RepositoryExt;
use crate::utils::{
    parse_date, parse_optional_quantity, require_quantity, require_text, validate_chat_message,
    validate_user_id, NumericInput,
};
use crate::{CarbonTrackerError, Result};

use super::middleware::USER_ID_HEADER;
use super::responses::*;
use super::AppState;

// =============================================================================
// Shared helpers
// =============================================================================

/// Caller identity from the `X-User-Id` header, if any
fn user_id(headers: &HeaderMap) -> Result<Option<String>> {
    let Some(raw) = headers.get(USER_ID_HEADER) else {
        return Ok(None);
    };
    let id = raw
        .to_str()
        .map_err(|_| CarbonTrackerError::validation("user_id", "User id must be ASCII"))?
        .trim();
    validate_user_id(id)?;
    Ok(Some(id.to_string()))
}

fn require_user(headers: &HeaderMap, message: &str) -> std::result::Result<String, ApiError> {
    user_id(headers)
        .map_err(ApiError::from)?
        .ok_or_else(|| ApiError::unauthorized(message))
}

/// Record an analytics event; failures are logged and dropped
async fn track(state: &AppState, event: AnalyticsEvent) {
    if let Err(e) = state.repository.track_event(&event).await {
        warn!(event_type = event.event_type.as_str(), error = %e, "Failed to track analytics event");
    }
}

/// Current weather for a location; failures and unknown cities yield `None`
async fn lookup_weather(state: &AppState, region: &Region) -> Option<WeatherSnapshot> {
    let provider = state.weather.as_ref()?;
    if !region.has_city() {
        return None;
    }
    match provider.current(&region.city, &region.country).await {
        Ok(snapshot) => snapshot,
        Err(e) => {
            warn!(error = %e, city = %region.city, "Weather lookup failed");
            None
        }
    }
}

// =============================================================================
// Health Check
// =============================================================================

/// Health check endpoint
#[instrument(skip_all)]
pub async fn health_check(Extension(state): Extension<Arc<AppState>>) -> Json<ApiResponse<HealthPayload>> {
    let database = state.repository.health_check().await;

    Json(ApiResponse::success(HealthPayload {
        status: if database.healthy { "healthy" } else { "unhealthy" },
        version: crate::VERSION,
        database,
    }))
}

// =============================================================================
// Footprint Handlers
// =============================================================================

/// Body of `POST /api/calculate`
#[derive(Debug, Default, Deserialize)]
pub struct CalculateRequest {
    pub transport_mode: Option<String>,
    pub transport_distance: Option<NumericInput>,
    #[serde(default)]
    pub food_choices: Vec<FoodItem>,
    pub energy_kwh: Option<NumericInput>,
    pub waste_type: Option<String>,
    pub waste_amount: Option<NumericInput>,
    /// Overrides the configured default location
    pub country: Option<String>,
    pub city: Option<String>,
}

impl CalculateRequest {
    /// Validate the request and convert it into an activity record
    pub fn to_activity(&self) -> Result<ActivityRecord> {
        let mode = require_text("transport_mode", self.transport_mode.as_deref())?;
        let distance = require_quantity("transport_distance", self.transport_distance.as_ref())?;
        let energy = parse_optional_quantity("energy_kwh", self.energy_kwh.as_ref())?;
        let waste_amount = parse_optional_quantity("waste_amount", self.waste_amount.as_ref())?;
        let waste_type = self
            .waste_type
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(WasteType::from);

        Ok(ActivityRecord {
            transport_mode: Some(TransportMode::from(mode)),
            transport_distance: Some(distance),
            food_choices: self.food_choices.clone(),
            energy_kwh: energy,
            waste_type,
            waste_amount,
        })
    }

    /// Location named in the request, if any
    pub fn region(&self) -> Option<Region> {
        let country = self.country.as_deref().map(str::trim).filter(|c| !c.is_empty())?;
        let city = self
            .city
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .unwrap_or("Unknown");
        Some(Region::new(country, city))
    }
}

/// Calculate a footprint with impact metrics and suggestions
#[instrument(skip_all)]
pub async fn calculate(
    Extension(state): Extension<Arc<AppState>>,
    headers: HeaderMap,
    ValidJson(req): ValidJson<CalculateRequest>,
) -> ApiResult<CalculationPayload> {
    let user = user_id(&headers).map_err(ApiError::from)?;
    let activity = req.to_activity().map_err(ApiError::from)?;

    let region = req.region().unwrap_or_else(|| state.config.region.clone());
    let region_class = region.class();

    let result = engine::compute(&activity, region_class);
    let impact = engine::derive(result.total);
    debug!(%result, "Calculated footprint");

    let weather = lookup_weather(&state, &region).await;

    let is_premium = match &user {
        Some(id) => state.repository.is_premium(id).await.unwrap_or_else(|e| {
            warn!(error = %e, "Premium lookup failed, treating user as free");
            false
        }),
        None => false,
    };

    let options = SuggestionOptions {
        max_tokens: state.config.assistant.suggestion_max_tokens,
        timeout: Duration::from_secs(state.config.assistant.timeout_secs),
    };
    let suggestions = engine::select(
        &result,
        &region,
        weather.as_ref(),
        is_premium,
        state.generator.as_deref(),
        options,
    )
    .await;

    if let Some(id) = &user {
        if let Err(e) = state.repository.record_result(id, &result).await {
            warn!(error = %e, "Failed to save calculation");
        }
    }

    track(
        &state,
        AnalyticsEvent::new(EventType::Calculation, user.clone()).with_data(json!({
            "carbon_total": result.total,
            "region": &region,
            "region_category": region_class,
        })),
    )
    .await;

    info!(total = result.total, region = %region_class, "Footprint calculated");

    Ok(Json(ApiResponse::success(CalculationPayload {
        carbon_footprint: result,
        region,
        suggestions,
        weather,
        is_premium,
        impact_metrics: impact,
    })))
}

/// The configured default location
#[instrument(skip_all)]
pub async fn get_region(Extension(state): Extension<Arc<AppState>>) -> Json<ApiResponse<RegionPayload>> {
    Json(ApiResponse::success(RegionPayload {
        region: state.config.region.clone(),
    }))
}

// =============================================================================
// Assistant Handlers
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: Option<String>,
}

const ASSISTANT_UNAVAILABLE: &str = "AI service temporarily unavailable";

/// Free-form sustainability chat
#[instrument(skip_all)]
pub async fn ecobot_chat(
    Extension(state): Extension<Arc<AppState>>,
    headers: HeaderMap,
    ValidJson(req): ValidJson<ChatRequest>,
) -> ApiResult<ChatPayload> {
    let user = user_id(&headers).map_err(ApiError::from)?;
    let raw = req
        .message
        .as_deref()
        .filter(|m| !m.is_empty())
        .ok_or_else(|| ApiError::validation("message", "No message provided"))?;
    let message = validate_chat_message(raw).map_err(ApiError::from)?;

    let generator = state
        .generator
        .as_ref()
        .ok_or_else(|| ApiError::service_unavailable(ASSISTANT_UNAVAILABLE))?;

    let region = state.config.region.clone();
    let weather = lookup_weather(&state, &region).await;
    let prompt = chat_prompt(&message, &region, weather.as_ref());

    let timeout = Duration::from_secs(state.config.assistant.timeout_secs);
    let reply = match tokio::time::timeout(
        timeout,
        generator.complete(&prompt, state.config.assistant.chat_max_tokens),
    )
    .await
    {
        Ok(Ok(reply)) => reply,
        Ok(Err(e)) => {
            warn!(error = %e, "Chat generation failed");
            return Err(ApiError::service_unavailable(ASSISTANT_UNAVAILABLE));
        }
        Err(_) => {
            warn!("Chat generation timed out");
            return Err(ApiError::service_unavailable(ASSISTANT_UNAVAILABLE));
        }
    };

    track(
        &state,
        AnalyticsEvent::new(EventType::EcobotChat, user).with_data(json!({
            "user_message": &message,
            "region": &region,
            "response_length": reply.chars().count(),
        })),
    )
    .await;

    Ok(Json(ApiResponse::success(ChatPayload { response: reply })))
}

// =============================================================================
// Account Handlers
// =============================================================================

/// Mark the caller as a premium user
#[instrument(skip_all)]
pub async fn upgrade_premium(
    Extension(state): Extension<Arc<AppState>>,
    headers: HeaderMap,
) -> ApiResult<MessagePayload> {
    let user = require_user(&headers, "Please log in to upgrade")?;

    state
        .repository
        .set_premium(&user, true)
        .await
        .map_err(ApiError::from)?;

    track(&state, AnalyticsEvent::new(EventType::PremiumUpgrade, Some(user))).await;

    Ok(Json(ApiResponse::success(MessagePayload::new(
        "Premium upgrade successful",
    ))))
}

/// The caller's most recent calculations
#[instrument(skip_all)]
pub async fn user_history(
    Extension(state): Extension<Arc<AppState>>,
    headers: HeaderMap,
) -> ApiResult<HistoryPayload> {
    let user = require_user(&headers, "Not logged in")?;

    let history = state.repository.history(&user).await.map_err(ApiError::from)?;

    Ok(Json(ApiResponse::success(HistoryPayload { history })))
}

#[derive(Debug, Deserialize)]
pub struct GoalRequest {
    pub target_carbon: Option<NumericInput>,
    pub current_carbon: Option<NumericInput>,
    pub deadline: Option<String>,
}

/// Set a carbon reduction goal for the caller
#[instrument(skip_all)]
pub async fn set_goal(
    Extension(state): Extension<Arc<AppState>>,
    headers: HeaderMap,
    ValidJson(req): ValidJson<GoalRequest>,
) -> ApiResult<MessagePayload> {
    let user = require_user(&headers, "Not logged in")?;

    let target = require_quantity("target_carbon", req.target_carbon.as_ref()).map_err(ApiError::from)?;
    let current =
        require_quantity("current_carbon", req.current_carbon.as_ref()).map_err(ApiError::from)?;
    let deadline = require_text("deadline", req.deadline.as_deref())
        .and_then(|d| parse_date("deadline", d))
        .map_err(ApiError::from)?;

    let goal = CarbonGoal::new(user, target, current, deadline);
    state.repository.save_goal(&goal).await.map_err(ApiError::from)?;

    Ok(Json(ApiResponse::success(MessagePayload::new("Goal set successfully"))))
}

// =============================================================================
// Analytics Handlers
// =============================================================================

/// Aggregate usage statistics
#[instrument(skip_all)]
pub async fn analytics_dashboard(
    Extension(state): Extension<Arc<AppState>>,
) -> ApiResult<DashboardPayload> {
    let data = state.repository.dashboard_stats().await.map_err(ApiError::from)?;

    Ok(Json(ApiResponse::success(DashboardPayload { data })))
}
