//! Perplexity chat-completions client and prompt builders.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use super::{http_client, TextGenerator, WeatherSnapshot};
use crate::config::AssistantConfig;
use crate::models::{FootprintResult, Region};
use crate::{CarbonTrackerError, Result};

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    content: String,
}

/// Text generator backed by the Perplexity API
pub struct PerplexityClient {
    client: reqwest::Client,
    api_key: String,
    endpoint: String,
    model: String,
    temperature: f32,
}

impl PerplexityClient {
    pub fn new(api_key: impl Into<String>, config: &AssistantConfig) -> Self {
        Self {
            client: http_client(Duration::from_secs(config.timeout_secs)),
            api_key: api_key.into(),
            endpoint: config.endpoint.clone(),
            model: config.model.clone(),
            temperature: config.temperature,
        }
    }

    /// Build a client when an API key is configured
    pub fn from_config(config: &AssistantConfig) -> Option<Self> {
        config
            .api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
            .map(|key| Self::new(key, config))
    }
}

#[async_trait]
impl TextGenerator for PerplexityClient {
    #[instrument(skip(self, prompt), fields(model = %self.model))]
    async fn complete(&self, prompt: &str, max_tokens: u32) -> Result<String> {
        let body = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            max_tokens,
            temperature: self.temperature,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            warn!(%status, "Assistant request rejected");
            return Err(CarbonTrackerError::upstream(
                "assistant",
                format!("HTTP {}: {}", status, detail),
            ));
        }

        let parsed: ChatResponse = response.json().await?;
        let content = parsed
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content.trim().to_string())
            .ok_or_else(|| CarbonTrackerError::upstream("assistant", "response had no choices"))?;

        debug!(chars = content.len(), "Assistant reply received");
        Ok(content)
    }
}

fn weather_line(weather: Option<&WeatherSnapshot>) -> String {
    match weather {
        Some(snapshot) => format!(
            "Weather: {}, Temperature: {}°C\n",
            snapshot.condition().unwrap_or("Unknown"),
            snapshot
                .temperature_c()
                .map(|t| t.to_string())
                .unwrap_or_else(|| "Unknown".to_string())
        ),
        None => String::new(),
    }
}

/// Prompt asking for five footprint-reduction suggestions
pub fn suggestion_prompt(
    result: &FootprintResult,
    region: &Region,
    weather: Option<&WeatherSnapshot>,
) -> String {
    let b = &result.breakdown;
    format!(
        "Based on this user data, provide 5 specific, actionable suggestions to reduce their carbon footprint:\n\
         User location: {}, {}\n\
         Carbon footprint: {} kg CO2e\n\
         Breakdown: Transport: {}, Food: {}, Energy: {}, Waste: {}\n\
         Region category: {}\n\
         {}\n\
         Provide only the suggestions, one per line, without numbering or emojis. \
         Focus on practical, immediate actions that are region-specific and weather-appropriate.",
        region.city,
        region.country,
        result.total,
        b.transport,
        b.food,
        b.energy,
        b.waste,
        result.region_category,
        weather_line(weather),
    )
}

/// Prompt for a free-form sustainability chat message
pub fn chat_prompt(message: &str, region: &Region, weather: Option<&WeatherSnapshot>) -> String {
    format!(
        "You are EcoBot, an AI-powered sustainability assistant. The user is asking: \"{}\"\n\n\
         Context: User location: {}, {}\n\
         {}\n\
         Provide a helpful, informative response about sustainability, carbon reduction, \
         green living, or environmental topics. Focus on practical, actionable advice. \
         Keep the response conversational and engaging.",
        message,
        region.city,
        region.country,
        weather_line(weather),
    )
}
