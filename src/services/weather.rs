//! OpenWeatherMap client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use super::{http_client, WeatherProvider};
use crate::config::WeatherConfig;
use crate::Result;

/// Provider weather payload, passed through to clients unchanged
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WeatherSnapshot(serde_json::Value);

impl WeatherSnapshot {
    /// Main condition, e.g. "Rain"
    pub fn condition(&self) -> Option<&str> {
        self.0.pointer("/weather/0/main").and_then(|v| v.as_str())
    }

    /// Temperature in degrees Celsius
    pub fn temperature_c(&self) -> Option<f64> {
        self.0.pointer("/main/temp").and_then(|v| v.as_f64())
    }
}

impl From<serde_json::Value> for WeatherSnapshot {
    fn from(value: serde_json::Value) -> Self {
        Self(value)
    }
}

/// Weather provider backed by the OpenWeatherMap current-weather API
pub struct OpenWeatherClient {
    client: reqwest::Client,
    api_key: String,
    endpoint: String,
}

impl OpenWeatherClient {
    pub fn new(api_key: impl Into<String>, config: &WeatherConfig) -> Self {
        Self {
            client: http_client(Duration::from_secs(config.timeout_secs)),
            api_key: api_key.into(),
            endpoint: config.endpoint.clone(),
        }
    }

    /// Build a client when an API key is configured
    pub fn from_config(config: &WeatherConfig) -> Option<Self> {
        config
            .api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
            .map(|key| Self::new(key, config))
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherClient {
    #[instrument(skip(self))]
    async fn current(&self, city: &str, country: &str) -> Result<Option<WeatherSnapshot>> {
        let query = format!("{},{}", city, country);
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("q", query.as_str()),
                ("appid", self.api_key.as_str()),
                ("units", "metric"),
            ])
            .send()
            .await?;

        match response.status() {
            StatusCode::OK => {
                let value: serde_json::Value = response.json().await?;
                Ok(Some(WeatherSnapshot(value)))
            }
            status => {
                debug!(%status, "No weather for location");
                Ok(None)
            }
        }
    }
}
