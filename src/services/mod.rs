//! External collaborators: AI text generation and weather lookups.
//!
//! Both are injected as trait objects so handlers and the suggestion selector
//! never reach for ambient clients or credentials.

mod assistant;
mod weather;

pub use assistant::{chat_prompt, suggestion_prompt, PerplexityClient};
pub use weather::{OpenWeatherClient, WeatherSnapshot};

use async_trait::async_trait;

use crate::Result;

/// A service that turns a prompt into free text
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generate a completion of at most `max_tokens` tokens
    async fn complete(&self, prompt: &str, max_tokens: u32) -> Result<String>;
}

/// A source of current weather conditions
#[async_trait]
pub trait WeatherProvider: Send + Sync {
    /// Current weather for a city, or `None` when the provider has no answer
    async fn current(&self, city: &str, country: &str) -> Result<Option<WeatherSnapshot>>;
}

fn http_client(timeout: std::time::Duration) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .unwrap_or_else(|_| reqwest::Client::new())
}

#[cfg(test)]
pub mod mock {
    //! Scripted collaborators for tests.

    use super::*;
    use crate::CarbonTrackerError;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Generator that returns a fixed reply, an error, or hangs
    pub struct ScriptedGenerator {
        reply: Option<String>,
        delay: Option<Duration>,
        calls: AtomicUsize,
    }

    impl ScriptedGenerator {
        pub fn replying(reply: impl Into<String>) -> Self {
            Self {
                reply: Some(reply.into()),
                delay: None,
                calls: AtomicUsize::new(0),
            }
        }

        pub fn failing() -> Self {
            Self {
                reply: None,
                delay: None,
                calls: AtomicUsize::new(0),
            }
        }

        pub fn slow(reply: impl Into<String>, delay: Duration) -> Self {
            Self {
                reply: Some(reply.into()),
                delay: Some(delay),
                calls: AtomicUsize::new(0),
            }
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl TextGenerator for ScriptedGenerator {
        async fn complete(&self, _prompt: &str, _max_tokens: u32) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            self.reply
                .clone()
                .ok_or_else(|| CarbonTrackerError::upstream("assistant", "scripted failure"))
        }
    }

    /// Weather provider returning a fixed snapshot
    pub struct FixedWeather(pub Option<WeatherSnapshot>);

    #[async_trait]
    impl WeatherProvider for FixedWeather {
        async fn current(&self, _city: &str, _country: &str) -> Result<Option<WeatherSnapshot>> {
            Ok(self.0.clone())
        }
    }
}
