//! HTTP API module using axum.
//!
//! Provides the JSON endpoints of the carbon tracker.

mod handlers;
mod middleware;
mod responses;

use axum::{
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post},
    Extension, Router,
};
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::AppConfig;
use crate::services::{OpenWeatherClient, PerplexityClient, TextGenerator, WeatherProvider};
use crate::storage::Repository;
use crate::{CarbonTrackerError, Result};

pub use handlers::*;
pub use middleware::{RateLimiter, RequestId, REQUEST_ID_HEADER, USER_ID_HEADER};
pub use responses::*;

/// Application state shared across handlers
pub struct AppState {
    pub repository: Arc<dyn Repository>,
    pub generator: Option<Arc<dyn TextGenerator>>,
    pub weather: Option<Arc<dyn WeatherProvider>>,
    pub config: AppConfig,
}

impl AppState {
    /// State with no external collaborators
    pub fn new(repository: Arc<dyn Repository>, config: AppConfig) -> Self {
        Self {
            repository,
            generator: None,
            weather: None,
            config,
        }
    }

    /// State with the collaborators the configuration has keys for
    pub fn from_config(repository: Arc<dyn Repository>, config: AppConfig) -> Self {
        let generator = PerplexityClient::from_config(&config.assistant)
            .map(|c| Arc::new(c) as Arc<dyn TextGenerator>);
        let weather = OpenWeatherClient::from_config(&config.weather)
            .map(|c| Arc::new(c) as Arc<dyn WeatherProvider>);

        if generator.is_none() {
            info!("No assistant API key configured, AI suggestions and chat disabled");
        }
        if weather.is_none() {
            info!("No weather API key configured, weather lookups disabled");
        }

        Self {
            repository,
            generator,
            weather,
            config,
        }
    }

    pub fn with_generator(mut self, generator: Arc<dyn TextGenerator>) -> Self {
        self.generator = Some(generator);
        self
    }

    pub fn with_weather(mut self, weather: Arc<dyn WeatherProvider>) -> Self {
        self.weather = Some(weather);
        self
    }
}

/// Create the API router with all routes
pub fn create_router(state: Arc<AppState>) -> Router {
    let limiter = Arc::new(RateLimiter::new(
        state.config.server.rate_limit_requests,
        state.config.server.rate_limit_window_secs,
    ));
    create_router_with_limiter(state, limiter)
}

/// Create the router around an existing rate limiter
pub fn create_router_with_limiter(state: Arc<AppState>, limiter: Arc<RateLimiter>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))

        // Footprint
        .route("/api/calculate", post(handlers::calculate))
        .route("/api/region", get(handlers::get_region))

        // Assistant
        .route("/api/ecobot/chat", post(handlers::ecobot_chat))

        // Account
        .route("/api/premium/upgrade", post(handlers::upgrade_premium))
        .route("/api/user/history", get(handlers::user_history))
        .route("/api/goals/set", post(handlers::set_goal))

        // Analytics
        .route("/api/analytics/dashboard", get(handlers::analytics_dashboard))

        // Add middleware
        .layer(Extension(state))
        .layer(from_fn_with_state(limiter, middleware::rate_limit_middleware))
        .layer(from_fn(middleware::security_headers_middleware))
        .layer(from_fn(middleware::request_id_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

/// Start the HTTP server
pub async fn serve(state: AppState) -> Result<()> {
    let addr = state.config.server.bind_addr();
    let state = Arc::new(state);

    let limiter = Arc::new(RateLimiter::new(
        state.config.server.rate_limit_requests,
        state.config.server.rate_limit_window_secs,
    ));
    let sweeper = Arc::clone(&limiter);
    let sweep_every = Duration::from_secs(state.config.server.rate_limit_window_secs.max(1));
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(sweep_every);
        loop {
            ticker.tick().await;
            sweeper.cleanup().await;
        }
    });

    let app = create_router_with_limiter(state, limiter);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!("API server listening on http://{}", addr);

    axum::serve(listener, app)
        .await
        .map_err(CarbonTrackerError::internal)?;

    Ok(())
}
