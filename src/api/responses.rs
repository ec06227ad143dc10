//! API response types and error handling.

use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, Request},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::models::{DashboardStats, FootprintResult, HistoryEntry, ImpactMetrics, Region};
use crate::services::WeatherSnapshot;
use crate::storage::HealthCheck;
use crate::CarbonTrackerError;

/// Standard API response wrapper.
///
/// The payload's fields are inlined next to `success`.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    #[serde(flatten)]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorDetail>,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(code: impl Into<String>, message: impl Into<String>) -> ApiResponse<()> {
        ApiResponse {
            success: false,
            data: None,
            error: Some(ErrorDetail {
                code: code.into(),
                message: message.into(),
                field: None,
            }),
        }
    }
}

// =============================================================================
// Payloads
// =============================================================================

/// Result of `POST /api/calculate`
#[derive(Debug, Serialize)]
pub struct CalculationPayload {
    pub carbon_footprint: FootprintResult,
    pub region: Region,
    pub suggestions: Vec<String>,
    pub weather: Option<WeatherSnapshot>,
    pub is_premium: bool,
    pub impact_metrics: Option<ImpactMetrics>,
}

#[derive(Debug, Serialize)]
pub struct RegionPayload {
    pub region: Region,
}

#[derive(Debug, Serialize)]
pub struct ChatPayload {
    pub response: String,
}

#[derive(Debug, Serialize)]
pub struct MessagePayload {
    pub message: String,
}

impl MessagePayload {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HistoryPayload {
    pub history: Vec<HistoryEntry>,
}

#[derive(Debug, Serialize)]
pub struct DashboardPayload {
    pub data: DashboardStats,
}

#[derive(Debug, Serialize)]
pub struct HealthPayload {
    pub status: &'static str,
    pub version: &'static str,
    pub database: HealthCheck,
}

// =============================================================================
// Errors
// =============================================================================

/// API error type that implements IntoResponse
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub code: String,
    pub message: String,
    pub field: Option<String>,
}

impl ApiError {
    pub fn new(status: StatusCode, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status,
            code: code.into(),
            message: message.into(),
            field: None,
        }
    }

    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }

    // Convenience constructors

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "BAD_REQUEST", message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "UNAUTHORIZED", message)
    }

    pub fn not_found(resource: &str, id: impl Into<String>) -> Self {
        Self::new(
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            format!("{} not found: {}", resource, id.into()),
        )
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", message)
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "SERVICE_UNAVAILABLE", message)
    }

    pub fn bad_gateway(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_GATEWAY, "UPSTREAM_ERROR", message)
    }

    pub fn rate_limited(retry_after_secs: u64) -> Self {
        Self::new(
            StatusCode::TOO_MANY_REQUESTS,
            "RATE_LIMITED",
            format!("Rate limit exceeded. Retry after {} seconds.", retry_after_secs),
        )
    }

    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "VALIDATION_ERROR", message).with_field(field)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ApiResponse::<()> {
            success: false,
            data: None,
            error: Some(ErrorDetail {
                code: self.code,
                message: self.message,
                field: self.field,
            }),
        };

        (self.status, Json(body)).into_response()
    }
}

impl From<CarbonTrackerError> for ApiError {
    fn from(err: CarbonTrackerError) -> Self {
        match err {
            CarbonTrackerError::NotFound { resource, id } => Self::not_found(resource, id),
            CarbonTrackerError::InvalidInput(msg) => Self::bad_request(msg),
            CarbonTrackerError::Validation { field, message } => Self::validation(field, message),
            CarbonTrackerError::RateLimited { retry_after_secs } => {
                Self::rate_limited(retry_after_secs)
            }
            CarbonTrackerError::Upstream { service, message } => {
                tracing::warn!("{} failed: {}", service, message);
                Self::bad_gateway(format!("{} unavailable", service))
            }
            CarbonTrackerError::Database(e) => {
                tracing::error!("Database error: {}", e);
                Self::internal("Database error")
            }
            CarbonTrackerError::Io(e) => {
                tracing::error!("IO error: {}", e);
                Self::internal("IO error")
            }
            CarbonTrackerError::Config(msg) => {
                Self::internal(format!("Configuration error: {}", msg))
            }
            CarbonTrackerError::Serialization(e) => {
                tracing::error!("Serialization error: {}", e);
                Self::internal("Serialization error")
            }
            CarbonTrackerError::Internal(e) => {
                tracing::error!("Internal error: {}", e);
                Self::internal("Internal error")
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "VALIDATION_ERROR", rejection.body_text())
    }
}

// =============================================================================
// Extractors
// =============================================================================

/// JSON body extractor that rejects malformed or mistyped bodies with an
/// `ApiError` instead of axum's plain-text 4xx
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ValidJson<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(Self(value))
    }
}

/// Result type alias for API handlers
pub type ApiResult<T> = Result<Json<ApiResponse<T>>, ApiError>;
