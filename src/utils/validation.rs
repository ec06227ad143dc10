//! Input validation utilities.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{CarbonTrackerError, Result};

/// Shortest accepted chat message, in characters
pub const MIN_CHAT_CHARS: usize = 2;
/// Longest accepted chat message, in characters
pub const MAX_CHAT_CHARS: usize = 1000;
/// Longest accepted user identifier
pub const MAX_USER_ID_LEN: usize = 128;
/// Largest accepted quantity (km, kWh, kg)
pub const MAX_QUANTITY: f64 = 1e9;

/// A numeric request field sent either as a JSON number or a string
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NumericInput {
    Number(f64),
    Text(String),
}

impl NumericInput {
    /// Whether the client sent nothing usable (an empty or blank string)
    pub fn is_blank(&self) -> bool {
        matches!(self, Self::Text(s) if s.trim().is_empty())
    }
}

impl From<f64> for NumericInput {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for NumericInput {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

/// Parse a quantity that must be a finite, non-negative number
pub fn parse_quantity(field: &str, input: &NumericInput) -> Result<f64> {
    let value = match input {
        NumericInput::Number(n) => *n,
        NumericInput::Text(s) => s.trim().parse::<f64>().map_err(|_| {
            CarbonTrackerError::validation(field, format!("'{}' is not a number", s))
        })?,
    };

    if !value.is_finite() {
        return Err(CarbonTrackerError::validation(field, "Must be a finite number"));
    }
    if value < 0.0 {
        return Err(CarbonTrackerError::validation(field, "Cannot be negative"));
    }
    if value > MAX_QUANTITY {
        return Err(CarbonTrackerError::validation(
            field,
            format!("Cannot exceed {}", MAX_QUANTITY),
        ));
    }
    Ok(value)
}

/// Parse an optional quantity; absent and blank inputs yield `None`
pub fn parse_optional_quantity(field: &str, input: Option<&NumericInput>) -> Result<Option<f64>> {
    match input {
        None => Ok(None),
        Some(n) if n.is_blank() => Ok(None),
        Some(n) => parse_quantity(field, n).map(Some),
    }
}

/// Parse a quantity the request must carry
pub fn require_quantity(field: &str, input: Option<&NumericInput>) -> Result<f64> {
    match input {
        Some(n) if !n.is_blank() => parse_quantity(field, n),
        _ => Err(missing(field)),
    }
}

/// Require a non-empty text field, returning it trimmed
pub fn require_text<'a>(field: &str, input: Option<&'a str>) -> Result<&'a str> {
    input
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| missing(field))
}

fn missing(field: &str) -> CarbonTrackerError {
    CarbonTrackerError::validation(field, format!("Missing required field: {}", field))
}

/// Validate a chat message, returning it trimmed
pub fn validate_chat_message(message: &str) -> Result<String> {
    let trimmed = message.trim();
    validate_utf8_no_null(trimmed)?;

    let chars = trimmed.chars().count();
    if chars > MAX_CHAT_CHARS {
        return Err(CarbonTrackerError::validation(
            "message",
            format!(
                "Message too long. Please keep it under {} characters.",
                MAX_CHAT_CHARS
            ),
        ));
    }
    if chars < MIN_CHAT_CHARS {
        return Err(CarbonTrackerError::validation(
            "message",
            "Please provide a valid message.",
        ));
    }

    Ok(trimmed.to_string())
}

/// Validate an opaque user identifier from a request header
pub fn validate_user_id(user_id: &str) -> Result<()> {
    if user_id.is_empty() {
        return Err(CarbonTrackerError::validation("user_id", "User id cannot be empty"));
    }
    if user_id.len() > MAX_USER_ID_LEN {
        return Err(CarbonTrackerError::validation(
            "user_id",
            format!("User id cannot exceed {} characters", MAX_USER_ID_LEN),
        ));
    }
    if user_id.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return Err(CarbonTrackerError::validation(
            "user_id",
            "User id cannot contain whitespace or control characters",
        ));
    }
    Ok(())
}

/// Parse a `YYYY-MM-DD` date
pub fn parse_date(field: &str, input: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d")
        .map_err(|_| CarbonTrackerError::validation(field, "Expected a date as YYYY-MM-DD"))
}

/// Validate that a string contains no null bytes
pub fn validate_utf8_no_null(s: &str) -> Result<()> {
    if s.contains('\0') {
        return Err(CarbonTrackerError::Validation {
            field: "input".into(),
            message: "Input cannot contain null bytes".into(),
        });
    }
    Ok(())
}
