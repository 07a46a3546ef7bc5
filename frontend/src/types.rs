//! Common types used across the frontend application.
//!
//! This module centralizes type definitions to avoid duplication
//! and ensure consistency across components.
//!
//! # Categories
//!
//! - **API Types** - Backend response structures (extraction, forecast)
//! - **Error Types** - Frontend error handling

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

// =============================================================================
// API Response Types
// =============================================================================

/// Raw response from `POST /api/extract-receipt-details`.
///
/// Nothing here is trusted: `data` is kept as JSON and only turned into an
/// [`ExtractionResult`](crate::wizard::ExtractionResult) by
/// [`normalize`](crate::wizard::normalize).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractionResponse {
    /// `"success"` or anything else
    #[serde(default)]
    pub status: String,
    /// Receipt payload, present on success
    #[serde(default)]
    pub data: Option<Value>,
    /// Failure reason, present on error
    #[serde(default)]
    pub message: Option<String>,
}

impl ExtractionResponse {
    /// Whether the service reported success.
    pub fn is_success(&self) -> bool {
        self.status == "success"
    }
}

/// Metadata attached to a forecast.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ForecastMetadata {
    #[serde(default)]
    pub forecast_start: Option<String>,
    #[serde(default)]
    pub forecast_end: Option<String>,
    #[serde(default)]
    pub current_balance: Option<f64>,
    #[serde(default)]
    pub forecast_days: Option<u32>,
}

/// One forecast as returned by `GET /api/forecast/{days}`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ForecastReport {
    /// Set when the backend could not produce a forecast
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub metadata: Option<ForecastMetadata>,
    #[serde(default)]
    pub forecast_text: Option<String>,
}

/// Response of `GET /api/forecast/all`, keyed `"30_days"`, `"90_days"`, `"180_days"`.
pub type ForecastBundle = BTreeMap<String, ForecastReport>;

// =============================================================================
// Error Types
// =============================================================================

/// Failure of an extraction call.
///
/// `Display` yields the bare message so it can be shown to the user as is.
#[derive(Clone, Debug, PartialEq)]
pub enum ServiceError {
    /// The request never produced a response.
    Network(String),
    /// The response body was not the expected JSON.
    Malformed(String),
}

impl ServiceError {
    pub fn message(&self) -> &str {
        match self {
            ServiceError::Network(msg) | ServiceError::Malformed(msg) => msg,
        }
    }
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

impl std::error::Error for ServiceError {}

/// Frontend application errors.
///
/// Used by the forecast and dashboard services.
#[derive(Clone, Debug)]
pub enum AppError {
    /// Network/HTTP error.
    Network(String),
    /// Invalid data format.
    Parse(String),
    /// Backend answered with an error status.
    Server { status: u16, body: String },
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Network(msg) => write!(f, "{}", msg),
            AppError::Parse(msg) => write!(f, "Failed to parse response: {}", msg),
            AppError::Server { status, body } => write!(f, "Server error ({}): {}", status, body),
        }
    }
}

impl std::error::Error for AppError {}

/// Result type alias for frontend operations.
pub type AppResult<T> = Result<T, AppError>;
