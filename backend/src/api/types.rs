//! REST API response bodies.
//!
//! The receipt endpoint answers `{"status": "success", "data": ...}` or
//! `{"status": "error", "message": ...}`; the forecast endpoints answer a
//! forecast or `{"error": ...}`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Body of `POST /api/extract-receipt-details`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ExtractionResponse {
    Success { data: Value },
    Error { message: String },
}

impl ExtractionResponse {
    pub fn error(message: impl Into<String>) -> Self {
        ExtractionResponse::Error {
            message: message.into(),
        }
    }
}

/// `{"error": ...}` body of a rejected forecast request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}
