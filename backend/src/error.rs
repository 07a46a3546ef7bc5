//! Error types for the cash flow service.
//!
//! - [`AiError`] - Anthropic API client errors
//! - [`LedgerError`] - Transaction ledger loading errors
//! - [`ForecastError`] - Forecast generation errors
//! - [`ReceiptError`] - Receipt upload and extraction errors
//! - [`RegistryError`] - Stored receipt errors
//! - [`ConfigError`] - Environment configuration errors
//! - [`ServerError`] - HTTP server errors
//!
//! Error conversion is automatic via `From` implementations,
//! allowing `?` to work across error boundaries.

use thiserror::Error;

// =============================================================================
// AI Client Errors
// =============================================================================

/// Errors from the AI client.
#[derive(Debug, Error)]
pub enum AiError {
    /// No API key configured.
    #[error("API key not configured")]
    MissingApiKey,

    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    RequestFailed(String),

    /// The API answered with an error.
    #[error("API error: {0}")]
    Api(String),

    /// Response body could not be decoded.
    #[error("Invalid AI response: {0}")]
    InvalidResponse(String),
}

// =============================================================================
// Ledger Errors
// =============================================================================

/// Errors while loading the transaction ledger.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("Failed to read ledger: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid ledger CSV: {0}")]
    Csv(#[from] csv::Error),

    /// A row parsed but its content is unusable.
    #[error("Invalid ledger row {line}: {message}")]
    InvalidRow { line: u64, message: String },
}

// =============================================================================
// Forecast Errors
// =============================================================================

/// Errors while generating a forecast.
#[derive(Debug, Error)]
pub enum ForecastError {
    #[error("Days parameter must be 30, 90, or 180")]
    UnsupportedPeriod(u32),

    #[error("Tool {0} not found")]
    UnknownTool(String),

    #[error("Invalid input for tool {tool}: {message}")]
    InvalidToolInput { tool: String, message: String },

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error(transparent)]
    Ai(#[from] AiError),
}

// =============================================================================
// Receipt Errors
// =============================================================================

/// Errors while extracting a receipt.
///
/// Messages are shown to the user as-is.
#[derive(Debug, Error)]
pub enum ReceiptError {
    #[error("No file part in the request")]
    NoFilePart,

    #[error("No file selected")]
    NoFileSelected,

    /// The multipart body could not be read.
    #[error("Upload error: {0}")]
    Upload(String),

    #[error("Invalid file type. Only JPG, JPEG, and PNG files are allowed.")]
    InvalidFileType,

    #[error("Invalid JSON response from AI model: {0}")]
    InvalidJson(String),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Failed to save image: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Ai(#[from] AiError),
}

impl ReceiptError {
    /// Whether the request itself was at fault (HTTP 400).
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            ReceiptError::NoFilePart
                | ReceiptError::NoFileSelected
                | ReceiptError::Upload(_)
                | ReceiptError::InvalidFileType
        )
    }
}

// =============================================================================
// Registry Errors
// =============================================================================

/// Errors from the receipt registry.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Receipt not found: {0}")]
    NotFound(String),

    #[error("Registry IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Registry JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

// =============================================================================
// Configuration Errors
// =============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {name}: {value}")]
    InvalidVar { name: String, value: String },
}

// =============================================================================
// Server Errors
// =============================================================================

/// HTTP server errors.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Server IO error: {0}")]
    Io(#[from] std::io::Error),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for AI operations.
pub type AiResult<T> = Result<T, AiError>;

/// Result type for ledger operations.
pub type LedgerResult<T> = Result<T, LedgerError>;

/// Result type for forecast operations.
pub type ForecastResult<T> = Result<T, ForecastError>;

/// Result type for receipt extraction.
pub type ReceiptResult<T> = Result<T, ReceiptError>;

/// Result type for registry operations.
pub type RegistryResult<T> = Result<T, RegistryError>;

/// Result type for server operations.
pub type ServerResult<T> = Result<T, ServerError>;
