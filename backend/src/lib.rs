//! # Cash Flow Agent - forecasting and receipt extraction service
//!
//! Backend for the cash flow dashboard. It answers forecast requests from a
//! transaction ledger and turns uploaded receipt photos into structured JSON.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │ Ledger CSV  │────▶│   Ledger    │────▶│  Forecast   │────▶│ Forecast    │
//! │             │     │ (queries)   │     │ (AI + tools)│     │ JSON        │
//! └─────────────┘     └─────────────┘     └─────────────┘     └─────────────┘
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │ Receipt     │────▶│  Receipt    │────▶│  AI vision  │────▶│ Registry    │
//! │ upload      │     │ (validate)  │     │ (JSON)      │     │ (stored)    │
//! └─────────────┘     └─────────────┘     └─────────────┘     └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use cashflow::{forecast, AiClient, Ledger};
//!
//! #[tokio::main]
//! async fn main() {
//!     let ledger = Ledger::load("data/ledger.csv").unwrap();
//!     let client = AiClient::from_env().ok();
//!     let today = chrono::Local::now().date_naive();
//!     let outcome = forecast(client.as_ref(), &ledger, 30, today).await;
//!     println!("{}", serde_json::to_string_pretty(&outcome).unwrap());
//! }
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Error types per concern
//! - [`config`] - Environment settings
//! - [`ai`] - Anthropic Messages API client and prompts
//! - [`ledger`] - Transaction ledger and its queries
//! - [`forecast`] - Tool-assisted cash flow forecasts
//! - [`receipt`] - Receipt upload validation and extraction
//! - [`registry`] - Stored receipt extractions
//! - [`api`] - HTTP API server

// Core modules
pub mod config;
pub mod error;

// AI
pub mod ai;

// Domain
pub mod forecast;
pub mod ledger;
pub mod receipt;
pub mod registry;

// HTTP API
pub mod api;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{
    AiError, ConfigError, ForecastError, LedgerError, ReceiptError, RegistryError, ServerError,
};

// =============================================================================
// Re-exports - Domain
// =============================================================================

pub use config::Settings;
pub use ledger::{Ledger, MonthlyAverages, Transaction, TransactionKind};
pub use forecast::{forecast, forecast_periods, ForecastMetadata, ForecastOutcome, FORECAST_PERIODS};
pub use receipt::ReceiptExtractor;
pub use registry::{ReceiptRecord, ReceiptRegistry};

// =============================================================================
// Re-exports - AI Client
// =============================================================================

pub use ai::{AiClient, MessagesApi};

// =============================================================================
// Re-exports - API
// =============================================================================

pub use api::types::{ErrorBody, ExtractionResponse};

// Server
pub mod server {
    pub use crate::api::server::{build_router, start_server, AppState};
}
