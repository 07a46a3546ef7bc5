//! UI Components for the Cash Flow Agent dashboard.
//!
//! This module contains all Leptos components organized by function:
//!
//! # Layout Components
//! - [`Header`] - Navigation bar
//! - [`Footer`] - Page footer
//!
//! # Feature Components
//! - [`Dashboard`] - Sample revenue, expense and cash flow charts
//! - [`AssistantPanel`] - Finance assistant chat placeholder
//! - [`ForecastPage`] - 30/90/180 day cash flow forecasts
//! - [`ReceiptWizard`] - Receipt upload and extraction wizard

mod header;
mod footer;
mod dashboard;
mod assistant;
mod forecast;
mod receipt_wizard;

pub use header::*;
pub use footer::*;
pub use dashboard::*;
pub use assistant::*;
pub use forecast::*;
pub use receipt_wizard::*;
