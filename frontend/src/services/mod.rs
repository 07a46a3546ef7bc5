//! Backend services.
//!
//! This module provides services for external communication:
//!
//! # Services
//!
//! - [`extraction`] - Receipt image upload to the extraction endpoint
//! - [`forecast`] - Cash flow forecasts for 30/90/180 days

pub mod extraction;
pub mod forecast;

pub use extraction::*;
pub use forecast::*;
