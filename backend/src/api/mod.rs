//! HTTP API module.
//!
//! This module provides the HTTP server and API types for the cash flow backend.

pub mod server;
pub mod types;

pub use server::{build_router, start_server, AppState};
pub use types::*;
