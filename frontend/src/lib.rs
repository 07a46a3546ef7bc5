//! Cash Flow Agent - Frontend Rust/Leptos Application
//!
//! A WebAssembly dashboard for a small business: sample charts, cash flow
//! forecasts, and a receipt upload wizard that turns a photo into
//! structured receipt details.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        App                                   │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Header (navigation)                                         │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Routes                                                      │
//! │  ├── /          Dashboard + AssistantPanel                   │
//! │  ├── /forecast  ForecastPage                                 │
//! │  └── /receipts  ReceiptWizard                                │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Footer                                                      │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//!
//! - [`types`] - Wire types and errors
//! - [`wizard`] - Upload wizard state machine (DOM free)
//! - [`assistant`] - Chat transcript for the assistant placeholder
//! - [`charts`] - Dashboard datasets drawn with plotters
//! - [`components`] - UI components
//! - [`services`] - Backend communication (extraction, forecast)

use leptos::*;
use leptos_meta::*;
use leptos_router::*;
use wasm_bindgen::prelude::*;

// =============================================================================
// Module declarations
// =============================================================================

pub mod config;
pub mod types;
pub mod wizard;
pub mod assistant;
pub mod charts;
pub mod components;
pub mod services;

// =============================================================================
// Re-exports
// =============================================================================

// Configuration
pub use config::*;

// Types
pub use types::{
    // Extraction
    ExtractionResponse, ServiceError,
    // Forecast
    ForecastBundle, ForecastMetadata, ForecastReport,
    // Errors
    AppError, AppResult,
};

// Components
pub use components::*;

// Services
pub use services::*;

// =============================================================================
// Application Entry Point
// =============================================================================

/// WASM entry point - called automatically by trunk.
#[wasm_bindgen(start)]
pub fn main() {
    // Setup panic hook for better error messages
    console_error_panic_hook::set_once();

    // Setup console logging
    _ = console_log::init_with_level(log::Level::Debug);

    log::info!("🦀 Cash Flow Agent - Starting Leptos App");

    mount_to_body(|| view! { <App/> });
}

#[component]
pub fn App() -> impl IntoView {
    provide_meta_context();

    view! {
        <Title text="Cash Flow Agent"/>
        <Router>
            <Header/>
            <main class="container">
                <Routes>
                    <Route path="/" view=DashboardPage/>
                    <Route path="/forecast" view=ForecastPage/>
                    <Route path="/receipts" view=ReceiptsPage/>
                </Routes>
            </main>
            <Footer/>
        </Router>
    }
}

#[component]
fn DashboardPage() -> impl IntoView {
    view! {
        <Title text="Dashboard - Cash Flow Agent"/>
        <Dashboard/>
        <AssistantPanel/>
    }
}

#[component]
fn ReceiptsPage() -> impl IntoView {
    view! {
        <Title text="Receipts - Cash Flow Agent"/>
        <div class="hero">
            <h1>"Receipt Extraction"</h1>
            <p class="subtitle">"Upload a photo of a receipt to extract the vendor, items and totals."</p>
        </div>
        <ReceiptWizard/>
    }
}
