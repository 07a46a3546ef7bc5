//! Footer component

use leptos::*;

use crate::config::{ALLOWED_EXTENSIONS, FORECAST_PERIODS};

#[component]
pub fn Footer() -> impl IntoView {
    let horizons = FORECAST_PERIODS
        .iter()
        .map(|days| days.to_string())
        .collect::<Vec<_>>()
        .join(" / ");
    let formats = ALLOWED_EXTENSIONS.join(", ").to_uppercase();

    view! {
        <footer>
            <div>"Cash Flow Agent • Built with " <span class="rust-badge">"🦀 Rust + Leptos"</span></div>
            <small>{format!("Forecasts: {} days • Receipts: {}", horizons, formats)}</small>
        </footer>
    }
}
