//! Cash flow forecast requests and their display model.

use gloo_net::http::Request;
use serde::de::DeserializeOwned;

use crate::config::{api_url, FORECAST_PATH};
use crate::types::{AppError, AppResult, ForecastBundle, ForecastReport};

/// Fetch the forecast for one horizon (30, 90 or 180 days).
pub async fn fetch_forecast(days: u32) -> AppResult<ForecastReport> {
    get_json(&api_url(&format!("{}/{}", FORECAST_PATH, days))).await
}

/// Fetch the 30, 90 and 180 day forecasts in one request.
pub async fn fetch_all_forecasts() -> AppResult<ForecastBundle> {
    get_json(&api_url(&format!("{}/all", FORECAST_PATH))).await
}

/// GET a JSON document.
///
/// Error statuses still carry a JSON body (`{"error": ...}`), so the body
/// is parsed first and the status only matters when parsing fails.
async fn get_json<T: DeserializeOwned>(url: &str) -> AppResult<T> {
    log::debug!("GET {}", url);
    let response = Request::get(url)
        .send()
        .await
        .map_err(|e| AppError::Network(e.to_string()))?;

    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| AppError::Network(e.to_string()))?;

    match serde_json::from_str::<T>(&body) {
        Ok(value) => Ok(value),
        Err(e) if response.ok() => Err(AppError::Parse(e.to_string())),
        Err(_) => Err(AppError::Server { status, body }),
    }
}

/// Key of a horizon in the `/api/forecast/all` response.
pub fn bundle_key(days: u32) -> String {
    format!("{}_days", days)
}

/// What a forecast card shows.
#[derive(Clone, Debug, PartialEq)]
pub enum ForecastCard {
    /// Rendered as an alert: `Error: {0}`
    Failed(String),
    Ready {
        start: String,
        end: String,
        balance: String,
        text: String,
    },
}

impl ForecastCard {
    /// Build the card for a report; a missing report is an unknown error.
    pub fn from_report(report: Option<&ForecastReport>) -> Self {
        let report = match report {
            Some(r) => r,
            None => return ForecastCard::Failed("Unknown error".to_string()),
        };
        if let Some(error) = &report.error {
            let message = if error.is_empty() { "Unknown error" } else { error.as_str() };
            return ForecastCard::Failed(message.to_string());
        }

        let metadata = report.metadata.clone().unwrap_or_default();
        ForecastCard::Ready {
            start: metadata.forecast_start.unwrap_or_else(|| "N/A".to_string()),
            end: metadata.forecast_end.unwrap_or_else(|| "N/A".to_string()),
            balance: metadata
                .current_balance
                .map(|b| format!("${:.2}", b))
                .unwrap_or_else(|| "N/A".to_string()),
            text: report.forecast_text.clone().unwrap_or_default(),
        }
    }

    /// Card for a request that never produced a report.
    pub fn from_error(error: &AppError) -> Self {
        ForecastCard::Failed(error.to_string())
    }
}
