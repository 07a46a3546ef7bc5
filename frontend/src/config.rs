//! Application configuration.
//!
//! Centralized configuration for the dashboard frontend.
//! The backend serves this app, so API paths are relative to the page
//! origin unless `BACKEND_URL` is set.

/// Backend API base URL.
///
/// Empty means same origin as the page.
pub const BACKEND_URL: &str = "";

/// Receipt extraction endpoint (multipart, field `file`).
pub const EXTRACT_RECEIPT_PATH: &str = "/api/extract-receipt-details";

/// Forecast endpoint prefix; the horizon in days is appended.
pub const FORECAST_PATH: &str = "/api/forecast";

/// Image extensions the upload wizard accepts (lower case).
pub const ALLOWED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];

/// Value of the file picker's `accept` attribute.
pub const FILE_ACCEPT: &str = ".jpg,.jpeg,.png";

/// Forecast horizons offered on the forecast page.
pub const FORECAST_PERIODS: [u32; 3] = [30, 90, 180];

/// Delay before the assistant placeholder answers.
pub const ASSISTANT_REPLY_DELAY_MS: u32 = 1000;

/// Build an absolute API URL from a path.
pub fn api_url(path: &str) -> String {
    format!("{}{}", BACKEND_URL, path)
}
