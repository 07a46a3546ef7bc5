//! HTTP service submitting receipt images to the extraction endpoint.

use gloo_net::http::Request;
use web_sys::{File, FormData};

use crate::config::{api_url, EXTRACT_RECEIPT_PATH};
use crate::types::{ExtractionResponse, ServiceError};

/// Upload a receipt image and return the service's answer.
///
/// The body is parsed whatever the HTTP status: the service reports
/// refusals as `{"status": "error", "message": ...}` with a 4xx/5xx code.
pub async fn extract_receipt(file: File) -> Result<ExtractionResponse, ServiceError> {
    let form_data = FormData::new()
        .map_err(|e| ServiceError::Network(format!("Failed to create FormData: {:?}", e)))?;

    form_data
        .append_with_blob_and_filename("file", &file, &file.name())
        .map_err(|e| ServiceError::Network(format!("Failed to append file: {:?}", e)))?;

    let url = api_url(EXTRACT_RECEIPT_PATH);
    let request = Request::post(&url)
        .body(form_data)
        .map_err(|e| ServiceError::Network(e.to_string()))?;

    let response = request.send().await.map_err(network_error)?;
    let status = response.status();
    let body = response.text().await.map_err(network_error)?;

    parse_extraction_body(status, &body)
}

/// Message of the rejected fetch, without the JS error name prefix.
fn network_error(e: gloo_net::Error) -> ServiceError {
    match e {
        gloo_net::Error::JsError(js) => ServiceError::Network(js.message),
        other => ServiceError::Network(other.to_string()),
    }
}

fn parse_extraction_body(status: u16, body: &str) -> Result<ExtractionResponse, ServiceError> {
    serde_json::from_str::<ExtractionResponse>(body).map_err(|e| {
        if (200..300).contains(&status) {
            ServiceError::Malformed(format!("Invalid response from server: {}", e))
        } else {
            ServiceError::Malformed(format!("Server error ({})", status))
        }
    })
}
