//! HTTP Server for the cash flow API.
//!
//! Serves the dashboard build, uploaded receipt images, and the JSON API.
//!
//! # API Endpoints
//!
//! | Method | Path                            | Description                        |
//! |--------|---------------------------------|------------------------------------|
//! | GET    | `/health`                       | Health check                       |
//! | GET    | `/api/forecast/{days}`          | Forecast for 30, 90 or 180 days    |
//! | GET    | `/api/forecast/all`             | All three forecasts                |
//! | POST   | `/api/extract-receipt-details`  | Extract a receipt image            |
//! | GET    | `/static/uploads/*`             | Saved receipt images               |

use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::{
    extract::{multipart::MultipartRejection, DefaultBodyLimit, Multipart, Path, State},
    http::{header, Method, StatusCode},
    response::Json,
    routing::{get, post},
    Router,
};
use chrono::NaiveDate;
use serde_json::{json, Value};
use tower_http::cors::CorsLayer;
use tower_http::services::{ServeDir, ServeFile};

use super::types::{ErrorBody, ExtractionResponse};
use crate::ai::AiClient;
use crate::config::Settings;
use crate::error::{ForecastError, ReceiptError, ReceiptResult, ServerResult};
use crate::forecast::{self, period_key, ForecastOutcome, FORECAST_PERIODS};
use crate::ledger::Ledger;
use crate::receipt::{ReceiptExtractor, MAX_UPLOAD_BYTES, UPLOAD_URL_PREFIX};
use crate::registry::ReceiptRegistry;

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    settings: Arc<Settings>,
    ai: Option<AiClient>,
    registry: Arc<Mutex<ReceiptRegistry>>,
}

impl AppState {
    pub fn new(settings: Settings) -> Self {
        let registry = ReceiptRegistry::with_dir(&settings.receipts_dir);
        Self {
            ai: settings.ai_client(),
            registry: Arc::new(Mutex::new(registry)),
            settings: Arc::new(settings),
        }
    }
}

/// Build the application router
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .expose_headers([header::CONTENT_TYPE]);

    let static_dir = &state.settings.static_dir;
    let frontend = ServeDir::new(static_dir).fallback(ServeFile::new(static_dir.join("index.html")));
    let uploads = ServeDir::new(&state.settings.upload_dir);

    Router::new()
        .route("/health", get(health))
        .route("/api/forecast/all", get(all_forecasts))
        .route("/api/forecast/{days}", get(forecast_for))
        .route(
            "/api/extract-receipt-details",
            post(extract_receipt_details).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .nest_service(UPLOAD_URL_PREFIX, uploads)
        .fallback_service(frontend)
        .layer(cors)
        .with_state(state)
}

/// Start the HTTP server
pub async fn start_server(settings: Settings) -> ServerResult<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], settings.port));
    if settings.api_key.is_none() {
        tracing::warn!("⚠️  ANTHROPIC_API_KEY not set: forecasts and receipt extraction will fail");
    }
    tracing::info!("🚀 Cash flow server running on http://localhost:{}", settings.port);
    tracing::info!("   GET  /api/forecast/{{days}}          - 30, 90 or 180 day forecast");
    tracing::info!("   GET  /api/forecast/all             - All forecasts");
    tracing::info!("   POST /api/extract-receipt-details  - Extract a receipt image");
    tracing::info!("   GET  /health                       - Health check");

    let app = build_router(AppState::new(settings));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Health check endpoint
async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "cashflow",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "forecast": "GET /api/forecast/{days}",
            "forecast_all": "GET /api/forecast/all",
            "extract_receipt": "POST /api/extract-receipt-details"
        }
    }))
}

fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

/// Forecast for one horizon
async fn forecast_for(
    State(state): State<AppState>,
    Path(days): Path<String>,
) -> Result<Json<ForecastOutcome>, (StatusCode, Json<ErrorBody>)> {
    let days = days
        .parse::<u32>()
        .ok()
        .filter(|d| forecast::is_supported_period(*d))
        .ok_or_else(|| {
            (
                StatusCode::BAD_REQUEST,
                Json(ErrorBody {
                    error: ForecastError::UnsupportedPeriod(0).to_string(),
                }),
            )
        })?;

    let outcome = match Ledger::load(&state.settings.ledger_path) {
        Ok(ledger) => forecast::forecast(state.ai.as_ref(), &ledger, days, today()).await,
        Err(e) => {
            tracing::error!("❌ Ledger error: {}", e);
            ForecastOutcome::Failed { error: e.to_string() }
        }
    };
    Ok(Json(outcome))
}

/// Forecasts for every horizon
async fn all_forecasts(State(state): State<AppState>) -> Json<BTreeMap<String, ForecastOutcome>> {
    let outcomes = match Ledger::load(&state.settings.ledger_path) {
        Ok(ledger) => forecast::forecast_periods(state.ai.as_ref(), &ledger, today()).await,
        Err(e) => {
            tracing::error!("❌ Ledger error: {}", e);
            FORECAST_PERIODS
                .iter()
                .map(|days| (period_key(*days), ForecastOutcome::Failed { error: e.to_string() }))
                .collect()
        }
    };
    Json(outcomes)
}

/// Receipt extraction endpoint
async fn extract_receipt_details(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> (StatusCode, Json<ExtractionResponse>) {
    match receive_receipt(&state, multipart).await {
        Ok(data) => (StatusCode::OK, Json(ExtractionResponse::Success { data })),
        Err(e) => {
            let status = if e.is_client_error() {
                StatusCode::BAD_REQUEST
            } else {
                StatusCode::INTERNAL_SERVER_ERROR
            };
            tracing::warn!("❌ Receipt extraction failed: {}", e);
            (status, Json(ExtractionResponse::error(e.to_string())))
        }
    }
}

async fn receive_receipt(
    state: &AppState,
    multipart: Result<Multipart, MultipartRejection>,
) -> ReceiptResult<Value> {
    let mut multipart = multipart.map_err(|_| ReceiptError::NoFilePart)?;

    let mut upload: Option<(String, Vec<u8>)> = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ReceiptError::Upload(e.to_string()))?
    {
        if field.name() == Some("file") {
            let file_name = field.file_name().unwrap_or("").to_string();
            let bytes = field
                .bytes()
                .await
                .map_err(|e| ReceiptError::Upload(e.to_string()))?;
            upload = Some((file_name, bytes.to_vec()));
        }
    }
    let (file_name, bytes) = upload.ok_or(ReceiptError::NoFilePart)?;

    tracing::info!("📄 New receipt upload: {} ({} bytes)", file_name, bytes.len());
    let extractor = ReceiptExtractor::new(state.ai.as_ref(), state.settings.upload_dir.clone());
    let mut data = extractor.extract(&file_name, &bytes).await?;

    match state.registry.lock() {
        Ok(mut registry) => match registry.save(data.clone(), &file_name) {
            Ok(id) => data["receipt_id"] = json!(id),
            Err(e) => tracing::warn!("Could not store receipt: {}", e),
        },
        Err(_) => tracing::warn!("Receipt registry unavailable"),
    }
    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use tempfile::{tempdir, TempDir};
    use tower::util::ServiceExt; // for `oneshot`

    const BOUNDARY: &str = "cashflow-test-boundary";

    fn test_app() -> (Router, TempDir) {
        let dir = tempdir().unwrap();
        let ledger = dir.path().join("ledger.csv");
        std::fs::write(
            &ledger,
            "id,date,description,amount,type\n0,2024-01-01,Opening balance,100.00,opening\n",
        )
        .unwrap();

        let settings = Settings {
            api_key: None,
            ledger_path: ledger,
            upload_dir: dir.path().join("uploads"),
            receipts_dir: dir.path().join("receipts"),
            static_dir: dir.path().join("dist"),
            ..Settings::default()
        };
        (build_router(AppState::new(settings)), dir)
    }

    fn upload_request(field: &str, filename: &str, content: &[u8]) -> Request<Body> {
        let mut body = format!(
            "--{b}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\nContent-Type: application/octet-stream\r\n\r\n",
            b = BOUNDARY,
            field = field,
            filename = filename,
        )
        .into_bytes();
        body.extend_from_slice(content);
        body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());

        Request::builder()
            .method("POST")
            .uri("/api/extract-receipt-details")
            .header("content-type", format!("multipart/form-data; boundary={}", BOUNDARY))
            .body(Body::from(body))
            .unwrap()
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let (app, _dir) = test_app();
        let (status, body) = send(app, get_request("/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["service"], "cashflow");
    }

    #[tokio::test]
    async fn test_forecast_rejects_other_periods() {
        for uri in ["/api/forecast/45", "/api/forecast/0", "/api/forecast/soon"] {
            let (app, _dir) = test_app();
            let (status, body) = send(app, get_request(uri)).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{}", uri);
            assert_eq!(body, json!({ "error": "Days parameter must be 30, 90, or 180" }));
        }
    }

    #[tokio::test]
    async fn test_forecast_without_api_key() {
        let (app, _dir) = test_app();
        let (status, body) = send(app, get_request("/api/forecast/30")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "error": "API key not configured" }));
    }

    #[tokio::test]
    async fn test_all_forecasts_keys() {
        let (app, _dir) = test_app();
        let (status, body) = send(app, get_request("/api/forecast/all")).await;
        assert_eq!(status, StatusCode::OK);
        for key in ["30_days", "90_days", "180_days"] {
            assert_eq!(body[key]["error"], "API key not configured");
        }
    }

    #[tokio::test]
    async fn test_extract_without_file_part() {
        let (app, _dir) = test_app();
        let request = Request::builder()
            .method("POST")
            .uri("/api/extract-receipt-details")
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(app, request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "status": "error", "message": "No file part in the request" }));

        let (app, _dir) = test_app();
        let (status, body) = send(app, upload_request("document", "receipt.jpg", b"data")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "No file part in the request");
    }

    #[tokio::test]
    async fn test_extract_rejects_bad_names() {
        let (app, _dir) = test_app();
        let (status, body) = send(app, upload_request("file", "", b"data")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "No file selected");

        let (app, dir) = test_app();
        let (status, body) = send(app, upload_request("file", "receipt.pdf", b"%PDF")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["status"], "error");
        assert!(body["message"].as_str().unwrap().starts_with("Invalid file type"));
        assert!(!dir.path().join("uploads").exists());
    }

    #[tokio::test]
    async fn test_extract_accepts_large_photos() {
        let (app, _dir) = test_app();
        let photo = vec![0u8; 3 * 1024 * 1024];
        let (status, body) = send(app, upload_request("file", "phone_photo.jpg", &photo)).await;
        // past the body limit, only the missing key stops it
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["message"], "API key not configured");
    }

    #[tokio::test]
    async fn test_extract_without_api_key_is_server_error() {
        let (app, _dir) = test_app();
        let (status, body) = send(app, upload_request("file", "receipt.png", b"png")).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({ "status": "error", "message": "API key not configured" }));
    }
}
