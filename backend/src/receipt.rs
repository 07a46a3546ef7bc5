//! Receipt image extraction.
//!
//! An uploaded image is checked, saved under the upload directory, sent to
//! the model, and the model's JSON answer is validated before it is handed
//! back with the URL of the saved image.

use std::path::{Path, PathBuf};

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::ai::{extract_json, receipt_prompt, MessageRequest, MessagesApi};
use crate::error::{AiError, ReceiptError, ReceiptResult};

/// Image extensions accepted for upload (lower case)
pub const ALLOWED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];

/// Fields the model's answer must contain
pub const REQUIRED_FIELDS: [&str; 6] = ["date", "currency", "vendor_name", "receipt_items", "tax", "total"];

/// URL prefix under which saved images are served
pub const UPLOAD_URL_PREFIX: &str = "/static/uploads";

/// Largest accepted body for the extraction endpoint
pub const MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

const MAX_TOKENS: u32 = 1024;

/// Lower-cased extension after the last dot, if any.
fn extension(filename: &str) -> Option<String> {
    filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_lowercase())
}

/// Whether `filename` carries an accepted image extension.
pub fn allowed_file(filename: &str) -> bool {
    extension(filename).is_some_and(|ext| ALLOWED_EXTENSIONS.contains(&ext.as_str()))
}

/// Check an uploaded file name before anything is stored.
pub fn validate_upload(filename: &str) -> ReceiptResult<()> {
    if filename.is_empty() {
        return Err(ReceiptError::NoFileSelected);
    }
    if !allowed_file(filename) {
        return Err(ReceiptError::InvalidFileType);
    }
    Ok(())
}

/// MIME type sent to the model for an accepted file name.
pub fn media_type(filename: &str) -> &'static str {
    match extension(filename).as_deref() {
        Some("png") => "image/png",
        _ => "image/jpeg",
    }
}

/// Unique on-disk name: a UUID followed by the sanitized original name.
pub fn stored_name(filename: &str) -> String {
    let base = Path::new(filename)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("receipt");
    let safe: String = base
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '.' || c == '-' { c } else { '_' })
        .collect();
    format!("{}_{}", Uuid::new_v4().simple(), safe.trim_start_matches('.'))
}

/// Parse and validate the model's answer.
pub fn parse_receipt_json(text: &str) -> ReceiptResult<Value> {
    let data: Value =
        serde_json::from_str(&extract_json(text)).map_err(|e| ReceiptError::InvalidJson(e.to_string()))?;

    let object = data
        .as_object()
        .ok_or_else(|| ReceiptError::InvalidJson("expected a JSON object".to_string()))?;
    if let Some(missing) = REQUIRED_FIELDS.iter().find(|field| !object.contains_key(**field)) {
        return Err(ReceiptError::MissingField(missing.to_string()));
    }
    Ok(data)
}

/// Vision request for a base64-encoded receipt image.
pub fn vision_request(media_type: &str, image_b64: &str) -> MessageRequest {
    MessageRequest::new(
        MAX_TOKENS,
        vec![json!({
            "role": "user",
            "content": [
                {
                    "type": "image",
                    "source": { "type": "base64", "media_type": media_type, "data": image_b64 }
                },
                { "type": "text", "text": receipt_prompt() }
            ]
        })],
    )
}

/// Extracts receipts with a model, saving images to `upload_dir`.
pub struct ReceiptExtractor<'a, M> {
    model: Option<&'a M>,
    upload_dir: PathBuf,
}

impl<'a, M: MessagesApi> ReceiptExtractor<'a, M> {
    /// `model` is `None` when no API key is configured; uploads are still
    /// validated but extraction fails.
    pub fn new(model: Option<&'a M>, upload_dir: impl Into<PathBuf>) -> Self {
        Self {
            model,
            upload_dir: upload_dir.into(),
        }
    }

    /// Extract the receipt in `bytes`, uploaded as `filename`.
    ///
    /// On success the data carries `image_url`, the public URL of the
    /// saved image.
    pub async fn extract(&self, filename: &str, bytes: &[u8]) -> ReceiptResult<Value> {
        validate_upload(filename)?;
        let model = self.model.ok_or(AiError::MissingApiKey)?;

        let name = stored_name(filename);
        tokio::fs::create_dir_all(&self.upload_dir).await?;
        tokio::fs::write(self.upload_dir.join(&name), bytes).await?;
        tracing::info!("🧾 Saved receipt image {} ({} bytes)", name, bytes.len());

        let request = vision_request(media_type(filename), &STANDARD.encode(bytes));
        let response = model.create_message(request).await?;

        let mut data = parse_receipt_json(&response.text())?;
        data["image_url"] = json!(format!("{}/{}", UPLOAD_URL_PREFIX, name));
        Ok(data)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::ai::{AiResult, ContentBlock, MessageResponse};
    use std::future::Future;
    use std::sync::Mutex;
    use tempfile::tempdir;

    /// Model answering every request with a fixed text, recording requests.
    pub(crate) struct CannedModel {
        pub reply: String,
        pub requests: Mutex<Vec<MessageRequest>>,
    }

    impl CannedModel {
        pub(crate) fn new(reply: &str) -> Self {
            Self {
                reply: reply.to_string(),
                requests: Mutex::new(Vec::new()),
            }
        }
    }

    impl MessagesApi for CannedModel {
        fn create_message(
            &self,
            request: MessageRequest,
        ) -> impl Future<Output = AiResult<MessageResponse>> + Send {
            self.requests.lock().unwrap().push(request);
            let response = MessageResponse {
                content: vec![ContentBlock::Text {
                    text: self.reply.clone(),
                }],
                stop_reason: Some("end_turn".to_string()),
            };
            async move { Ok(response) }
        }
    }

    const GOOD_REPLY: &str = r#"```json
{
  "date": "2023-06-15",
  "currency": "USD",
  "vendor_name": "Test Store",
  "receipt_items": [
    {"item_name": "Item 1", "item_cost": 10.99},
    {"item_name": "Item 2", "item_cost": 5.99}
  ],
  "tax": 1.50,
  "total": 18.48
}
```"#;

    #[test]
    fn test_allowed_file() {
        assert!(allowed_file("receipt.jpg"));
        assert!(allowed_file("receipt.jpeg"));
        assert!(allowed_file("receipt.PNG"));

        assert!(!allowed_file("receipt.pdf"));
        assert!(!allowed_file("receipt.txt"));
        assert!(!allowed_file("receipt"));
    }

    #[test]
    fn test_validate_upload() {
        assert!(matches!(validate_upload(""), Err(ReceiptError::NoFileSelected)));
        assert!(matches!(validate_upload("scan.pdf"), Err(ReceiptError::InvalidFileType)));
        assert!(validate_upload("scan.jpeg").is_ok());
    }

    #[test]
    fn test_stored_name_is_unique_and_safe() {
        let a = stored_name("../my receipt.jpg");
        let b = stored_name("../my receipt.jpg");
        assert_ne!(a, b);
        assert!(a.ends_with("_my_receipt.jpg"));
        assert!(!a.contains('/'));
        assert_eq!(media_type("x.png"), "image/png");
        assert_eq!(media_type("x.JPG"), "image/jpeg");
    }

    #[test]
    fn test_parse_errors() {
        let err = parse_receipt_json("This is not valid JSON").unwrap_err();
        assert!(err.to_string().starts_with("Invalid JSON response from AI model"));

        let err = parse_receipt_json(r#"{"date": "2023-06-15", "vendor_name": "Test Store"}"#).unwrap_err();
        assert_eq!(err.to_string(), "Missing required field: currency");

        // null still counts as present
        let data = parse_receipt_json(
            r#"{"date": null, "currency": "EUR", "vendor_name": "X", "receipt_items": [], "tax": 0, "total": 0}"#,
        )
        .unwrap();
        assert!(data["date"].is_null());
    }

    #[tokio::test]
    async fn test_successful_extraction() {
        let dir = tempdir().unwrap();
        let model = CannedModel::new(GOOD_REPLY);
        let extractor = ReceiptExtractor::new(Some(&model), dir.path());

        let data = extractor.extract("test_receipt.jpg", b"fake image data").await.unwrap();
        assert_eq!(data["vendor_name"], "Test Store");
        assert_eq!(data["total"], 18.48);

        let url = data["image_url"].as_str().unwrap();
        let name = url.strip_prefix("/static/uploads/").unwrap();
        assert_eq!(std::fs::read(dir.path().join(name)).unwrap(), b"fake image data");

        let requests = model.requests.lock().unwrap();
        let source = &requests[0].messages[0]["content"][0]["source"];
        assert_eq!(source["media_type"], "image/jpeg");
        assert_eq!(source["data"], STANDARD.encode(b"fake image data"));
    }

    #[tokio::test]
    async fn test_invalid_type_never_reaches_model() {
        let dir = tempdir().unwrap();
        let model = CannedModel::new(GOOD_REPLY);
        let extractor = ReceiptExtractor::new(Some(&model), dir.path());

        let err = extractor.extract("receipt.pdf", b"%PDF").await.unwrap_err();
        assert!(err.to_string().contains("Invalid file type"));
        assert!(model.requests.lock().unwrap().is_empty());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_missing_api_key() {
        let dir = tempdir().unwrap();
        let extractor = ReceiptExtractor::<CannedModel>::new(None, dir.path());
        let err = extractor.extract("receipt.png", b"png").await.unwrap_err();
        assert!(matches!(err, ReceiptError::Ai(AiError::MissingApiKey)));
    }
}
