//! Google Cloud Vision client.
//!
//! One `images:annotate` call per image with `DOCUMENT_TEXT_DETECTION`,
//! which handles the dense, small-print layout of printed receipts better
//! than plain `TEXT_DETECTION`.

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use tracing::debug;

use crate::{OcrError, OcrService};

const ANNOTATE_URL: &str = "https://vision.googleapis.com/v1/images:annotate";

pub struct GoogleVisionOcr {
    api_key: String,
    client: reqwest::Client,
}

impl GoogleVisionOcr {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl OcrService for GoogleVisionOcr {
    async fn detect_text(&self, image: &[u8]) -> Result<Option<String>, OcrError> {
        let body = serde_json::json!({
            "requests": [{
                "image": { "content": BASE64.encode(image) },
                "features": [{ "type": "DOCUMENT_TEXT_DETECTION" }],
            }]
        });

        let resp = self
            .client
            .post(format!("{ANNOTATE_URL}?key={}", self.api_key))
            .json(&body)
            .send()
            .await?;

        let status = resp.status().as_u16();
        let json: serde_json::Value = resp.json().await?;
        if status >= 400 {
            let message = json["error"]["message"]
                .as_str()
                .unwrap_or("unknown Vision API error")
                .to_string();
            return Err(OcrError::Api { status, message });
        }

        let response = &json["responses"][0];
        if let Some(message) = response["error"]["message"].as_str() {
            return Err(OcrError::Api {
                status,
                message: message.to_string(),
            });
        }

        // First text annotation carries the full detected text; fall back to
        // the structured full-text annotation when it is absent.
        let text = response["textAnnotations"][0]["description"]
            .as_str()
            .or_else(|| response["fullTextAnnotation"]["text"].as_str())
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());

        debug!(bytes = image.len(), detected = text.is_some(), "vision annotate");
        Ok(text)
    }
}
