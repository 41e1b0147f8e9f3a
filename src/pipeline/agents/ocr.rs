//! OCR agent — a vision model reads the receipt photo and returns the
//! first structured rendition of the purchase.
//!
//! The prompt is static (no placeholders); the image travels alongside it
//! as base64-encoded auxiliary input, not embedded in the text.

use std::sync::Arc;

use base64::Engine as _;

use super::response::{decode_ocr_response, ocr_response_schema, OcrResponse};
use super::settings::{AgentSettings, SettingsError};
use super::types::{backend_alive, ensure_backend_supported, Agent, AgentRequest};
use super::AgentError;
use crate::config;
use crate::pipeline::ollama_types::ChatClient;

/// Image formats the vision model accepts.
const ALLOWED_IMAGE_EXTENSIONS: &[&str] = &["jpeg", "jpg", "png"];

pub struct OcrAgent {
    settings: AgentSettings,
    client: Arc<dyn ChatClient>,
}

impl OcrAgent {
    pub fn new(settings: AgentSettings, client: Arc<dyn ChatClient>) -> Self {
        Self { settings, client }
    }

    /// Default configuration: vision model + shipped prompt file.
    pub fn with_defaults(client: Arc<dyn ChatClient>) -> Result<Self, SettingsError> {
        let settings = AgentSettings::builder()
            .model(config::DEFAULT_OCR_MODEL)
            .prompt_file(config::ocr_prompt_file())
            .response_schema(ocr_response_schema())
            .build()?;
        Ok(Self::new(settings, client))
    }
}

impl Agent for OcrAgent {
    fn ask(&self, request: &AgentRequest) -> Result<OcrResponse, AgentError> {
        ensure_backend_supported(&self.settings)?;

        if !self.heartbeat() {
            return Err(AgentError::BackendUnavailable);
        }

        let image = match request {
            AgentRequest::Ocr { image } => image,
            _ => {
                return Err(AgentError::InvalidRequest(
                    "The OCR agent expects an image request".to_string(),
                ))
            }
        };

        let extension = image
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        if !ALLOWED_IMAGE_EXTENSIONS.contains(&extension.as_str()) {
            return Err(AgentError::InvalidRequest(format!(
                "The image should be in formats: {ALLOWED_IMAGE_EXTENSIONS:?}"
            )));
        }

        if !image.exists() {
            return Err(AgentError::ResourceNotFound(image.clone()));
        }

        let image_bytes = std::fs::read(image)?;
        let encoded = base64::engine::general_purpose::STANDARD.encode(image_bytes);

        let _span = tracing::info_span!(
            "ocr_ask",
            model = %self.settings.model(),
            image = %image.display(),
        )
        .entered();
        let start = std::time::Instant::now();

        let raw = self.client.chat(
            self.settings.model(),
            self.settings.prompt_template(),
            &[encoded],
            self.settings.response_schema(),
        )?;

        let response = decode_ocr_response(&raw)?;

        tracing::info!(
            model = %self.settings.model(),
            elapsed_ms = %start.elapsed().as_millis(),
            products = response.product_count(),
            status = ?response.ocr_status,
            "OCR extraction complete"
        );

        Ok(response)
    }

    fn heartbeat(&self) -> bool {
        backend_alive(self.client.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::agents::response::{OcrStatus, OCR_STATUS_SUCCESS};
    use crate::pipeline::ollama::MockChatClient;
    use serde_json::json;
    use std::io::Write;

    fn ocr_settings() -> AgentSettings {
        AgentSettings::builder()
            .model("llama3.2-vision:11b")
            .prompt_template("Read every field on the receipt.")
            .response_schema(ocr_response_schema())
            .build()
            .unwrap()
    }

    fn success_reply(product_names: &[&str]) -> String {
        let products: Vec<serde_json::Value> = product_names
            .iter()
            .map(|name| {
                json!({
                    "name": name,
                    "category": "food",
                    "price": 1.99,
                    "price_currency": "€",
                    "discount": null,
                })
            })
            .collect();
        json!({
            "ocr_status": OCR_STATUS_SUCCESS,
            "store_name": "Edeka",
            "store_address": null,
            "date_time": null,
            "products": products,
            "total_price": null,
            "total_price_currency": null,
        })
        .to_string()
    }

    fn temp_image(extension: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(&format!(".{extension}"))
            .tempfile()
            .unwrap();
        file.write_all(b"fake-image-bytes").unwrap();
        file
    }

    #[test]
    fn reads_receipt_image() {
        let image = temp_image("jpg");
        let client = Arc::new(MockChatClient::new(&success_reply(&["Brot", "Milch"])));
        let agent = OcrAgent::new(ocr_settings(), client.clone());

        let response = agent
            .ask(&AgentRequest::Ocr {
                image: image.path().to_path_buf(),
            })
            .unwrap();

        assert_eq!(response.ocr_status, OcrStatus::Success);
        assert_eq!(response.product_count(), 2);
        assert_eq!(client.chat_calls(), 1);
    }

    #[test]
    fn missing_file_fails_before_backend_call() {
        let client = Arc::new(MockChatClient::new(&success_reply(&["Brot"])));
        let agent = OcrAgent::new(ocr_settings(), client.clone());

        let result = agent.ask(&AgentRequest::Ocr {
            image: "/no/such/receipt.jpg".into(),
        });

        assert!(matches!(result, Err(AgentError::ResourceNotFound(_))));
        assert_eq!(client.chat_calls(), 0);
    }

    #[test]
    fn disallowed_extension_is_invalid_request() {
        let client = Arc::new(MockChatClient::new(&success_reply(&["Brot"])));
        let agent = OcrAgent::new(ocr_settings(), client.clone());

        let result = agent.ask(&AgentRequest::Ocr {
            image: "/tmp/receipt.pdf".into(),
        });

        assert!(matches!(result, Err(AgentError::InvalidRequest(_))));
        assert_eq!(client.chat_calls(), 0);
    }

    #[test]
    fn extension_check_is_case_insensitive() {
        let image = temp_image("JPG");
        let client = Arc::new(MockChatClient::new(&success_reply(&["Brot"])));
        let agent = OcrAgent::new(ocr_settings(), client);

        let result = agent.ask(&AgentRequest::Ocr {
            image: image.path().to_path_buf(),
        });
        assert!(result.is_ok());
    }

    #[test]
    fn wrong_request_variant_is_invalid_request() {
        let client = Arc::new(MockChatClient::new(&success_reply(&["Brot"])));
        let agent = OcrAgent::new(ocr_settings(), client.clone());

        let prior = decode_ocr_response(&success_reply(&["Brot"])).unwrap();
        let result = agent.ask(&AgentRequest::Correction { prior });

        assert!(matches!(result, Err(AgentError::InvalidRequest(_))));
        assert_eq!(client.chat_calls(), 0);
    }

    #[test]
    fn unreachable_backend_fails_before_validation() {
        let client = Arc::new(MockChatClient::unreachable());
        let agent = OcrAgent::new(ocr_settings(), client.clone());

        // Even a nonsense path reports BackendUnavailable first.
        let result = agent.ask(&AgentRequest::Ocr {
            image: "/no/such/receipt.jpg".into(),
        });

        assert!(matches!(result, Err(AgentError::BackendUnavailable)));
        assert_eq!(client.chat_calls(), 0);
    }

    #[test]
    fn malformed_reply_carries_raw_text() {
        let image = temp_image("png");
        let client = Arc::new(MockChatClient::new("not json at all"));
        let agent = OcrAgent::new(ocr_settings(), client);

        let result = agent.ask(&AgentRequest::Ocr {
            image: image.path().to_path_buf(),
        });

        match result {
            Err(AgentError::MalformedResponse { raw, .. }) => {
                assert_eq!(raw, "not json at all");
            }
            other => panic!("expected MalformedResponse, got {other:?}"),
        }
    }
}
