//! Corrector agent — a truth-check pass over the OCR output.
//!
//! Receipts abbreviate aggressively ("VOLLK.BROT 500G"); the corrector
//! rewrites each product name into a human-readable form without adding
//! or removing line items. The count invariant is enforced by the
//! pipeline gate, not here.

use std::sync::Arc;

use super::prompt::{render, PRODUCT_LIST_PLACEHOLDER, SERIALIZED_OBJECT_PLACEHOLDER};
use super::response::{decode_ocr_response, ocr_response_schema, OcrResponse};
use super::settings::{AgentSettings, SettingsError};
use super::types::{backend_alive, ensure_backend_supported, Agent, AgentRequest};
use super::AgentError;
use crate::config;
use crate::pipeline::ollama_types::ChatClient;

pub struct CorrectorAgent {
    settings: AgentSettings,
    client: Arc<dyn ChatClient>,
}

impl CorrectorAgent {
    pub fn new(settings: AgentSettings, client: Arc<dyn ChatClient>) -> Self {
        Self { settings, client }
    }

    pub fn with_defaults(client: Arc<dyn ChatClient>) -> Result<Self, SettingsError> {
        let settings = AgentSettings::builder()
            .model(config::DEFAULT_CORRECTOR_MODEL)
            .prompt_file(config::corrector_prompt_file())
            .response_schema(ocr_response_schema())
            .build()?;
        Ok(Self::new(settings, client))
    }
}

impl Agent for CorrectorAgent {
    fn ask(&self, request: &AgentRequest) -> Result<OcrResponse, AgentError> {
        ensure_backend_supported(&self.settings)?;

        if !self.heartbeat() {
            return Err(AgentError::BackendUnavailable);
        }

        let prior = match request {
            AgentRequest::Correction { prior } => prior,
            _ => {
                return Err(AgentError::InvalidRequest(
                    "The corrector agent expects a correction request".to_string(),
                ))
            }
        };

        let products = prior.non_empty_products().ok_or_else(|| {
            AgentError::InvalidRequest("The product list should be non-zero".to_string())
        })?;

        let product_list: String = products
            .iter()
            .map(|product| format!("- {}\n", product.name))
            .collect();
        let serialized = serde_json::to_string(prior).map_err(|e| {
            AgentError::InvalidRequest(format!("Prior result cannot be serialized: {e}"))
        })?;

        let content = render(
            self.settings.prompt_template(),
            &[
                (PRODUCT_LIST_PLACEHOLDER, product_list.as_str()),
                (SERIALIZED_OBJECT_PLACEHOLDER, serialized.as_str()),
            ],
        );

        let _span = tracing::info_span!(
            "corrector_ask",
            model = %self.settings.model(),
            products = products.len(),
        )
        .entered();
        let start = std::time::Instant::now();

        let raw = self.client.chat(
            self.settings.model(),
            &content,
            &[],
            self.settings.response_schema(),
        )?;

        let response = decode_ocr_response(&raw)?;

        tracing::info!(
            model = %self.settings.model(),
            elapsed_ms = %start.elapsed().as_millis(),
            products = response.product_count(),
            "Correction complete"
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

    fn corrector_settings(template: &str) -> AgentSettings {
        AgentSettings::builder()
            .model("llama3.1:8b")
            .prompt_template(template)
            .response_schema(ocr_response_schema())
            .build()
            .unwrap()
    }

    fn reply(product_names: &[&str]) -> String {
        let products: Vec<serde_json::Value> = product_names
            .iter()
            .map(|name| {
                json!({
                    "name": name,
                    "category": "food",
                    "price": 2.49,
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

    fn prior(product_names: &[&str]) -> OcrResponse {
        decode_ocr_response(&reply(product_names)).unwrap()
    }

    #[test]
    fn corrects_prior_result() {
        let client = Arc::new(MockChatClient::new(&reply(&[
            "Vollkornbrot 500g",
            "Frische Milch 1L",
        ])));
        let agent = CorrectorAgent::new(
            corrector_settings("Fix: {% PRODUCT_LIST %} {% SERIALIZED_OBJECT_JSON %}"),
            client.clone(),
        );

        let response = agent
            .ask(&AgentRequest::Correction {
                prior: prior(&["VOLLK.BROT", "MILCH 1L"]),
            })
            .unwrap();

        assert_eq!(response.ocr_status, OcrStatus::Success);
        assert_eq!(response.product_count(), 2);
        assert_eq!(client.chat_calls(), 1);
    }

    #[test]
    fn empty_product_list_never_reaches_backend() {
        let client = Arc::new(MockChatClient::new(&reply(&["x"])));
        let agent = CorrectorAgent::new(corrector_settings("t"), client.clone());

        let result = agent.ask(&AgentRequest::Correction {
            prior: prior(&[]),
        });

        match result {
            Err(AgentError::InvalidRequest(msg)) => {
                assert!(msg.contains("non-zero"), "{msg}");
            }
            other => panic!("expected InvalidRequest, got {other:?}"),
        }
        assert_eq!(client.chat_calls(), 0);
    }

    #[test]
    fn wrong_request_variant_is_invalid_request() {
        let client = Arc::new(MockChatClient::new(&reply(&["x"])));
        let agent = CorrectorAgent::new(corrector_settings("t"), client.clone());

        let result = agent.ask(&AgentRequest::Ocr {
            image: "/tmp/receipt.jpg".into(),
        });

        assert!(matches!(result, Err(AgentError::InvalidRequest(_))));
        assert_eq!(client.chat_calls(), 0);
    }

    #[test]
    fn unreachable_backend_reported_first() {
        let client = Arc::new(MockChatClient::unreachable());
        let agent = CorrectorAgent::new(corrector_settings("t"), client.clone());

        let result = agent.ask(&AgentRequest::Correction {
            prior: prior(&["Brot"]),
        });

        assert!(matches!(result, Err(AgentError::BackendUnavailable)));
        assert_eq!(client.chat_calls(), 0);
    }

    #[test]
    fn malformed_reply_is_rejected() {
        let client = Arc::new(MockChatClient::new("{\"oops\": true}"));
        let agent = CorrectorAgent::new(corrector_settings("t"), client);

        let result = agent.ask(&AgentRequest::Correction {
            prior: prior(&["Brot"]),
        });

        assert!(matches!(
            result,
            Err(AgentError::MalformedResponse { .. })
        ));
    }
}
