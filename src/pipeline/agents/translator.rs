//! Translator agent — rewrites product names between languages.
//!
//! The language pair arrives with the request; it is orchestration
//! policy, never agent configuration.

use std::sync::Arc;

use super::prompt::{
    render, SERIALIZED_OBJECT_PLACEHOLDER, SOURCE_LANG_PLACEHOLDER, TARGET_LANG_PLACEHOLDER,
};
use super::response::{decode_ocr_response, ocr_response_schema, OcrResponse};
use super::settings::{AgentSettings, SettingsError};
use super::types::{backend_alive, ensure_backend_supported, Agent, AgentRequest};
use super::AgentError;
use crate::config;
use crate::pipeline::ollama_types::ChatClient;

pub struct TranslatorAgent {
    settings: AgentSettings,
    client: Arc<dyn ChatClient>,
}

impl TranslatorAgent {
    pub fn new(settings: AgentSettings, client: Arc<dyn ChatClient>) -> Self {
        Self { settings, client }
    }

    pub fn with_defaults(client: Arc<dyn ChatClient>) -> Result<Self, SettingsError> {
        let settings = AgentSettings::builder()
            .model(config::DEFAULT_TRANSLATOR_MODEL)
            .prompt_file(config::translator_prompt_file())
            .response_schema(ocr_response_schema())
            .build()?;
        Ok(Self::new(settings, client))
    }
}

impl Agent for TranslatorAgent {
    fn ask(&self, request: &AgentRequest) -> Result<OcrResponse, AgentError> {
        ensure_backend_supported(&self.settings)?;

        if !self.heartbeat() {
            return Err(AgentError::BackendUnavailable);
        }

        let (prior, source_lang, target_lang) = match request {
            AgentRequest::Translation {
                prior,
                source_lang,
                target_lang,
            } => (prior, source_lang, target_lang),
            _ => {
                return Err(AgentError::InvalidRequest(
                    "The translator agent expects a translation request".to_string(),
                ))
            }
        };

        if prior.non_empty_products().is_none() {
            return Err(AgentError::InvalidRequest(
                "The product list should be non-zero".to_string(),
            ));
        }

        let serialized = serde_json::to_string(prior).map_err(|e| {
            AgentError::InvalidRequest(format!("Prior result cannot be serialized: {e}"))
        })?;

        let content = render(
            self.settings.prompt_template(),
            &[
                (SOURCE_LANG_PLACEHOLDER, source_lang.as_str()),
                (TARGET_LANG_PLACEHOLDER, target_lang.as_str()),
                (SERIALIZED_OBJECT_PLACEHOLDER, serialized.as_str()),
            ],
        );

        let _span = tracing::info_span!(
            "translator_ask",
            model = %self.settings.model(),
            source = %source_lang,
            target = %target_lang,
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
            "Translation complete"
        );

        Ok(response)
    }

    fn heartbeat(&self) -> bool {
        backend_alive(self.client.as_ref())
    }
}
