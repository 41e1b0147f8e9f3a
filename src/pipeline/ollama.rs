//! Blocking HTTP client for a local Ollama instance, plus the scripted
//! mock used throughout the test suite.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use serde_json::Value;

use super::ollama_types::{
    validate_base_url, ChatClient, ChatMessage, ChatOptions, ChatRequest, ChatResponse,
    OllamaError, TagsResponse,
};

/// Ollama HTTP client for local LLM inference.
///
/// Each pipeline run may share one client across its agents — the client
/// holds only immutable configuration and is safe to use from multiple
/// threads.
pub struct OllamaClient {
    base_url: String,
    client: reqwest::blocking::Client,
    timeout_secs: u64,
}

impl OllamaClient {
    /// Create a client pointing at a local Ollama instance.
    ///
    /// Non-loopback URLs are rejected at construction.
    pub fn new(base_url: &str, timeout_secs: u64) -> Result<Self, OllamaError> {
        validate_base_url(base_url)?;

        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            timeout_secs,
        })
    }

    /// Default Ollama instance from crate configuration.
    pub fn default_local() -> Result<Self, OllamaError> {
        Self::new(
            &crate::config::ollama_base_url(),
            crate::config::REQUEST_TIMEOUT_SECS,
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn map_send_error(&self, e: reqwest::Error) -> OllamaError {
        if e.is_connect() {
            OllamaError::NotReachable(self.base_url.clone())
        } else if e.is_timeout() {
            OllamaError::Timeout(self.timeout_secs)
        } else {
            OllamaError::Network(e.to_string())
        }
    }
}

impl ChatClient for OllamaClient {
    fn chat(
        &self,
        model: &str,
        prompt: &str,
        images: &[String],
        format: &Value,
    ) -> Result<String, OllamaError> {
        let url = format!("{}/api/chat", self.base_url);
        let body = ChatRequest {
            model: model.to_string(),
            messages: vec![ChatMessage::user(prompt, images)],
            stream: false,
            format: Some(format.clone()),
            options: ChatOptions::default(),
        };

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .map_err(|e| self.map_send_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(OllamaError::ApiError {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ChatResponse = response
            .json()
            .map_err(|e| OllamaError::ResponseParsing(e.to_string()))?;

        Ok(parsed.message.content)
    }

    fn list_models(&self) -> Result<Vec<String>, OllamaError> {
        let url = format!("{}/api/tags", self.base_url);

        let response = self
            .client
            .get(&url)
            .send()
            .map_err(|e| self.map_send_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(OllamaError::ApiError {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: TagsResponse = response
            .json()
            .map_err(|e| OllamaError::ResponseParsing(e.to_string()))?;

        Ok(parsed.models.into_iter().map(|m| m.name).collect())
    }
}

// ──────────────────────────────────────────────
// MockChatClient (testing)
// ──────────────────────────────────────────────

/// Scripted mock backend — returns queued responses in order.
///
/// Each `chat` call pops the next scripted response, so one mock can
/// stand in for every stage of a multi-agent run. The call counter lets
/// tests assert that gated-out stages never reached the backend.
pub struct MockChatClient {
    responses: Mutex<Vec<String>>,
    available_models: Vec<String>,
    alive: bool,
    chat_calls: AtomicUsize,
}

impl MockChatClient {
    pub fn new(response: &str) -> Self {
        Self::with_responses(vec![response.to_string()])
    }

    /// Script one response per expected chat call, in call order.
    pub fn with_responses(responses: Vec<String>) -> Self {
        let mut queue = responses;
        queue.reverse();
        Self {
            responses: Mutex::new(queue),
            available_models: vec![
                "llama3.2-vision:11b".to_string(),
                "llama3.1:8b".to_string(),
            ],
            alive: true,
            chat_calls: AtomicUsize::new(0),
        }
    }

    /// A backend whose liveness probe fails.
    pub fn unreachable() -> Self {
        let mut mock = Self::with_responses(vec![]);
        mock.alive = false;
        mock
    }

    pub fn with_models(mut self, models: Vec<String>) -> Self {
        self.available_models = models;
        self
    }

    /// How many chat requests actually reached the backend.
    pub fn chat_calls(&self) -> usize {
        self.chat_calls.load(Ordering::SeqCst)
    }
}

impl ChatClient for MockChatClient {
    fn chat(
        &self,
        _model: &str,
        _prompt: &str,
        _images: &[String],
        _format: &Value,
    ) -> Result<String, OllamaError> {
        self.chat_calls.fetch_add(1, Ordering::SeqCst);
        self.responses
            .lock()
            .expect("mock response queue")
            .pop()
            .ok_or_else(|| OllamaError::Network("mock response queue is empty".to_string()))
    }

    fn list_models(&self) -> Result<Vec<String>, OllamaError> {
        if !self.alive {
            return Err(OllamaError::NotReachable("mock".to_string()));
        }
        Ok(self.available_models.clone())
    }
}
