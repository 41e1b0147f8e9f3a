//! Ollama wire contract, transport error taxonomy, and endpoint validation.
//!
//! The backend boundary is two operations: `POST /api/chat` (one user
//! message, optional base64 images, optional structured-output schema) and
//! `GET /api/tags` (liveness + model inventory). Everything above this
//! module talks through the [`ChatClient`] trait.

use serde::{Deserialize, Serialize};
use serde_json::Value;

// ──────────────────────────────────────────────
// Chat seam
// ──────────────────────────────────────────────

/// The inference backend abstraction every agent talks through.
///
/// `chat` sends exactly one user message and blocks until the backend
/// replies. `format` carries the JSON schema the reply must conform to
/// (structured output). Sampling is pinned to temperature 0 by the
/// implementation — extraction must be deterministic.
pub trait ChatClient: Send + Sync {
    fn chat(
        &self,
        model: &str,
        prompt: &str,
        images: &[String],
        format: &Value,
    ) -> Result<String, OllamaError>;

    /// Model inventory from `/api/tags`; doubles as the liveness probe.
    fn list_models(&self) -> Result<Vec<String>, OllamaError>;
}

// ──────────────────────────────────────────────
// Request/response bodies
// ──────────────────────────────────────────────

/// A single role-tagged message in a chat request.
#[derive(Debug, Clone, Serialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
    /// Base64-encoded images (only for user messages).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<String>>,
}

impl ChatMessage {
    pub fn user(content: &str, images: &[String]) -> Self {
        Self {
            role: "user".to_string(),
            content: content.to_string(),
            images: if images.is_empty() {
                None
            } else {
                Some(images.to_vec())
            },
        }
    }
}

/// Sampling options for a chat request.
#[derive(Debug, Clone, Serialize)]
pub struct ChatOptions {
    /// 0.0 for deterministic extraction.
    pub temperature: f32,
}

impl Default for ChatOptions {
    fn default() -> Self {
        Self { temperature: 0.0 }
    }
}

/// Request body for Ollama `POST /api/chat`.
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub stream: bool,
    /// Structured-output constraint: a JSON schema the reply must satisfy.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<Value>,
    pub options: ChatOptions,
}

/// Response body from Ollama `POST /api/chat`.
#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    pub message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
pub struct ChatResponseMessage {
    pub content: String,
}

/// Raw response from `GET /api/tags`.
#[derive(Debug, Deserialize)]
pub(crate) struct TagsResponse {
    pub models: Vec<TagModel>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TagModel {
    pub name: String,
}

// ──────────────────────────────────────────────
// Error taxonomy
// ──────────────────────────────────────────────

/// Dedicated error type for Ollama transport operations.
#[derive(Debug, thiserror::Error)]
pub enum OllamaError {
    #[error("Ollama is not running at {0}")]
    NotReachable(String),

    #[error("Ollama returned an error (HTTP {status}): {body}")]
    ApiError { status: u16, body: String },

    #[error("Request timed out after {0} seconds")]
    Timeout(u64),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Response parsing error: {0}")]
    ResponseParsing(String),

    #[error("Only localhost connections are allowed — receipt images never leave the machine")]
    NonLocalEndpoint,

    #[error("Invalid URL format")]
    InvalidUrl,
}

// ──────────────────────────────────────────────
// Endpoint validation
// ──────────────────────────────────────────────

/// Validate that a base URL points to localhost only.
///
/// Receipt photos routinely carry card fragments and loyalty identifiers,
/// so the client refuses to send them anywhere but the local machine.
/// Accepts: localhost, 127.0.0.1, [::1] (IPv6 loopback).
/// Rejects: any other host, malformed URLs.
pub fn validate_base_url(url: &str) -> Result<(), OllamaError> {
    let after_scheme = url
        .strip_prefix("http://")
        .or_else(|| url.strip_prefix("https://"))
        .ok_or(OllamaError::InvalidUrl)?;

    let host = after_scheme
        .split(':')
        .next()
        .unwrap_or("")
        .split('/')
        .next()
        .unwrap_or("");

    // IPv6 bracket notation: [::1]
    let host_clean = if after_scheme.starts_with('[') {
        after_scheme
            .split(']')
            .next()
            .unwrap_or("")
            .trim_start_matches('[')
    } else {
        host
    };

    match host_clean {
        "localhost" | "127.0.0.1" | "::1" => Ok(()),
        _ => Err(OllamaError::NonLocalEndpoint),
    }
}
