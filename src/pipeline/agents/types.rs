//! The uniform contract every inference agent implements.

use std::path::PathBuf;

use super::response::OcrResponse;
use super::settings::{AgentSettings, BackendKind};
use super::AgentError;
use crate::pipeline::ollama_types::ChatClient;

/// Request payload of one agent call.
///
/// Tagged by stage — handing an agent the wrong variant is an
/// `InvalidRequest`, the typed rendition of a missing or wrong-shaped
/// request key.
#[derive(Debug, Clone)]
pub enum AgentRequest {
    /// OCR: read the receipt photo at `image`.
    Ocr { image: PathBuf },
    /// Correction: fix the content of a prior structured result.
    Correction { prior: OcrResponse },
    /// Translation: rewrite product names between languages.
    Translation {
        prior: OcrResponse,
        source_lang: String,
        target_lang: String,
    },
}

/// One inference unit: model identity + prompt template + schema
/// validation, specialized per stage by request shape.
pub trait Agent {
    /// Map a request to a validated structured response.
    ///
    /// Uniform sequence: backend-kind guard, liveness probe, request
    /// validation, prompt assembly, backend chat with the response schema
    /// as a structured-output constraint, strict decode. No retries —
    /// a failed call is reported upward unchanged.
    fn ask(&self, request: &AgentRequest) -> Result<OcrResponse, AgentError>;

    /// Cheap liveness probe against the inference backend.
    ///
    /// Never errors — probe failures are converted to `false`.
    fn heartbeat(&self) -> bool;
}

/// Shared liveness probe: the backend is alive iff it can list models.
pub(crate) fn backend_alive(client: &dyn ChatClient) -> bool {
    client.list_models().is_ok()
}

/// Shared backend-kind guard.
pub(crate) fn ensure_backend_supported(settings: &AgentSettings) -> Result<(), AgentError> {
    match settings.backend() {
        BackendKind::Ollama => Ok(()),
    }
}
