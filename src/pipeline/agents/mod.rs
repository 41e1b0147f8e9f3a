pub mod corrector;
pub mod ocr;
pub mod prompt;
pub mod response;
pub mod settings;
pub mod translator;
pub mod types;

pub use corrector::*;
pub use ocr::*;
pub use prompt::*;
pub use response::*;
pub use settings::*;
pub use translator::*;
pub use types::*;

use std::path::PathBuf;

use thiserror::Error;

use super::ollama_types::OllamaError;

/// Failure taxonomy of the agent contract, uniform across all agents.
///
/// `UnsupportedBackend` is a configuration error and never retryable;
/// `BackendUnavailable` is transient and the caller may retry the whole
/// run; `InvalidRequest` and `ResourceNotFound` are caller errors;
/// `MalformedResponse` means the backend replied but the reply failed
/// schema validation. No agent retries internally.
#[derive(Error, Debug)]
pub enum AgentError {
    #[error("Backend kind '{0}' is not supported")]
    UnsupportedBackend(String),

    #[error("The inference backend is not reachable")]
    BackendUnavailable,

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Input file cannot be found in the filesystem: {0}")]
    ResourceNotFound(PathBuf),

    #[error("Malformed backend response ({detail}); raw reply: {raw}")]
    MalformedResponse { detail: String, raw: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Backend(#[from] OllamaError),

    #[error(transparent)]
    Settings(#[from] settings::SettingsError),
}
