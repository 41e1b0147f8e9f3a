pub mod agents;
pub mod ollama;
pub mod ollama_types;
pub mod orchestrator;

pub use ollama::*;
pub use ollama_types::*;
pub use orchestrator::*;

use thiserror::Error;

use self::agents::settings::SettingsError;
use self::agents::AgentError;
use self::orchestrator::PipelineStage;

/// Errors raised by the pipeline orchestrator.
///
/// A gate failure means a stage succeeded at the backend level but
/// violated a cross-stage invariant. Agent and transport failures pass
/// through transparently. The only recovery strategy is re-running the
/// whole pipeline from the image.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("The OCR assistant has failed. Please re-run.")]
    OcrFailed,

    #[error("The corrector assistant has failed. Please re-run.")]
    CorrectionFailed,

    #[error("The translator assistant has failed. Please re-run.")]
    TranslationFailed,

    #[error(
        "The {stage} stage changed the product count (expected {expected}, got {actual}). Please re-run."
    )]
    CountMismatch {
        stage: PipelineStage,
        expected: usize,
        actual: usize,
    },

    #[error(transparent)]
    Agent(#[from] AgentError),

    #[error(transparent)]
    Settings(#[from] SettingsError),

    #[error(transparent)]
    Backend(#[from] ollama_types::OllamaError),
}
