use std::path::PathBuf;

/// Application-level constants
pub const APP_NAME: &str = "Beleg";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default model identities per agent.
///
/// OCR needs a vision-capable model; correction and translation are
/// text-only and run on a smaller model.
pub const DEFAULT_OCR_MODEL: &str = "llama3.2-vision:11b";
pub const DEFAULT_CORRECTOR_MODEL: &str = "llama3.1:8b";
pub const DEFAULT_TRANSLATOR_MODEL: &str = "llama3.1:8b";

/// Fixed language pair for the translation stage. Orchestration policy,
/// not derived from the receipt.
pub const DEFAULT_SOURCE_LANGUAGE: &str = "German";
pub const DEFAULT_TARGET_LANGUAGE: &str = "English";

/// Per-request timeout for backend calls. Vision OCR on CPU is slow.
pub const REQUEST_TIMEOUT_SECS: u64 = 300;

/// Base URL of the local Ollama instance.
/// `BELEG_OLLAMA_URL` overrides the default for non-standard ports.
pub fn ollama_base_url() -> String {
    std::env::var("BELEG_OLLAMA_URL").unwrap_or_else(|_| "http://localhost:11434".to_string())
}

/// Directory holding the agent prompt template files.
/// `BELEG_PROMPTS_DIR` overrides the default relative `prompts/`.
pub fn prompts_dir() -> PathBuf {
    std::env::var("BELEG_PROMPTS_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("prompts"))
}

pub fn ocr_prompt_file() -> PathBuf {
    prompts_dir().join("ocr.txt")
}

pub fn corrector_prompt_file() -> PathBuf {
    prompts_dir().join("corrector.txt")
}

pub fn translator_prompt_file() -> PathBuf {
    prompts_dir().join("translator.txt")
}

/// Default tracing filter when RUST_LOG is unset.
pub fn default_log_filter() -> String {
    "beleg=info".to_string()
}
