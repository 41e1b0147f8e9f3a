//! Per-agent configuration: model identity, prompt template, backend kind,
//! and the structured-output schema.
//!
//! The schema is required at construction — a settings value in hand is
//! always complete, so no decode can ever run without one. This folds the
//! original two-phase "set the schema later" initialization into the
//! builder.

use std::path::{Path, PathBuf};

use serde_json::Value;
use thiserror::Error;

/// Which inference backend an agent talks to.
///
/// Ollama is the single supported value today; the guard in each agent's
/// `ask` keeps the contract explicit should another kind ever be added.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BackendKind {
    #[default]
    Ollama,
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ollama => write!(f, "ollama"),
        }
    }
}

/// Errors constructing agent settings.
///
/// A missing prompt file is a configuration error, not a runtime one —
/// it surfaces here, before any pipeline run.
#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("Prompt file {0} is not found")]
    PromptFileNotFound(PathBuf),

    #[error("Prompt file {path} cannot be read: {source}")]
    PromptFileUnreadable {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Agent settings are missing a model identifier")]
    MissingModel,

    #[error("Agent settings are missing a prompt template")]
    MissingPrompt,

    #[error("Agent settings are missing a response schema")]
    MissingSchema,
}

/// Immutable configuration of one inference agent.
#[derive(Debug, Clone)]
pub struct AgentSettings {
    model: String,
    backend: BackendKind,
    prompt_template: String,
    response_schema: Value,
}

impl AgentSettings {
    pub fn builder() -> AgentSettingsBuilder {
        AgentSettingsBuilder::default()
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn backend(&self) -> BackendKind {
        self.backend
    }

    pub fn prompt_template(&self) -> &str {
        &self.prompt_template
    }

    pub fn response_schema(&self) -> &Value {
        &self.response_schema
    }
}

enum PromptSource {
    Inline(String),
    File(PathBuf),
}

/// Builder for [`AgentSettings`]. `build()` fails unless model, prompt,
/// and response schema are all present.
#[derive(Default)]
pub struct AgentSettingsBuilder {
    model: Option<String>,
    backend: BackendKind,
    prompt: Option<PromptSource>,
    response_schema: Option<Value>,
}

impl AgentSettingsBuilder {
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn backend(mut self, backend: BackendKind) -> Self {
        self.backend = backend;
        self
    }

    /// Use an inline template string as the prompt.
    pub fn prompt_template(mut self, template: impl Into<String>) -> Self {
        self.prompt = Some(PromptSource::Inline(template.into()));
        self
    }

    /// Load the prompt from a UTF-8 text file at build time.
    pub fn prompt_file(mut self, path: impl AsRef<Path>) -> Self {
        self.prompt = Some(PromptSource::File(path.as_ref().to_path_buf()));
        self
    }

    pub fn response_schema(mut self, schema: Value) -> Self {
        self.response_schema = Some(schema);
        self
    }

    pub fn build(self) -> Result<AgentSettings, SettingsError> {
        let model = self.model.filter(|m| !m.is_empty()).ok_or(SettingsError::MissingModel)?;
        let response_schema = self.response_schema.ok_or(SettingsError::MissingSchema)?;

        let prompt_template = match self.prompt.ok_or(SettingsError::MissingPrompt)? {
            PromptSource::Inline(template) => template,
            PromptSource::File(path) => {
                if !path.exists() {
                    return Err(SettingsError::PromptFileNotFound(path));
                }
                std::fs::read_to_string(&path)
                    .map_err(|source| SettingsError::PromptFileUnreadable { path, source })?
            }
        };

        Ok(AgentSettings {
            model,
            backend: self.backend,
            prompt_template,
            response_schema,
        })
    }
}
