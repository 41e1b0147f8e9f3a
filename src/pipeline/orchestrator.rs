//! Pipeline orchestrator — sequences the agents, applies the inter-stage
//! gates, and assembles the final receipt record.
//!
//! Extracting → Correcting → Translating → Assembled, with failure
//! reachable from every state. Each arrow is gated: the stage must report
//! success, and from correction onward the line-item count must match the
//! previous stage — an agent may fix or translate content, never add or
//! remove items. The first gate that fails aborts the run; the caller's
//! only recovery is re-running the whole pipeline from the image.

use std::path::Path;
use std::sync::Arc;

use super::agents::{
    Agent, AgentRequest, CorrectorAgent, OcrAgent, OcrResponse, OcrStatus, TranslatorAgent,
};
use super::ollama::OllamaClient;
use super::ollama_types::ChatClient;
use super::PipelineError;
use crate::config;
use crate::models::{ProcessingStatus, Receipt, ReceiptId};

/// States of one pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    Extracting,
    Correcting,
    Translating,
    Assembled,
}

impl std::fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Extracting => write!(f, "extracting"),
            Self::Correcting => write!(f, "correcting"),
            Self::Translating => write!(f, "translating"),
            Self::Assembled => write!(f, "assembled"),
        }
    }
}

/// Fixed source/target languages for the translation stage.
///
/// Owned by the orchestrator as policy — the receipt itself never decides
/// what it gets translated into.
#[derive(Debug, Clone)]
pub struct LanguagePair {
    pub source: String,
    pub target: String,
}

impl Default for LanguagePair {
    fn default() -> Self {
        Self {
            source: config::DEFAULT_SOURCE_LANGUAGE.to_string(),
            target: config::DEFAULT_TARGET_LANGUAGE.to_string(),
        }
    }
}

/// One pipeline run's worth of agents and policy.
///
/// Each run owns its agent instances and intermediate values; nothing is
/// shared across runs, so separate runs may execute in parallel without
/// coordination.
pub struct Pipeline {
    ocr: OcrAgent,
    corrector: CorrectorAgent,
    translator: Option<TranslatorAgent>,
    languages: LanguagePair,
}

impl Pipeline {
    pub fn new(
        ocr: OcrAgent,
        corrector: CorrectorAgent,
        translator: Option<TranslatorAgent>,
        languages: LanguagePair,
    ) -> Self {
        Self {
            ocr,
            corrector,
            translator,
            languages,
        }
    }

    /// Wire the three default agents against one shared backend client.
    pub fn with_defaults(client: Arc<dyn ChatClient>) -> Result<Self, PipelineError> {
        Ok(Self::new(
            OcrAgent::with_defaults(client.clone())?,
            CorrectorAgent::with_defaults(client.clone())?,
            Some(TranslatorAgent::with_defaults(client)?),
            LanguagePair::default(),
        ))
    }

    /// Reduced variant: assemble directly after correction.
    pub fn without_translation(mut self) -> Self {
        self.translator = None;
        self
    }

    /// Run the agents in order and assemble the record.
    ///
    /// Never returns a partially-populated record — every error path is
    /// an `Err`, and the `Receipt` is only constructed once all gates
    /// have passed.
    pub fn run(&self, image_path: &Path) -> Result<Receipt, PipelineError> {
        let _span = tracing::info_span!("pipeline_run", image = %image_path.display()).entered();

        // Extracting
        let ocr_result = self.ocr.ask(&AgentRequest::Ocr {
            image: image_path.to_path_buf(),
        })?;
        if ocr_result.ocr_status != OcrStatus::Success {
            tracing::warn!(stage = %PipelineStage::Extracting, "OCR reported failure");
            return Err(PipelineError::OcrFailed);
        }

        // Correcting
        let corrected = self.corrector.ask(&AgentRequest::Correction {
            prior: ocr_result.clone(),
        })?;
        if corrected.ocr_status != OcrStatus::Success {
            tracing::warn!(stage = %PipelineStage::Correcting, "corrector reported failure");
            return Err(PipelineError::CorrectionFailed);
        }
        check_product_count(PipelineStage::Correcting, &ocr_result, &corrected)?;

        // Translating (optional stage)
        let last = match &self.translator {
            Some(translator) => {
                let translated = translator.ask(&AgentRequest::Translation {
                    prior: corrected.clone(),
                    source_lang: self.languages.source.clone(),
                    target_lang: self.languages.target.clone(),
                })?;
                if translated.ocr_status != OcrStatus::Success {
                    tracing::warn!(
                        stage = %PipelineStage::Translating,
                        "translator reported failure"
                    );
                    return Err(PipelineError::TranslationFailed);
                }
                check_product_count(PipelineStage::Translating, &corrected, &translated)?;
                translated
            }
            None => corrected,
        };

        // Assembled — the final validated stage is authoritative for the
        // record, translated line items included.
        let products = last.products.clone().unwrap_or_default();
        let category = products.iter().map(|product| product.category).collect();
        let receipt = Receipt {
            receipt_id: ReceiptId::generate(),
            ocr_status: ProcessingStatus::Success,
            store_name: last.store_name.clone(),
            store_address: last.store_address.clone(),
            date_time: last.date_time.map(|dt| dt.and_utc()),
            category,
            products,
        };

        tracing::info!(
            receipt_id = %receipt.receipt_id,
            products = receipt.products.len(),
            "Pipeline run assembled"
        );

        Ok(receipt)
    }
}

fn check_product_count(
    stage: PipelineStage,
    previous: &OcrResponse,
    current: &OcrResponse,
) -> Result<(), PipelineError> {
    let expected = previous.product_count();
    let actual = current.product_count();
    if expected != actual {
        tracing::warn!(stage = %stage, expected, actual, "product count changed across stages");
        return Err(PipelineError::CountMismatch {
            stage,
            expected,
            actual,
        });
    }
    Ok(())
}

/// Run the full default pipeline against the local Ollama instance.
///
/// The single entry point for callers that do not need custom wiring.
pub fn run_pipeline(image_path: impl AsRef<Path>) -> Result<Receipt, PipelineError> {
    let client: Arc<dyn ChatClient> = Arc::new(OllamaClient::default_local()?);
    let pipeline = Pipeline::with_defaults(client)?;
    pipeline.run(image_path.as_ref())
}
