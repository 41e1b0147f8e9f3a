//! Beleg — receipt understanding as an API.
//!
//! A photographed purchase receipt goes through a chain of independent
//! inference agents (vision OCR, correction, translation), each served by
//! a local Ollama instance, and comes out as a validated [`Receipt`]
//! record. The chain is strictly sequential and gated: every stage must
//! report success and preserve the line-item count before the next stage
//! runs.
//!
//! ```no_run
//! let receipt = beleg::run_pipeline("scans/receipt-0017.jpg")?;
//! println!("{} items from {:?}", receipt.products.len(), receipt.store_name);
//! # Ok::<(), beleg::PipelineError>(())
//! ```

pub mod config;
pub mod models;
pub mod pipeline;

pub use models::{Product, Receipt, ReceiptId};
pub use pipeline::orchestrator::{run_pipeline, LanguagePair, Pipeline};
pub use pipeline::PipelineError;

use tracing_subscriber::EnvFilter;

/// Initialize tracing for hosts that have no subscriber of their own.
///
/// Honors `RUST_LOG`; falls back to the crate default filter.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();
}
