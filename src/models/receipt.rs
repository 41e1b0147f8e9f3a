use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::{ProcessingStatus, ProductCategory};
use super::product::Product;
use super::ModelError;

/// Hyphen-separated lowercase-hex groups with a fixed prefix.
static RECEIPT_ID_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^receipt-[0-9a-f]+-[0-9a-f]+-[0-9a-f]+-[0-9a-f]+$")
        .expect("receipt id pattern is valid")
});

/// Validated receipt identifier.
///
/// The pattern is enforced at construction — a `ReceiptId` in hand is
/// always well-formed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ReceiptId(String);

impl ReceiptId {
    pub fn new(id: impl Into<String>) -> Result<Self, ModelError> {
        let id = id.into();
        if RECEIPT_ID_PATTERN.is_match(&id) {
            Ok(Self(id))
        } else {
            Err(ModelError::InvalidReceiptId(id))
        }
    }

    /// Generate a fresh identifier from a v4 UUID's hex digits.
    pub fn generate() -> Self {
        let hex = Uuid::new_v4().simple().to_string();
        Self(format!(
            "receipt-{}-{}-{}-{}",
            &hex[0..8],
            &hex[8..12],
            &hex[12..16],
            &hex[16..24],
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ReceiptId {
    type Error = ModelError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ReceiptId> for String {
    fn from(id: ReceiptId) -> Self {
        id.0
    }
}

impl std::fmt::Display for ReceiptId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// The assembled record of one understood receipt.
///
/// Only the pipeline orchestrator constructs this, and only after every
/// stage gate has passed. There are no mutating methods — a `Receipt` is
/// final once built.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Receipt {
    pub receipt_id: ReceiptId,
    pub ocr_status: ProcessingStatus,
    pub store_name: Option<String>,
    pub store_address: Option<String>,
    pub date_time: Option<DateTime<Utc>>,
    /// One category per line item, in line-item order.
    pub category: Vec<ProductCategory>,
    pub products: Vec<Product>,
}
