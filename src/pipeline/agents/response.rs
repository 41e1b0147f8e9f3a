//! The structured response every agent returns, its strict decoder, and
//! the JSON schema handed to the backend as a structured-output
//! constraint.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::AgentError;
use crate::models::{Currency, Product, ProductCategory};

/// Sentinel sentences the model picks between for the status field.
///
/// Deliberately verbose: a first-person sentence measurably beats a bare
/// SUCCESS/FAILED token at getting vision models to admit defeat instead
/// of hallucinating line items.
pub const OCR_STATUS_SUCCESS: &str = "I CAN RECOGNIZE EVERY FIELD AND UNDERSTAND";
pub const OCR_STATUS_FAILED: &str = "I AM HAVING PROBLEM TO RECOGNIZE OR UNDERSTAND EVERYTHING";

/// Whether the model could read the receipt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OcrStatus {
    #[serde(rename = "I CAN RECOGNIZE EVERY FIELD AND UNDERSTAND")]
    Success,
    #[serde(rename = "I AM HAVING PROBLEM TO RECOGNIZE OR UNDERSTAND EVERYTHING")]
    Failed,
}

/// Structured reply of one agent call.
///
/// All three agents share this shape — the corrector and translator
/// return a fixed-up rendition of the same fields. When `ocr_status` is
/// `Success`, callers expect `products` to be present; that invariant is
/// checked at the call sites (agent preconditions and pipeline gates),
/// not by the type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OcrResponse {
    pub ocr_status: OcrStatus,
    pub store_name: Option<String>,
    pub store_address: Option<String>,
    pub date_time: Option<NaiveDateTime>,
    pub products: Option<Vec<Product>>,
    pub total_price: Option<f64>,
    pub total_price_currency: Option<Currency>,
}

impl OcrResponse {
    pub fn product_count(&self) -> usize {
        self.products.as_ref().map_or(0, Vec::len)
    }

    /// The non-empty line-item list, or `None` when absent or empty.
    pub fn non_empty_products(&self) -> Option<&[Product]> {
        self.products
            .as_deref()
            .filter(|products| !products.is_empty())
    }
}

/// Strictly parse-and-validate a raw backend reply.
///
/// Either the full structure validates or the call fails — there is no
/// partial or lenient decoding. The offending raw text rides along in the
/// error for diagnostics.
pub fn decode_ocr_response(raw: &str) -> Result<OcrResponse, AgentError> {
    serde_json::from_str(raw).map_err(|e| AgentError::MalformedResponse {
        detail: e.to_string(),
        raw: raw.to_string(),
    })
}

/// JSON schema of [`OcrResponse`], sent as the chat `format` constraint.
///
/// Enum lists are derived from the domain enums so the schema can never
/// drift from what the decoder accepts.
pub fn ocr_response_schema() -> Value {
    let categories: Vec<&str> = ProductCategory::all().iter().map(|c| c.as_str()).collect();
    let currencies: Vec<&str> = Currency::all().iter().map(|c| c.symbol()).collect();

    json!({
        "type": "object",
        "properties": {
            "ocr_status": {
                "type": "string",
                "enum": [OCR_STATUS_SUCCESS, OCR_STATUS_FAILED],
            },
            "store_name": {"type": ["string", "null"]},
            "store_address": {"type": ["string", "null"]},
            "date_time": {
                "type": ["string", "null"],
                "description": "Purchase date and time, ISO 8601, e.g. 2024-05-12T18:33:00",
            },
            "products": {
                "type": ["array", "null"],
                "items": {
                    "type": "object",
                    "properties": {
                        "name": {"type": "string"},
                        "category": {"type": "string", "enum": categories},
                        "price": {"type": "number"},
                        "price_currency": {"type": "string", "enum": currencies},
                        "discount": {"type": ["number", "null"]},
                    },
                    "required": ["name", "category", "price", "price_currency", "discount"],
                },
            },
            "total_price": {"type": ["number", "null"]},
            "total_price_currency": {"type": ["string", "null"]},
        },
        "required": [
            "ocr_status",
            "store_name",
            "store_address",
            "date_time",
            "products",
            "total_price",
            "total_price_currency",
        ],
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_reply(status: &str, product_names: &[&str]) -> String {
        let products: Vec<Value> = product_names
            .iter()
            .map(|name| {
                json!({
                    "name": name,
                    "category": "food",
                    "price": 2.49,
                    "price_currency": "€",
                    "discount": null,
                })
            })
            .collect();

        json!({
            "ocr_status": status,
            "store_name": "Edeka",
            "store_address": "Hauptstr. 1, Berlin",
            "date_time": "2024-05-12T18:33:00",
            "products": products,
            "total_price": 4.98,
            "total_price_currency": "€",
        })
        .to_string()
    }

    #[test]
    fn decodes_successful_reply() {
        let raw = sample_reply(OCR_STATUS_SUCCESS, &["Brot", "Milch"]);
        let response = decode_ocr_response(&raw).unwrap();

        assert_eq!(response.ocr_status, OcrStatus::Success);
        assert_eq!(response.product_count(), 2);
        assert_eq!(response.store_name.as_deref(), Some("Edeka"));
        assert!(response.date_time.is_some());
    }

    #[test]
    fn decodes_failed_reply() {
        let raw = json!({
            "ocr_status": OCR_STATUS_FAILED,
            "store_name": null,
            "store_address": null,
            "date_time": null,
            "products": null,
            "total_price": null,
            "total_price_currency": null,
        })
        .to_string();

        let response = decode_ocr_response(&raw).unwrap();
        assert_eq!(response.ocr_status, OcrStatus::Failed);
        assert_eq!(response.product_count(), 0);
        assert!(response.non_empty_products().is_none());
    }

    #[test]
    fn rejects_invalid_json_with_raw_text() {
        let raw = "I could not produce JSON, sorry.";
        let err = decode_ocr_response(raw).unwrap_err();
        match err {
            AgentError::MalformedResponse { raw: carried, .. } => {
                assert_eq!(carried, raw);
            }
            other => panic!("expected MalformedResponse, got {other:?}"),
        }
    }

    #[test]
    fn rejects_unknown_status_sentence() {
        let raw = sample_reply("MAYBE", &["Brot"]);
        assert!(matches!(
            decode_ocr_response(&raw),
            Err(AgentError::MalformedResponse { .. })
        ));
    }

    #[test]
    fn rejects_missing_status_field() {
        let raw = r#"{"store_name": "Edeka"}"#;
        assert!(decode_ocr_response(raw).is_err());
    }

    #[test]
    fn empty_product_list_is_not_non_empty() {
        let raw = sample_reply(OCR_STATUS_SUCCESS, &[]);
        let response = decode_ocr_response(&raw).unwrap();
        assert_eq!(response.product_count(), 0);
        assert!(response.non_empty_products().is_none());
    }

    #[test]
    fn status_sentinels_match_serde_renames() {
        let success = serde_json::to_string(&OcrStatus::Success).unwrap();
        assert_eq!(success, format!("\"{OCR_STATUS_SUCCESS}\""));

        let failed = serde_json::to_string(&OcrStatus::Failed).unwrap();
        assert_eq!(failed, format!("\"{OCR_STATUS_FAILED}\""));
    }

    #[test]
    fn schema_lists_both_status_sentences() {
        let schema = ocr_response_schema();
        let statuses = schema["properties"]["ocr_status"]["enum"]
            .as_array()
            .unwrap();
        assert_eq!(statuses.len(), 2);
        assert!(statuses.contains(&json!(OCR_STATUS_SUCCESS)));
        assert!(statuses.contains(&json!(OCR_STATUS_FAILED)));
    }

    #[test]
    fn schema_category_enum_matches_domain() {
        let schema = ocr_response_schema();
        let categories = schema["properties"]["products"]["items"]["properties"]["category"]
            ["enum"]
            .as_array()
            .unwrap();
        assert_eq!(categories.len(), ProductCategory::all().len());
        for category in ProductCategory::all() {
            assert!(categories.contains(&json!(category.as_str())));
        }
    }

    #[test]
    fn schema_requires_every_top_level_field() {
        let schema = ocr_response_schema();
        let required = schema["required"].as_array().unwrap();
        let properties = schema["properties"].as_object().unwrap();
        assert_eq!(required.len(), properties.len());
        for key in properties.keys() {
            assert!(required.contains(&json!(key)), "missing required: {key}");
        }
    }

    #[test]
    fn schema_constrained_reply_round_trips() {
        // A reply that honors the schema must decode cleanly.
        let raw = sample_reply(OCR_STATUS_SUCCESS, &["Äpfel"]);
        let decoded = decode_ocr_response(&raw).unwrap();
        let re_encoded = serde_json::to_string(&decoded).unwrap();
        let re_decoded = decode_ocr_response(&re_encoded).unwrap();
        assert_eq!(decoded, re_decoded);
    }
}
