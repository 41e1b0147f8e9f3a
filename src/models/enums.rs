use serde::{Deserialize, Serialize};

/// Product categories a receipt line item can fall into.
///
/// The set is fixed — the inference backend is constrained to these values
/// through the structured-output schema, so unknown categories cannot reach
/// the domain layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductCategory {
    Textile,
    Food,
    Vegetable,
    Fruit,
    KitchenStuff,
    Grocery,
    Technology,
    Hobby,
}

impl ProductCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Textile => "textile",
            Self::Food => "food",
            Self::Vegetable => "vegetable",
            Self::Fruit => "fruit",
            Self::KitchenStuff => "kitchen_stuff",
            Self::Grocery => "grocery",
            Self::Technology => "technology",
            Self::Hobby => "hobby",
        }
    }

    /// All categories, in schema order.
    pub fn all() -> &'static [ProductCategory] {
        &[
            Self::Textile,
            Self::Food,
            Self::Vegetable,
            Self::Fruit,
            Self::KitchenStuff,
            Self::Grocery,
            Self::Technology,
            Self::Hobby,
        ]
    }
}

/// Supported currencies, serialized as the symbol printed on receipts.
///
/// The symbol IS the wire format — receipts carry "€" or "zł", not ISO
/// codes, and the vision model reads them off the paper.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Currency {
    #[serde(rename = "€")]
    Eur,
    #[serde(rename = "₺")]
    Try,
    #[serde(rename = "zł")]
    Pln,
    #[serde(rename = "$")]
    Usd,
    #[serde(rename = "лв")]
    Bgn,
}

impl Currency {
    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Eur => "€",
            Self::Try => "₺",
            Self::Pln => "zł",
            Self::Usd => "$",
            Self::Bgn => "лв",
        }
    }

    pub fn all() -> &'static [Currency] {
        &[Self::Eur, Self::Try, Self::Pln, Self::Usd, Self::Bgn]
    }
}

/// Record-level processing status of a receipt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessingStatus {
    NotProcessed,
    Success,
    Error,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_serializes_snake_case() {
        let json = serde_json::to_string(&ProductCategory::KitchenStuff).unwrap();
        assert_eq!(json, "\"kitchen_stuff\"");

        let back: ProductCategory = serde_json::from_str("\"grocery\"").unwrap();
        assert_eq!(back, ProductCategory::Grocery);
    }

    #[test]
    fn category_all_matches_as_str() {
        for category in ProductCategory::all() {
            let json = serde_json::to_string(category).unwrap();
            assert_eq!(json, format!("\"{}\"", category.as_str()));
        }
    }

    #[test]
    fn currency_serializes_as_symbol() {
        let json = serde_json::to_string(&Currency::Pln).unwrap();
        assert_eq!(json, "\"zł\"");

        let back: Currency = serde_json::from_str("\"€\"").unwrap();
        assert_eq!(back, Currency::Eur);
    }

    #[test]
    fn currency_symbols_are_distinct() {
        let symbols: Vec<&str> = Currency::all().iter().map(|c| c.symbol()).collect();
        let mut deduped = symbols.clone();
        deduped.sort_unstable();
        deduped.dedup();
        assert_eq!(symbols.len(), deduped.len());
    }

    #[test]
    fn unknown_category_rejected() {
        let result: Result<ProductCategory, _> = serde_json::from_str("\"weapons\"");
        assert!(result.is_err());
    }

    #[test]
    fn processing_status_round_trip() {
        let json = serde_json::to_string(&ProcessingStatus::NotProcessed).unwrap();
        assert_eq!(json, "\"not_processed\"");
        let back: ProcessingStatus = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ProcessingStatus::NotProcessed);
    }
}
