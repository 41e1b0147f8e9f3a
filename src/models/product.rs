use serde::{Deserialize, Serialize};

use super::enums::{Currency, ProductCategory};

/// One line item on a receipt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub name: String,
    pub category: ProductCategory,
    pub price: f64,
    pub price_currency: Currency,
    /// Discount applied to this item, if the receipt shows one.
    pub discount: Option<f64>,
}
