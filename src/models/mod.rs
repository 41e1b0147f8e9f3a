pub mod enums;
pub mod product;
pub mod receipt;

pub use enums::*;
pub use product::*;
pub use receipt::*;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ModelError {
    #[error("Receipt id '{0}' does not match the receipt-<hex>-<hex>-<hex>-<hex> pattern")]
    InvalidReceiptId(String),
}
