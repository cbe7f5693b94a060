//! Cart line items.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use greencart_core::ProductId;

use super::Product;

/// A line in the cart.
///
/// Name, price, and image are snapshots taken when the item was added;
/// later catalog edits do not flow into existing lines. Identity is the
/// (product id, size) pair: the cart never holds two lines with the same
/// pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub product_id: ProductId,
    pub name: String,
    pub price: Decimal,
    pub image: String,
    /// Always at least 1; a quantity reaching 0 removes the line instead.
    pub quantity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
}

impl CartItem {
    /// Snapshot a product into a new cart line.
    #[must_use]
    pub fn snapshot(product: &Product, quantity: u32, size: Option<&str>) -> Self {
        Self {
            product_id: product.id,
            name: product.name.clone(),
            price: product.price,
            image: product.image.clone(),
            quantity,
            size: size.map(str::to_owned),
        }
    }

    /// Whether this line matches the given identity key.
    #[must_use]
    pub fn matches(&self, product_id: ProductId, size: Option<&str>) -> bool {
        self.product_id == product_id && self.size.as_deref() == size
    }

    /// Price times quantity for this line.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.price * Decimal::from(self.quantity)
    }
}
