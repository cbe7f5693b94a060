//! Order records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use greencart_core::{OrderId, OrderStatus, PaymentMethod, Totals, UserId};

use super::CartItem;

/// Shipping details collected at checkout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingInfo {
    pub first_name: String,
    pub last_name: String,
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub phone: String,
}

impl ShippingInfo {
    /// All required fields present (non-blank)?
    #[must_use]
    pub fn is_complete(&self) -> bool {
        [
            &self.first_name,
            &self.last_name,
            &self.street,
            &self.city,
            &self.state,
            &self.zip_code,
            &self.phone,
        ]
        .iter()
        .all(|field| !field.trim().is_empty())
    }
}

/// Payment details as entered at checkout. Input only; never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentInfo {
    pub method: PaymentMethod,
    /// Full card number (spaces allowed); required when `method` is card.
    pub card_number: Option<String>,
}

/// Payment details as retained on the order: the method, plus the last
/// four card digits when paid by card. The full number is never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRecord {
    pub method: PaymentMethod,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub card_last4: Option<String>,
}

/// A placed order. Immutable once recorded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    /// `None` only for guest checkout, which login gating currently makes
    /// unreachable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<UserId>,
    pub items: Vec<CartItem>,
    pub shipping: ShippingInfo,
    pub payment: PaymentRecord,
    pub summary: Totals,
    pub placed_at: DateTime<Utc>,
    pub status: OrderStatus,
}

impl Order {
    /// Total number of units across all lines.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.items.iter().map(|item| item.quantity).sum()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use greencart_core::ProductId;

    use super::*;

    fn shipping() -> ShippingInfo {
        ShippingInfo {
            first_name: "John".to_owned(),
            last_name: "Doe".to_owned(),
            street: "123 Main St".to_owned(),
            city: "New York".to_owned(),
            state: "NY".to_owned(),
            zip_code: "10001".to_owned(),
            phone: "+1234567890".to_owned(),
        }
    }

    #[test]
    fn test_shipping_completeness() {
        assert!(shipping().is_complete());

        let mut blank_city = shipping();
        blank_city.city = "   ".to_owned();
        assert!(!blank_city.is_complete());
    }

    #[test]
    fn test_item_count_sums_quantities() {
        let order = Order {
            id: OrderId::new("ORD-1-ABCDEF"),
            user_id: Some(UserId::new("user_1_abc")),
            items: vec![
                CartItem {
                    product_id: ProductId::new(1),
                    name: "Widget".to_owned(),
                    price: "79.99".parse().unwrap(),
                    image: "widget.jpg".to_owned(),
                    quantity: 2,
                    size: None,
                },
                CartItem {
                    product_id: ProductId::new(2),
                    name: "Shirt".to_owned(),
                    price: "24.99".parse().unwrap(),
                    image: "shirt.jpg".to_owned(),
                    quantity: 3,
                    size: Some("M".to_owned()),
                },
            ],
            shipping: shipping(),
            payment: PaymentRecord {
                method: PaymentMethod::Card,
                card_last4: Some("1111".to_owned()),
            },
            summary: Totals::from_subtotal("234.95".parse().unwrap()),
            placed_at: Utc::now(),
            status: OrderStatus::Processing,
        };
        assert_eq!(order.item_count(), 5);
    }
}
