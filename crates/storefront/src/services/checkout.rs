//! Order placement and order history.
//!
//! Placing an order validates everything up front, simulates a payment
//! processing delay, then appends to the global order collection, links
//! the order ID into the user record, and clears the cart. Orders are
//! immutable once recorded; only the last four card digits are ever kept.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use rust_decimal::Decimal;
use tracing::{debug, instrument};

use greencart_core::{OrderId, OrderStatus, Totals, UserId};

use crate::error::{Result, StoreError};
use crate::models::{CartItem, Order, PaymentInfo, PaymentRecord, Session, ShippingInfo};
use crate::services::ids;
use crate::storage::{Storage, StorageExt, keys};

/// Minimum digits for an accepted card number.
const MIN_CARD_DIGITS: usize = 12;

/// Checkout service.
#[derive(Clone)]
pub struct CheckoutService {
    storage: Arc<dyn Storage>,
    processing_delay: Duration,
}

impl CheckoutService {
    /// Create a new checkout service.
    #[must_use]
    pub fn new(storage: Arc<dyn Storage>, processing_delay: Duration) -> Self {
        Self {
            storage,
            processing_delay,
        }
    }

    /// Place an order from the current cart.
    ///
    /// On success the order is recorded, linked into the user record when
    /// a matching local user exists, and the cart is cleared.
    ///
    /// # Errors
    ///
    /// Returns `NotAuthenticated` without a session, and a validation
    /// error for an empty cart, incomplete shipping details, or a missing
    /// or malformed card number on card payments. Nothing is mutated on
    /// failure.
    #[instrument(skip(self, shipping, payment))]
    pub async fn place_order(&self, shipping: ShippingInfo, payment: PaymentInfo) -> Result<Order> {
        let session: Option<Session> = self.storage.load(keys::CURRENT_SESSION)?;
        let session = session.ok_or(StoreError::NotAuthenticated)?;

        let cart: Vec<CartItem> = self.storage.load(keys::CART)?;
        if cart.is_empty() {
            return Err(StoreError::Validation("your cart is empty".to_owned()));
        }
        if !shipping.is_complete() {
            return Err(StoreError::Validation(
                "please fill in all shipping fields".to_owned(),
            ));
        }
        let payment = validate_payment(&payment)?;

        let subtotal: Decimal = cart.iter().map(CartItem::line_total).sum();
        let summary = Totals::from_subtotal(subtotal);

        // Simulated payment processing.
        tokio::time::sleep(self.processing_delay).await;

        let mut orders: Vec<Order> = self.storage.load(keys::ORDERS)?;
        let id = ids::unique(ids::order_id, |candidate| {
            orders.iter().any(|order| &order.id == candidate)
        });

        let order = Order {
            id,
            user_id: Some(session.user.id.clone()),
            items: cart,
            shipping,
            payment,
            summary,
            placed_at: Utc::now(),
            status: OrderStatus::Processing,
        };

        orders.push(order.clone());
        self.storage.store(keys::ORDERS, &orders)?;
        self.link_order_to_user(&session.user.id, &order.id)?;
        self.storage.remove(keys::CART)?;

        debug!(order = %order.id, total = %order.summary.total, "order placed");
        Ok(order)
    }

    /// Attach the order ID to the local user record. Remote-only sessions
    /// have no local record; skip silently.
    fn link_order_to_user(&self, user_id: &UserId, order_id: &OrderId) -> Result<()> {
        let mut users: Vec<crate::models::User> = self.storage.load(keys::USERS)?;
        if let Some(user) = users.iter_mut().find(|user| &user.id == user_id) {
            user.orders.push(order_id.clone());
            self.storage.store(keys::USERS, &users)?;
        }
        Ok(())
    }

    /// Look up an order by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the persistence adapter fails.
    pub fn order_by_id(&self, id: &OrderId) -> Result<Option<Order>> {
        let orders: Vec<Order> = self.storage.load(keys::ORDERS)?;
        Ok(orders.into_iter().find(|order| &order.id == id))
    }

    /// All orders placed by a user, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the persistence adapter fails.
    pub fn orders_for_user(&self, user_id: &UserId) -> Result<Vec<Order>> {
        let mut orders: Vec<Order> = self.storage.load(keys::ORDERS)?;
        orders.retain(|order| order.user_id.as_ref() == Some(user_id));
        orders.sort_by(|a, b| b.placed_at.cmp(&a.placed_at));
        Ok(orders)
    }
}

fn validate_payment(payment: &PaymentInfo) -> Result<PaymentRecord> {
    if !payment.method.requires_card() {
        return Ok(PaymentRecord {
            method: payment.method,
            card_last4: None,
        });
    }

    let digits: String = payment
        .card_number
        .as_deref()
        .unwrap_or_default()
        .chars()
        .filter(char::is_ascii_digit)
        .collect();
    if digits.len() < MIN_CARD_DIGITS {
        return Err(StoreError::Validation(
            "please enter a valid card number".to_owned(),
        ));
    }

    Ok(PaymentRecord {
        method: payment.method,
        card_last4: Some(digits[digits.len() - 4..].to_owned()),
    })
}
