//! Identifier generation for locally created records.
//!
//! IDs combine a millisecond timestamp with a short random suffix, so
//! they sort roughly by creation time and stay readable in stored JSON.
//! Callers re-roll on the (vanishingly unlikely) collision against their
//! own collection via [`unique`].

use chrono::Utc;
use rand::distr::{Alphanumeric, SampleString};

use greencart_core::{AddressId, OrderId, UserId};

fn suffix(len: usize) -> String {
    Alphanumeric.sample_string(&mut rand::rng(), len)
}

/// A fresh user ID, e.g. `user_1712345678901_k3j9x2m1q`.
#[must_use]
pub fn user_id() -> UserId {
    UserId::new(format!(
        "user_{}_{}",
        Utc::now().timestamp_millis(),
        suffix(9).to_lowercase()
    ))
}

/// A fresh order ID, e.g. `ORD-1712345678901-A3F9K2`.
#[must_use]
pub fn order_id() -> OrderId {
    OrderId::new(format!(
        "ORD-{}-{}",
        Utc::now().timestamp_millis(),
        suffix(6).to_uppercase()
    ))
}

/// A fresh address ID, e.g. `addr_1712345678901_x4q2`.
#[must_use]
pub fn address_id() -> AddressId {
    AddressId::new(format!(
        "addr_{}_{}",
        Utc::now().timestamp_millis(),
        suffix(4).to_lowercase()
    ))
}

/// Generate IDs until one passes the caller's uniqueness check.
pub fn unique<T>(mut generate: impl FnMut() -> T, mut is_taken: impl FnMut(&T) -> bool) -> T {
    loop {
        let candidate = generate();
        if !is_taken(&candidate) {
            return candidate;
        }
    }
}
