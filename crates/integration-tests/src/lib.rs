//! Integration tests for GreenCart.
//!
//! The tests in `tests/` drive the storefront through [`AppState`] the
//! way view code would: construct state once, obtain services from it,
//! and run full shopper flows (signup, browse, cart, checkout, profile)
//! against real JSON-file storage in a temp directory.
//!
//! No network is required. Remote-fallback tests point the API client at
//! a closed local port so every remote call fails fast.

use std::sync::Arc;

use greencart_storefront::config::StorefrontConfig;
use greencart_storefront::services::SignupForm;
use greencart_storefront::state::AppState;
use greencart_storefront::storage::MemoryStorage;

/// App state over in-memory storage, local-only.
///
/// # Panics
///
/// Panics when state construction fails; test-only code.
#[must_use]
pub fn memory_state() -> AppState {
    let config = StorefrontConfig::local("/tmp/greencart-memory-unused");
    AppState::with_storage(config, Arc::new(MemoryStorage::default()))
        .unwrap_or_else(|err| panic!("state init failed: {err}"))
}

/// App state over JSON-file storage rooted at `data_dir`, local-only.
///
/// # Panics
///
/// Panics when state construction fails; test-only code.
#[must_use]
pub fn file_state(data_dir: &std::path::Path) -> AppState {
    let config = StorefrontConfig::local(data_dir);
    AppState::new(config).unwrap_or_else(|err| panic!("state init failed: {err}"))
}

/// A valid signup form for the given email.
#[must_use]
pub fn signup_form(email: &str) -> SignupForm {
    SignupForm {
        first_name: "Alice".to_owned(),
        last_name: "Jones".to_owned(),
        email: email.to_owned(),
        phone: "+1112223333".to_owned(),
        password: "secret99".to_owned(),
        confirm_password: "secret99".to_owned(),
    }
}
