//! Unified error handling for the storefront state layer.
//!
//! Store operations return `Result<T, StoreError>`. The taxonomy is small
//! on purpose: validation failures block an operation before any state
//! mutation, missing references are mostly silent no-ops at the call sites
//! that can tolerate them, and remote failures are swallowed by the
//! remote-then-local fallback rather than surfacing here. No variant is
//! fatal; the worst case is a stale or duplicated local record.

use thiserror::Error;

use crate::api::ApiError;
use crate::services::auth::AuthError;
use crate::storage::StorageError;

/// Application-level error type for the storefront state layer.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A form field is missing or malformed; nothing was mutated.
    #[error("validation failed: {0}")]
    Validation(String),

    /// The operation requires an active session and none exists.
    #[error("not authenticated")]
    NotAuthenticated,

    /// A record with the same unique key already exists.
    #[error("already exists")]
    AlreadyExists,

    /// A referenced product/order/address/user does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Authentication operation failed.
    #[error("auth error: {0}")]
    Auth(#[from] AuthError),

    /// The remote API failed and no local fallback applied.
    #[error("remote API error: {0}")]
    Remote(#[from] ApiError),

    /// The persistence adapter failed.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

impl StoreError {
    /// Message suitable for direct display to the shopper.
    ///
    /// There are no structured error codes at the view boundary, only
    /// text; internal storage details are not exposed.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(msg) => msg.clone(),
            Self::NotAuthenticated => "Please login to continue".to_owned(),
            Self::AlreadyExists => "A record with this value already exists".to_owned(),
            Self::NotFound(what) => format!("{what} not found"),
            Self::Auth(err) => err.user_message(),
            Self::Remote(_) => "The store service is temporarily unavailable".to_owned(),
            Self::Storage(_) => "Something went wrong saving your data".to_owned(),
        }
    }
}

/// Result type alias for `StoreError`.
pub type Result<T> = std::result::Result<T, StoreError>;
