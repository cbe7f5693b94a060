//! GreenCart Core - Shared domain types.
//!
//! This crate provides common types used across all GreenCart components:
//! - `storefront` - the client-side state & persistence layer
//! - `integration-tests` - end-to-end flows over the public API
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no
//! storage access, no HTTP clients. This keeps it lightweight and allows it
//! to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, emails, money math,
//!   and status enums

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
