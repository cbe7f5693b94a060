//! GreenCart storefront state & persistence layer.
//!
//! This crate is the store behind the UI: session/identity, cart and
//! wishlist, catalog browsing, order recording, and profile management, all
//! persisted through a key/value JSON storage adapter with an optional
//! remote API consulted first for auth and catalog reads.
//!
//! View code is expected to construct an [`state::AppState`] once and drive
//! everything through the services it hands out.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod catalog;
pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod state;
pub mod storage;
