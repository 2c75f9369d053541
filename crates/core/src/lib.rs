//! Bazaar Core - Shared types library.
//!
//! This crate provides common types used across all Bazaar components:
//! - `storefront` - Client library for the storefront REST API
//! - `cli` - Command-line front end driving the storefront library
//!
//! # Architecture
//!
//! The core crate contains only types and pure arithmetic - no I/O, no storage
//! access, no HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, money helpers, emails, cart items, coupons, orders and statuses

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
