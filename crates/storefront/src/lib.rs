//! Bazaar storefront client library.
//!
//! Client-side state and API plumbing for the Bazaar shop: persistent
//! storage, the auth session, the per-user cart, checkout, and typed access
//! to the REST backend. [`Storefront`] wires it all together.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod session;
pub mod state;
pub mod storage;

pub use error::{Error, Result};
pub use state::Storefront;
