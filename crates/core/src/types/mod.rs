//! Core types for Bazaar.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod cart;
pub mod coupon;
pub mod email;
pub mod id;
pub mod money;
pub mod order;
pub mod status;
pub mod user;

pub use cart::CartItem;
pub use coupon::Coupon;
pub use email::{Email, EmailError};
pub use id::*;
pub use money::{format_money, round_money};
pub use order::{Order, OrderLine};
pub use status::*;
pub use user::SessionUser;
