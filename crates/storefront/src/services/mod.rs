//! Storefront services.
//!
//! # Services
//!
//! - `cart` - Per-user cart kept in local storage
//! - `checkout` - Checkout form, totals and payment hand-off
//! - `auth` - Registration, sign-in, sign-out, password recovery
//! - `catalog` - Products and cached reference lists
//! - `search` - Debounced product search
//! - `orders` - Order history, status updates, address book
//! - `discounts` - Admin coupon management

pub mod auth;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod discounts;
pub mod orders;
pub mod search;

pub use auth::{AuthError, AuthService};
pub use cart::{CartError, CartService};
pub use catalog::CatalogService;
pub use checkout::{CheckoutError, CheckoutForm, CheckoutOrchestrator, CheckoutOutcome, Totals};
pub use discounts::DiscountService;
pub use orders::OrderService;
pub use search::SearchDebouncer;
