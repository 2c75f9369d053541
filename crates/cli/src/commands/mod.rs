//! Command implementations and their arguments.

pub mod account;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod orders;

use clap::{Args, Subcommand};
use rust_decimal::Decimal;

use bazaar_core::PaymentMethod;
use bazaar_storefront::Storefront;
use bazaar_storefront::api::Route;

use crate::error::CliError;

#[derive(Args)]
pub struct RegisterArgs {
    #[arg(short, long)]
    pub username: String,

    #[arg(short, long)]
    pub email: String,

    #[arg(long, default_value = "")]
    pub first_name: String,

    #[arg(long, default_value = "")]
    pub last_name: String,

    #[arg(short, long, env = "BAZAAR_PASSWORD", hide_env_values = true)]
    pub password: String,
}

#[derive(Args)]
pub struct ProductArgs {
    /// Search term
    #[arg(short, long)]
    pub search: Option<String>,

    /// Category ID
    #[arg(short, long)]
    pub category: Option<i32>,

    /// Page number
    #[arg(long)]
    pub page: Option<u32>,
}

#[derive(Subcommand)]
pub enum CartAction {
    /// Show the cart
    List,
    /// Add a product
    Add {
        /// Product ID
        product: i32,

        /// Product item (size) ID; defaults to the first one
        #[arg(short, long)]
        item: Option<i32>,

        #[arg(short, long, default_value_t = 1)]
        qty: u32,
    },
    /// Remove a line
    Remove {
        /// Product item ID
        item: i32,
    },
    /// Change the quantity of a line
    Update {
        /// Product item ID
        item: i32,

        #[arg(allow_negative_numbers = true)]
        qty: i64,
    },
    /// Empty the cart
    Clear,
}

#[derive(Args)]
pub struct CheckoutArgs {
    #[arg(long)]
    pub name: Option<String>,

    #[arg(long)]
    pub email: Option<String>,

    #[arg(long)]
    pub address: Option<String>,

    #[arg(long)]
    pub city: Option<String>,

    #[arg(long)]
    pub region: Option<String>,

    #[arg(long)]
    pub postal_code: Option<String>,

    #[arg(long)]
    pub phone: Option<String>,

    #[arg(long)]
    pub country: Option<String>,

    /// cod, paypal or stripe
    #[arg(long)]
    pub payment: Option<PaymentMethod>,

    #[arg(long)]
    pub notes: Option<String>,

    /// Coupon code to apply
    #[arg(long)]
    pub coupon: Option<String>,

    /// Show the prefilled form and totals without placing the order
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Subcommand)]
pub enum PaymentAction {
    /// Confirm a provider payment
    Complete {
        /// Provider return parameter as key=value, repeatable
        #[arg(long = "param", value_parser = parse_key_value)]
        params: Vec<(String, String)>,
    },
    /// Cancel a provider payment
    Cancel,
    /// Show the payment waiting for a provider result
    Status,
}

#[derive(Subcommand)]
pub enum OrderAction {
    /// List orders
    List,
    /// Show one order
    Show { id: i32 },
    /// Change an order's status (admin)
    SetStatus { id: i32, status: i32 },
    /// List order statuses
    Statuses,
}

#[derive(Subcommand)]
pub enum AddressAction {
    /// List saved addresses
    List,
    /// Save a new address
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        address: String,
        #[arg(long)]
        city: String,
        #[arg(long)]
        region: String,
        #[arg(long)]
        postal_code: String,
        #[arg(long)]
        phone: String,
        #[arg(long)]
        country: String,
        #[arg(long)]
        default: bool,
    },
    /// List countries
    Countries,
}

#[derive(Subcommand)]
pub enum DiscountAction {
    /// List coupons
    List,
    /// Show one coupon
    Show { code: String },
    /// Create a coupon
    Create {
        #[arg(long)]
        code: String,
        #[arg(long)]
        percentage: Decimal,
        #[arg(long)]
        usage_limit: Option<u32>,
        /// Create the coupon inactive
        #[arg(long)]
        inactive: bool,
    },
    /// Delete a coupon
    Delete { id: i32 },
}

/// Refuse a command whose page the current session may not open, sending
/// the user where the browser would have.
pub fn require_route(shop: &Storefront, route: &Route) -> Result<(), CliError> {
    let Some(redirect) = route.guard(&shop.session().state()) else {
        return Ok(());
    };
    shop.api().navigator().navigate(&redirect);
    let message = if redirect == Route::SignIn {
        "This command needs you to sign in."
    } else {
        "This command needs an admin account."
    };
    Err(CliError::Usage(message.to_string()))
}

fn parse_key_value(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
        .filter(|(k, _)| !k.is_empty())
        .ok_or_else(|| format!("expected key=value, got `{raw}`"))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use secrecy::SecretString;

    use bazaar_core::SessionUser;
    use bazaar_storefront::api::{Navigation, RecordingNavigator};
    use bazaar_storefront::config::StorefrontConfig;
    use bazaar_storefront::models::Session;
    use bazaar_storefront::storage::MemoryStore;

    use super::*;

    fn shop(navigator: &RecordingNavigator) -> Storefront {
        Storefront::new(
            StorefrontConfig::with_api_url("http://127.0.0.1:9/api/").unwrap(),
            Arc::new(MemoryStore::new()),
            Arc::new(navigator.clone()),
        )
        .unwrap()
    }

    fn sign_in(shop: &Storefront, is_admin: bool) {
        shop.session()
            .login(Session {
                access_token: SecretString::from("token-ana"),
                refresh_token: None,
                user: SessionUser::new("ana"),
                is_admin,
            })
            .unwrap();
    }

    #[tokio::test]
    async fn test_require_route_follows_session() {
        let navigator = RecordingNavigator::new();
        let shop = shop(&navigator);

        assert!(require_route(&shop, &Route::Cart).is_ok());
        let err = require_route(&shop, &Route::Orders).unwrap_err();
        assert!(matches!(err, CliError::Usage(ref m) if m.contains("sign in")));
        assert_eq!(navigator.last(), Some(Navigation::Route(Route::SignIn)));

        sign_in(&shop, false);
        assert!(require_route(&shop, &Route::Orders).is_ok());
        assert!(require_route(&shop, &Route::Profile).is_ok());
        let err = require_route(&shop, &Route::Admin).unwrap_err();
        assert!(matches!(err, CliError::Usage(ref m) if m.contains("admin")));
        assert_eq!(navigator.last(), Some(Navigation::Route(Route::Home)));

        sign_in(&shop, true);
        let before = navigator.history().len();
        assert!(require_route(&shop, &Route::Admin).is_ok());
        assert_eq!(navigator.history().len(), before);
    }

    #[test]
    fn test_parse_key_value() {
        assert_eq!(
            parse_key_value("PayerID=XYZ").unwrap(),
            ("PayerID".to_string(), "XYZ".to_string())
        );
        assert_eq!(
            parse_key_value("token=a=b").unwrap(),
            ("token".to_string(), "a=b".to_string())
        );
        assert!(parse_key_value("novalue").is_err());
        assert!(parse_key_value("=x").is_err());
    }
}
