//! Bazaar CLI - the storefront from a terminal.
//!
//! State (session, carts, pending payment) persists in
//! `$STOREFRONT_DATA_DIR/storage.json` between invocations, the same way a
//! browser keeps local storage between page loads.
//!
//! # Usage
//!
//! ```bash
//! # Sign in (password may also come from BAZAAR_PASSWORD)
//! bazaar login -u ana -p 's3cret-pass'
//!
//! # Browse and fill the cart
//! bazaar products --search hoodie
//! bazaar cart add 12 --item 31 --qty 2
//! bazaar cart list
//!
//! # Check out, cash on delivery
//! bazaar checkout --name "Ana Lima" --email ana@example.com ... --payment cod
//!
//! # Finish a PayPal/Stripe payment after the provider redirect
//! bazaar payment complete --param token=EC-123 --param PayerID=XYZ
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::sync::Arc;

use clap::{Parser, Subcommand};
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use bazaar_storefront::Storefront;
use bazaar_storefront::config::StorefrontConfig;
use bazaar_storefront::storage::FileStore;

mod commands;
mod error;
mod navigator;
mod output;

use commands::{
    AddressAction, CartAction, CheckoutArgs, DiscountAction, OrderAction, PaymentAction,
    ProductArgs, RegisterArgs,
};
use error::CliError;
use navigator::TerminalNavigator;

#[derive(Parser)]
#[command(name = "bazaar")]
#[command(author, version, about = "Bazaar storefront from the command line")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an account
    Register(RegisterArgs),
    /// Sign in
    Login {
        #[arg(short, long)]
        username: String,

        #[arg(short, long, env = "BAZAAR_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Sign out (carts are kept)
    Logout,
    /// Show who is signed in
    Whoami,
    /// Request a password reset email
    ForgotPassword {
        #[arg(short, long)]
        email: String,
    },
    /// Set a new password with a reset token
    ResetPassword {
        #[arg(short, long)]
        token: String,

        #[arg(short, long, env = "BAZAAR_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// List products
    Products(ProductArgs),
    /// Show one product with its sizes
    Product {
        /// Product ID
        id: i32,
    },
    /// List categories
    Categories {
        /// Pick a random selection instead
        #[arg(long)]
        random: bool,
    },
    /// Manage the cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Check a coupon code against the current cart
    Coupon {
        /// Coupon code
        code: String,
    },
    /// Place an order from the cart
    Checkout(CheckoutArgs),
    /// Finish or cancel a provider payment
    Payment {
        #[command(subcommand)]
        action: PaymentAction,
    },
    /// Order history
    Orders {
        #[command(subcommand)]
        action: Option<OrderAction>,
    },
    /// Saved addresses
    Addresses {
        #[command(subcommand)]
        action: Option<AddressAction>,
    },
    /// Manage coupons (admin)
    Discounts {
        #[command(subcommand)]
        action: DiscountAction,
    },
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &StorefrontConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config
                .sentry_environment
                .clone()
                .map(std::borrow::Cow::Owned),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    tracing::debug!("Sentry initialized");
    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR => sentry_tracing::EventFilter::Event,
        tracing::Level::WARN | tracing::Level::INFO => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match StorefrontConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            output::error(&e.to_string());
            std::process::exit(2);
        }
    };

    // Initialize Sentry (must be done before tracing subscriber)
    let _sentry_guard = init_sentry(&config);

    // Logs go to stderr so command output stays pipeable
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "bazaar_storefront=info,bazaar_cli=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    if let Err(e) = run(cli, config).await {
        output::error(&e.report());
        std::process::exit(1);
    }
}

async fn run(cli: Cli, config: StorefrontConfig) -> Result<(), CliError> {
    let store = FileStore::open(&config.data_dir)?;
    let shop = Storefront::new(config, Arc::new(store), Arc::new(TerminalNavigator))?;

    match cli.command {
        Commands::Register(args) => commands::account::register(&shop, args).await,
        Commands::Login { username, password } => {
            commands::account::login(&shop, &username, password).await
        }
        Commands::Logout => commands::account::logout(&shop).await,
        Commands::Whoami => {
            commands::account::whoami(&shop);
            Ok(())
        }
        Commands::ForgotPassword { email } => {
            commands::account::forgot_password(&shop, &email).await
        }
        Commands::ResetPassword { token, password } => {
            commands::account::reset_password(&shop, &token, password).await
        }
        Commands::Products(args) => commands::catalog::products(&shop, args).await,
        Commands::Product { id } => commands::catalog::product(&shop, id).await,
        Commands::Categories { random } => commands::catalog::categories(&shop, random).await,
        Commands::Cart { action } => commands::cart::run(&shop, action).await,
        Commands::Coupon { code } => commands::cart::coupon(&shop, &code).await,
        Commands::Checkout(args) => commands::checkout::checkout(&shop, args).await,
        Commands::Payment { action } => commands::checkout::payment(&shop, action).await,
        Commands::Orders { action } => {
            commands::orders::orders(&shop, action.unwrap_or(OrderAction::List)).await
        }
        Commands::Addresses { action } => {
            commands::orders::addresses(&shop, action.unwrap_or(AddressAction::List)).await
        }
        Commands::Discounts { action } => commands::orders::discounts(&shop, action).await,
    }
}
