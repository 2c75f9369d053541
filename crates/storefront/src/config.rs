//! Storefront client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All variables are optional.
//!
//! - `STOREFRONT_API_URL` - REST API base URL (default: `http://localhost:8000/api`)
//! - `STOREFRONT_DATA_DIR` - Directory holding `storage.json` (default: `.bazaar`)
//! - `STOREFRONT_HTTP_TIMEOUT_SECS` - Per-request timeout (default: 30)
//! - `STOREFRONT_TAX_RATE` - Tax rate applied at checkout (default: 0.10)
//! - `STOREFRONT_SHIPPING_FLAT` - Flat shipping fee (default: 15)
//! - `STOREFRONT_SEARCH_DEBOUNCE_MS` - Search quiet period (default: 300)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use rust_decimal::Decimal;
use thiserror::Error;
use url::Url;

/// Default REST API base URL.
pub const DEFAULT_API_URL: &str = "http://localhost:8000/api";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront client configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// REST API base URL, always ending in `/`
    pub api_url: Url,
    /// Directory for persisted client state
    pub data_dir: PathBuf,
    /// Per-request timeout
    pub http_timeout: Duration,
    /// Checkout pricing rules
    pub pricing: PricingPolicy,
    /// Quiet period before a search is sent
    pub search_debounce: Duration,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
}

/// Tax and shipping applied to every checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PricingPolicy {
    /// Fraction of the subtotal charged as tax.
    pub tax_rate: Decimal,
    /// Shipping charged on every order.
    pub shipping_flat: Decimal,
}

impl Default for PricingPolicy {
    fn default() -> Self {
        Self {
            tax_rate: Decimal::new(10, 2),
            shipping_flat: Decimal::from(15),
        }
    }
}

impl StorefrontConfig {
    /// Configuration with default settings pointing at `api_url`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if `api_url` is not an http(s) URL.
    pub fn with_api_url(api_url: &str) -> Result<Self, ConfigError> {
        let api_url = parse_api_url(api_url)
            .map_err(|e| ConfigError::InvalidEnvVar("STOREFRONT_API_URL".to_string(), e))?;
        Ok(Self {
            api_url,
            data_dir: PathBuf::from(".bazaar"),
            http_timeout: Duration::from_secs(30),
            pricing: PricingPolicy::default(),
            search_debounce: Duration::from_millis(300),
            sentry_dsn: None,
            sentry_environment: None,
        })
    }

    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set but cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let api_url = parse_api_url(&get_env_or_default("STOREFRONT_API_URL", DEFAULT_API_URL))
            .map_err(|e| ConfigError::InvalidEnvVar("STOREFRONT_API_URL".to_string(), e))?;
        let data_dir = PathBuf::from(get_env_or_default("STOREFRONT_DATA_DIR", ".bazaar"));
        let http_timeout =
            Duration::from_secs(get_parsed_or_default("STOREFRONT_HTTP_TIMEOUT_SECS", 30_u64)?);
        let pricing = PricingPolicy {
            tax_rate: get_parsed_or_default("STOREFRONT_TAX_RATE", Decimal::new(10, 2))?,
            shipping_flat: get_parsed_or_default("STOREFRONT_SHIPPING_FLAT", Decimal::from(15))?,
        };
        if pricing.tax_rate.is_sign_negative() || pricing.shipping_flat.is_sign_negative() {
            return Err(ConfigError::InvalidEnvVar(
                "STOREFRONT_TAX_RATE/STOREFRONT_SHIPPING_FLAT".to_string(),
                "must not be negative".to_string(),
            ));
        }
        let search_debounce =
            Duration::from_millis(get_parsed_or_default("STOREFRONT_SEARCH_DEBOUNCE_MS", 300_u64)?);

        Ok(Self {
            api_url,
            data_dir,
            http_timeout,
            pricing,
            search_debounce,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
        })
    }

    /// Resolve an API path such as `products` or `orders/3/status`.
    ///
    /// # Errors
    ///
    /// Returns an error if the joined URL is invalid.
    pub fn endpoint(&self, path: &str) -> Result<Url, url::ParseError> {
        self.api_url.join(path.trim_start_matches('/'))
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Parse an API base URL and make sure it ends with `/` so relative joins
/// append instead of replacing the last segment.
fn parse_api_url(raw: &str) -> Result<Url, String> {
    let mut url = Url::parse(raw.trim()).map_err(|e| e.to_string())?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(format!("unsupported scheme: {}", url.scheme()));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

/// Get an optional environment variable, treating empty values as unset.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    get_optional_env(key).unwrap_or_else(|| default.to_string())
}

/// Parse an environment variable, falling back to `default` when unset.
fn get_parsed_or_default<T>(key: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match get_optional_env(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string())),
        None => Ok(default),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_api_url_appends_slash() {
        let url = parse_api_url("http://localhost:8000/api").unwrap();
        assert_eq!(url.as_str(), "http://localhost:8000/api/");

        let url = parse_api_url("https://shop.example.com/api/").unwrap();
        assert_eq!(url.as_str(), "https://shop.example.com/api/");
    }

    #[test]
    fn test_parse_api_url_rejects_other_schemes() {
        assert!(parse_api_url("ftp://example.com/api").is_err());
        assert!(parse_api_url("not a url").is_err());
    }

    #[test]
    fn test_endpoint_joins_under_base_path() {
        let config = StorefrontConfig::with_api_url(DEFAULT_API_URL).unwrap();
        assert_eq!(
            config.endpoint("products").unwrap().as_str(),
            "http://localhost:8000/api/products"
        );
        assert_eq!(
            config.endpoint("/orders/3/status").unwrap().as_str(),
            "http://localhost:8000/api/orders/3/status"
        );
    }

    #[test]
    fn test_default_pricing() {
        let pricing = PricingPolicy::default();
        assert_eq!(pricing.tax_rate, Decimal::new(10, 2));
        assert_eq!(pricing.shipping_flat, Decimal::from(15));
    }

    #[test]
    fn test_with_api_url_rejects_garbage() {
        let err = StorefrontConfig::with_api_url("::").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(_, _)));
    }
}
