//! Checkout orchestrator.
//!
//! Drives a checkout from the cart to a payment:
//!
//! 1. [`CheckoutOrchestrator::load`] reads the cart, fetches countries and
//!    pre-fills the form from the default address.
//! 2. [`CheckoutForm::validate`] checks the required fields.
//! 3. [`Totals`] prices the cart.
//! 4. [`CheckoutOrchestrator::submit`] posts one `/payments/initiate`
//!    request, clears the cart, then either confirms the order (cash on
//!    delivery) or hands off to the provider page.
//!
//! Provider returns are finished with
//! [`CheckoutOrchestrator::complete_payment`] or
//! [`CheckoutOrchestrator::cancel_payment`].

mod form;
mod totals;

pub use form::{CheckoutForm, ShippingAddress, ValidatedCheckout};
pub use totals::Totals;

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;
use tracing::{error, info, instrument, warn};
use url::Url;

use bazaar_core::{CartItem, Coupon, EmailError, PaymentId, ProductItemId};

use crate::api::normalize::{ItemPayload, PaymentInitiation};
use crate::api::{ApiClient, ApiError, Country, Route};
use crate::config::PricingPolicy;
use crate::services::cart::CartService;
use crate::services::catalog::CatalogService;
use crate::services::orders::OrderService;
use crate::storage::{StorageError, keys};

/// Errors that can occur during checkout.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// Nothing to check out.
    #[error("cart is empty")]
    EmptyCart,

    /// Required fields are blank; labels in form order.
    #[error("missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),

    /// Email present but malformed.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    /// A submission is already running.
    #[error("checkout already in progress")]
    SubmissionInProgress,

    /// The provider response carried no usable redirect URL.
    #[error("payment provider returned no redirect URL")]
    MissingRedirectUrl,

    /// No payment is waiting for a provider result.
    #[error("no pending payment")]
    NoPendingPayment,

    /// API call failed.
    #[error("checkout API error: {0}")]
    Api(#[from] ApiError),

    /// Local storage failed.
    #[error("checkout storage error: {0}")]
    Storage(#[from] StorageError),
}

impl CheckoutError {
    /// Message fit for showing inline on the checkout page.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::EmptyCart => "Your cart is empty.".to_string(),
            Self::MissingFields(labels) => {
                format!("Please fill in: {}.", labels.join(", "))
            }
            Self::InvalidEmail(_) => "Please enter a valid email address.".to_string(),
            Self::SubmissionInProgress => "Your order is already being placed.".to_string(),
            Self::MissingRedirectUrl => {
                "The payment provider is unavailable. Please try another payment method."
                    .to_string()
            }
            Self::NoPendingPayment => "There is no payment waiting to be completed.".to_string(),
            Self::Api(err) => err.user_message(),
            Self::Storage(_) => "Something went wrong. Please try again.".to_string(),
        }
    }
}

/// Result of a successful submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckoutOutcome {
    /// Cash on delivery: the order is placed.
    Completed { payment_id: PaymentId },
    /// The customer was sent to the provider page.
    Redirected { payment_id: PaymentId, url: Url },
}

impl CheckoutOutcome {
    /// Payment id assigned by the backend.
    #[must_use]
    pub const fn payment_id(&self) -> &PaymentId {
        match self {
            Self::Completed { payment_id } | Self::Redirected { payment_id, .. } => payment_id,
        }
    }
}

/// Everything the checkout page needs to render.
#[derive(Debug, Clone)]
pub struct CheckoutPage {
    pub items: Vec<CartItem>,
    pub countries: Vec<Country>,
    pub form: CheckoutForm,
    pub totals: Totals,
}

/// Body of `POST /payments/initiate`.
#[derive(Debug, Serialize)]
struct PaymentRequest<'a> {
    subtotal: Decimal,
    shipping: Decimal,
    tax: Decimal,
    discount: Decimal,
    total_amount: Decimal,
    order_lines: Vec<OrderLineRequest>,
    shipping_address: &'a ShippingAddress,
    email: &'a str,
    payment_method: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    notes: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    coupon_code: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct OrderLineRequest {
    product_item_id: ProductItemId,
    qty: u32,
}

/// Clears the in-flight flag when a submission ends, however it ends.
struct InFlight<'a>(&'a AtomicBool);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Coordinates the checkout flow.
///
/// Cheaply cloneable; clones share the in-flight guard.
#[derive(Clone)]
pub struct CheckoutOrchestrator {
    api: ApiClient,
    cart: CartService,
    catalog: CatalogService,
    orders: OrderService,
    pricing: PricingPolicy,
    in_flight: Arc<AtomicBool>,
}

impl CheckoutOrchestrator {
    /// Create a new orchestrator.
    #[must_use]
    pub fn new(
        api: ApiClient,
        cart: CartService,
        catalog: CatalogService,
        orders: OrderService,
    ) -> Self {
        let pricing = api.config().pricing;
        Self {
            api,
            cart,
            catalog,
            orders,
            pricing,
            in_flight: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Whether a submission is currently running.
    #[must_use]
    pub fn is_submitting(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Prepare the checkout page.
    ///
    /// Failing to fetch the default address is logged and ignored.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::EmptyCart` for an empty cart, or
    /// `CheckoutError::Api` if the country list cannot be fetched.
    #[instrument(skip(self))]
    pub async fn load(&self) -> Result<CheckoutPage, CheckoutError> {
        let items = self.cart.get_cart();
        if items.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        let countries = self.catalog.countries().await?;

        let session = self.api.session().state();
        let mut form = CheckoutForm::default();
        if session.is_logged_in {
            let address = match self.orders.default_address().await {
                Ok(address) => address,
                Err(e) => {
                    warn!(error = %e, "Failed to load default address");
                    None
                }
            };
            form.prefill(address.as_ref(), session.user.as_ref());
        }

        let totals = Totals::compute(&items, Decimal::ZERO, &self.pricing);
        Ok(CheckoutPage {
            items,
            countries,
            form,
            totals,
        })
    }

    /// Totals for the current cart with an optional coupon applied.
    #[must_use]
    pub fn totals(&self, coupon: Option<&Coupon>) -> Totals {
        Totals::with_coupon(&self.cart.get_cart(), coupon, &self.pricing)
    }

    /// Validate the form and place the order.
    ///
    /// The cart is cleared as soon as the backend accepts the payment, before
    /// any navigation happens.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::SubmissionInProgress` while another submission
    /// runs, a validation error without calling the API, or the API error of
    /// `/payments/initiate`.
    #[instrument(skip(self, form, coupon))]
    pub async fn submit(
        &self,
        form: &CheckoutForm,
        coupon: Option<&Coupon>,
    ) -> Result<CheckoutOutcome, CheckoutError> {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(CheckoutError::SubmissionInProgress);
        }
        let _guard = InFlight(&self.in_flight);

        let validated = form.validate()?;
        let items = self.cart.get_cart();
        if items.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }
        let totals = Totals::with_coupon(&items, coupon, &self.pricing);

        let request = PaymentRequest {
            subtotal: totals.subtotal,
            shipping: totals.shipping,
            tax: totals.tax,
            discount: totals.discount,
            total_amount: totals.total,
            order_lines: items
                .iter()
                .map(|item| OrderLineRequest {
                    product_item_id: item.id,
                    qty: item.quantity,
                })
                .collect(),
            shipping_address: &validated.shipping,
            email: validated.email.as_str(),
            payment_method: validated.payment_method.code(),
            notes: validated.notes.as_deref(),
            coupon_code: coupon.map(|c| c.code.as_str()),
        };

        let initiation = self
            .api
            .post::<ItemPayload<PaymentInitiation>, _>("payments/initiate", &request)
            .await?
            .into_inner();
        let payment_id = initiation.payment_id.clone();
        info!(
            payment_id = %payment_id,
            method = %validated.payment_method,
            total = %totals.total,
            "Payment initiated"
        );

        if let Err(e) = self.cart.clear_cart() {
            error!(error = %e, "Failed to clear cart after payment initiation");
        }

        if !validated.payment_method.is_external() {
            self.api.navigator().navigate(&Route::PaymentSuccess {
                payment_id: payment_id.clone(),
            });
            return Ok(CheckoutOutcome::Completed { payment_id });
        }

        let url = initiation
            .redirect()
            .ok_or(CheckoutError::MissingRedirectUrl)?;
        self.api
            .session()
            .storage()
            .set(keys::PENDING_PAYMENT_ID, payment_id.as_str())?;
        self.api.navigator().redirect_external(&url);
        Ok(CheckoutOutcome::Redirected { payment_id, url })
    }

    /// Payment id waiting for a provider result.
    ///
    /// # Errors
    ///
    /// Returns an error if storage cannot be read.
    pub fn pending_payment_id(&self) -> Result<Option<PaymentId>, CheckoutError> {
        Ok(self
            .api
            .session()
            .storage()
            .get(keys::PENDING_PAYMENT_ID)?
            .filter(|id| !id.is_empty())
            .map(PaymentId::new))
    }

    /// Report a successful provider return.
    ///
    /// `params` are the query parameters the provider appended to the return
    /// URL (`token`, `PayerID`, `session_id`, ...). They are forwarded as-is
    /// next to the pending payment id.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::NoPendingPayment` when no payment id is stored
    /// or given, or the API error of `/payments/success`.
    #[instrument(skip(self, params))]
    pub async fn complete_payment(
        &self,
        params: &BTreeMap<String, String>,
    ) -> Result<PaymentId, CheckoutError> {
        let payment_id = self
            .pending_payment_id()?
            .or_else(|| {
                ["payment_id", "paymentId"]
                    .iter()
                    .find_map(|key| params.get(*key))
                    .filter(|id| !id.is_empty())
                    .map(PaymentId::new)
            })
            .ok_or(CheckoutError::NoPendingPayment)?;

        let mut body = serde_json::Map::new();
        for (key, value) in params {
            body.insert(key.clone(), serde_json::Value::String(value.clone()));
        }
        body.insert(
            "payment_id".to_string(),
            serde_json::Value::String(payment_id.as_str().to_string()),
        );

        self.api.post_ignore("payments/success", &body).await?;
        self.api
            .session()
            .storage()
            .remove(keys::PENDING_PAYMENT_ID)?;
        info!(payment_id = %payment_id, "Payment completed");

        self.api.navigator().navigate(&Route::PaymentSuccess {
            payment_id: payment_id.clone(),
        });
        Ok(payment_id)
    }

    /// Report that the customer backed out on the provider page.
    ///
    /// # Errors
    ///
    /// Returns the API error of `/payments/cancel`. The pending id is kept in
    /// that case so the cancel can be retried.
    #[instrument(skip(self))]
    pub async fn cancel_payment(&self) -> Result<(), CheckoutError> {
        let payment_id = self.pending_payment_id()?;
        let body = serde_json::json!({
            "payment_id": payment_id.as_ref().map(PaymentId::as_str),
        });

        self.api.post_ignore("payments/cancel", &body).await?;
        self.api
            .session()
            .storage()
            .remove(keys::PENDING_PAYMENT_ID)?;
        info!(payment_id = ?payment_id.as_ref().map(PaymentId::as_str), "Payment cancelled");

        self.api.navigator().navigate(&Route::Cart);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_message_lists_labels() {
        let err = CheckoutError::MissingFields(vec!["City", "Phone"]);
        assert_eq!(err.to_string(), "missing required fields: City, Phone");
        assert_eq!(err.user_message(), "Please fill in: City, Phone.");
    }

    #[test]
    fn test_storage_message_hides_details() {
        let err = CheckoutError::Storage(StorageError::Poisoned);
        assert!(!err.user_message().contains("poisoned"));
    }

    #[test]
    fn test_in_flight_guard_resets_on_drop() {
        let flag = AtomicBool::new(true);
        {
            let _guard = InFlight(&flag);
        }
        assert!(!flag.load(Ordering::Acquire));
    }

    #[test]
    fn test_outcome_payment_id() {
        let outcome = CheckoutOutcome::Completed {
            payment_id: PaymentId::new("7"),
        };
        assert_eq!(outcome.payment_id().as_str(), "7");
    }
}
