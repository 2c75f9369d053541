//! Navigator that turns route changes into terminal hints.

use url::Url;

use bazaar_storefront::api::{Navigator, Route};

use crate::output;

/// Prints where a browser would have gone.
pub struct TerminalNavigator;

impl Navigator for TerminalNavigator {
    fn navigate(&self, route: &Route) {
        tracing::debug!(route = %route, "Navigate");
        match route {
            Route::SignIn => output::hint("Please sign in: bazaar login -u <username>"),
            Route::PaymentSuccess { payment_id } => {
                output::hint(&format!("Order placed. Payment reference: {payment_id}"));
            }
            _ => {}
        }
    }

    fn redirect_external(&self, url: &Url) {
        output::hint(&format!("Continue to the payment provider:\n  {url}"));
        output::hint("When done, run `bazaar payment complete` or `bazaar payment cancel`.");
    }
}
