//! Client-side routes and the navigation seam.

use std::sync::{Arc, Mutex};

use url::Url;

use bazaar_core::PaymentId;

use crate::models::SessionState;

/// Client-side routes the storefront can send the user to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Home,
    Shop,
    Cart,
    Checkout,
    SignIn,
    SignUp,
    Profile,
    Orders,
    Admin,
    Dashboard,
    /// Order confirmation for a completed payment.
    PaymentSuccess { payment_id: PaymentId },
}

impl Route {
    /// URL path of this route.
    #[must_use]
    pub fn path(&self) -> String {
        match self {
            Self::Home => "/".to_string(),
            Self::Shop => "/shop".to_string(),
            Self::Cart => "/cart".to_string(),
            Self::Checkout => "/checkout".to_string(),
            Self::SignIn => "/signin".to_string(),
            Self::SignUp => "/signup".to_string(),
            Self::Profile => "/profile".to_string(),
            Self::Orders => "/orders".to_string(),
            Self::Admin => "/admin".to_string(),
            Self::Dashboard => "/dashboard".to_string(),
            Self::PaymentSuccess { payment_id } => format!(
                "/payment/success?payment_id={}",
                urlencoding::encode(payment_id.as_str())
            ),
        }
    }

    /// Whether the route needs a signed-in user.
    #[must_use]
    pub const fn requires_auth(&self) -> bool {
        matches!(
            self,
            Self::Profile | Self::Orders | Self::Admin | Self::Dashboard
        )
    }

    /// Whether the route needs an admin.
    #[must_use]
    pub const fn requires_admin(&self) -> bool {
        matches!(self, Self::Admin | Self::Dashboard)
    }

    /// Where to send `session` instead of this route, if it may not enter.
    ///
    /// Signed-out users go to sign-in; signed-in customers hitting an admin
    /// route go home.
    #[must_use]
    pub const fn guard(&self, session: &SessionState) -> Option<Self> {
        if self.requires_auth() && !session.is_logged_in {
            Some(Self::SignIn)
        } else if self.requires_admin() && !session.is_admin {
            Some(Self::Home)
        } else {
            None
        }
    }
}

impl std::fmt::Display for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.path())
    }
}

/// Performs navigation side effects on behalf of the services.
pub trait Navigator: Send + Sync {
    /// Move to a client-side route.
    fn navigate(&self, route: &Route);

    /// Leave the application for an external page (payment provider).
    fn redirect_external(&self, url: &Url);
}

/// Navigator that only logs.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopNavigator;

impl Navigator for NoopNavigator {
    fn navigate(&self, route: &Route) {
        tracing::debug!(route = %route, "Navigate");
    }

    fn redirect_external(&self, url: &Url) {
        tracing::debug!(url = %url, "External redirect");
    }
}

/// A navigation performed through [`RecordingNavigator`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    Route(Route),
    External(Url),
}

/// Navigator that remembers every call, for tests and headless drivers.
#[derive(Debug, Clone, Default)]
pub struct RecordingNavigator {
    history: Arc<Mutex<Vec<Navigation>>>,
}

impl RecordingNavigator {
    /// Create a navigator with empty history.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Every navigation so far, oldest first.
    #[must_use]
    pub fn history(&self) -> Vec<Navigation> {
        self.history.lock().map(|h| h.clone()).unwrap_or_default()
    }

    /// The most recent navigation.
    #[must_use]
    pub fn last(&self) -> Option<Navigation> {
        self.history.lock().ok().and_then(|h| h.last().cloned())
    }

    fn push(&self, navigation: Navigation) {
        if let Ok(mut history) = self.history.lock() {
            history.push(navigation);
        }
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, route: &Route) {
        self.push(Navigation::Route(route.clone()));
    }

    fn redirect_external(&self, url: &Url) {
        self.push(Navigation::External(url.clone()));
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_route_paths() {
        assert_eq!(Route::Home.path(), "/");
        assert_eq!(Route::SignIn.path(), "/signin");
        assert_eq!(
            Route::PaymentSuccess {
                payment_id: PaymentId::new("a b")
            }
            .path(),
            "/payment/success?payment_id=a%20b"
        );
    }

    #[test]
    fn test_route_guards() {
        assert!(Route::Orders.requires_auth());
        assert!(!Route::Checkout.requires_auth());
        assert!(!Route::Cart.requires_auth());
        assert!(Route::Dashboard.requires_admin());
        assert!(!Route::Orders.requires_admin());
    }

    #[test]
    fn test_guard_by_session() {
        let guest = SessionState::default();
        let customer = SessionState {
            is_logged_in: true,
            is_admin: false,
            user: Some(bazaar_core::SessionUser::new("ana")),
        };
        let admin = SessionState {
            is_admin: true,
            ..customer.clone()
        };

        assert_eq!(Route::Orders.guard(&guest), Some(Route::SignIn));
        assert_eq!(Route::Admin.guard(&guest), Some(Route::SignIn));
        assert_eq!(Route::Checkout.guard(&guest), None);
        assert_eq!(Route::Shop.guard(&guest), None);

        assert_eq!(Route::Orders.guard(&customer), None);
        assert_eq!(Route::Dashboard.guard(&customer), Some(Route::Home));
        assert_eq!(Route::Admin.guard(&customer), Some(Route::Home));

        assert_eq!(Route::Admin.guard(&admin), None);
        assert_eq!(Route::Profile.guard(&admin), None);
    }

    #[test]
    fn test_recording_navigator() {
        let nav = RecordingNavigator::new();
        let url = Url::parse("https://paypal.example/approve").unwrap();
        nav.navigate(&Route::Cart);
        nav.redirect_external(&url);

        assert_eq!(
            nav.history(),
            vec![Navigation::Route(Route::Cart), Navigation::External(url.clone())]
        );
        assert_eq!(nav.last(), Some(Navigation::External(url)));
    }
}
