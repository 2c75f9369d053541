//! Storefront facade wiring every service together.

use std::sync::Arc;

use crate::api::{ApiClient, ApiError, Navigator};
use crate::config::StorefrontConfig;
use crate::services::{
    AuthService, CartService, CatalogService, CheckoutOrchestrator, DiscountService, OrderService,
    SearchDebouncer,
};
use crate::session::SessionStore;
use crate::storage::KeyValueStore;

/// Every storefront service over one store, session and API client.
///
/// This struct is cheaply cloneable via `Arc`; all clones share the session,
/// the caches and the checkout in-flight guard.
#[derive(Clone)]
pub struct Storefront {
    inner: Arc<StorefrontInner>,
}

struct StorefrontInner {
    config: StorefrontConfig,
    session: SessionStore,
    api: ApiClient,
    cart: CartService,
    catalog: CatalogService,
    search: SearchDebouncer,
    checkout: CheckoutOrchestrator,
    auth: AuthService,
    orders: OrderService,
    discounts: DiscountService,
}

impl Storefront {
    /// Restore the session from `store` and build every service.
    ///
    /// # Arguments
    ///
    /// * `config` - Storefront configuration
    /// * `store` - Persistent key-value storage
    /// * `navigator` - Receiver of route changes and provider redirects
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(
        config: StorefrontConfig,
        store: Arc<dyn KeyValueStore>,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self, ApiError> {
        let session = SessionStore::restore(Arc::clone(&store));
        let api = ApiClient::new(&config, session.clone(), navigator)?;
        let cart = CartService::new(store, session.clone());
        let catalog = CatalogService::new(api.clone());
        let search = SearchDebouncer::new(catalog.clone(), config.search_debounce);
        let orders = OrderService::new(api.clone());
        let checkout =
            CheckoutOrchestrator::new(api.clone(), cart.clone(), catalog.clone(), orders.clone());
        let auth = AuthService::new(api.clone());
        let discounts = DiscountService::new(api.clone());

        Ok(Self {
            inner: Arc::new(StorefrontInner {
                config,
                session,
                api,
                cart,
                catalog,
                search,
                checkout,
                auth,
                orders,
                discounts,
            }),
        })
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the session store.
    #[must_use]
    pub fn session(&self) -> &SessionStore {
        &self.inner.session
    }

    /// Get a reference to the API client.
    #[must_use]
    pub fn api(&self) -> &ApiClient {
        &self.inner.api
    }

    /// Get a reference to the cart service.
    #[must_use]
    pub fn cart(&self) -> &CartService {
        &self.inner.cart
    }

    /// Get a reference to the catalog service.
    #[must_use]
    pub fn catalog(&self) -> &CatalogService {
        &self.inner.catalog
    }

    /// Get a reference to the debounced search.
    #[must_use]
    pub fn search(&self) -> &SearchDebouncer {
        &self.inner.search
    }

    /// Get a reference to the checkout orchestrator.
    #[must_use]
    pub fn checkout(&self) -> &CheckoutOrchestrator {
        &self.inner.checkout
    }

    /// Get a reference to the account service.
    #[must_use]
    pub fn auth(&self) -> &AuthService {
        &self.inner.auth
    }

    /// Get a reference to the order service.
    #[must_use]
    pub fn orders(&self) -> &OrderService {
        &self.inner.orders
    }

    /// Get a reference to the discount service.
    #[must_use]
    pub fn discounts(&self) -> &DiscountService {
        &self.inner.discounts
    }
}
