//! Integration test support for the Bazaar storefront client.
//!
//! [`MockApi`] is an in-process `axum` server on `127.0.0.1:0` that answers
//! from a table of canned responses and records every request it sees.
//! [`TestContext`] wires a [`Storefront`] to it over a [`MemoryStore`] and a
//! [`RecordingNavigator`].
//!
//! ```rust,ignore
//! let ctx = TestContext::new().await;
//! ctx.api.respond(Method::GET, "/api/products", 200, json!([]));
//! let products = ctx.shop.catalog().products(&ProductQuery::default()).await?;
//! assert_eq!(ctx.api.hits("/api/products"), 1);
//! ```

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::missing_panics_doc)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::Router;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use secrecy::SecretString;
use serde_json::Value;

use bazaar_core::{CartItem, ProductItemId, SessionUser};
use bazaar_storefront::Storefront;
use bazaar_storefront::api::RecordingNavigator;
use bazaar_storefront::config::StorefrontConfig;
use bazaar_storefront::models::Session;
use bazaar_storefront::storage::MemoryStore;

/// A canned response.
#[derive(Debug, Clone)]
struct Canned {
    status: StatusCode,
    body: Value,
    delay: Duration,
}

/// A request the mock server received.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: Method,
    pub path: String,
    pub query: Option<String>,
    pub authorization: Option<String>,
    pub body: Option<Value>,
}

#[derive(Default)]
struct MockState {
    routes: Mutex<HashMap<(Method, String), Canned>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

/// In-process mock of the storefront REST API.
#[derive(Clone)]
pub struct MockApi {
    state: Arc<MockState>,
    base_url: String,
}

impl MockApi {
    /// Bind to an ephemeral port and start serving.
    pub async fn start() -> Self {
        let state = Arc::new(MockState::default());
        let app = Router::new()
            .fallback(handle)
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind mock API");
        let addr = listener.local_addr().expect("Mock API has no address");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("Mock API crashed");
        });

        Self {
            state,
            base_url: format!("http://{addr}/api"),
        }
    }

    /// Base URL to configure the client with.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Answer `method path` with `status` and a JSON body.
    pub fn respond(&self, method: Method, path: &str, status: u16, body: Value) {
        self.respond_after(method, path, status, body, Duration::ZERO);
    }

    /// Like [`respond`](Self::respond), but wait `delay` before answering.
    pub fn respond_after(
        &self,
        method: Method,
        path: &str,
        status: u16,
        body: Value,
        delay: Duration,
    ) {
        let canned = Canned {
            status: StatusCode::from_u16(status).expect("Invalid status code"),
            body,
            delay,
        };
        self.state
            .routes
            .lock()
            .unwrap()
            .insert((method, path.to_string()), canned);
    }

    /// Every request so far, oldest first.
    #[must_use]
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.requests.lock().unwrap().clone()
    }

    /// Requests to `path`, any method.
    #[must_use]
    pub fn requests_to(&self, path: &str) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.path == path)
            .collect()
    }

    /// Number of requests to `path`, any method.
    #[must_use]
    pub fn hits(&self, path: &str) -> usize {
        self.requests_to(path).len()
    }
}

async fn handle(
    State(state): State<Arc<MockState>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let path = uri.path().to_string();
    state.requests.lock().unwrap().push(RecordedRequest {
        method: method.clone(),
        path: path.clone(),
        query: uri.query().map(str::to_string),
        authorization: headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
        body: serde_json::from_slice(&body).ok(),
    });

    let canned = state.routes.lock().unwrap().get(&(method, path)).cloned();
    let Some(canned) = canned else {
        return (
            StatusCode::NOT_FOUND,
            axum::Json(serde_json::json!({"detail": "Not found."})),
        )
            .into_response();
    };

    if !canned.delay.is_zero() {
        tokio::time::sleep(canned.delay).await;
    }
    if canned.body.is_null() {
        return canned.status.into_response();
    }
    (canned.status, axum::Json(canned.body)).into_response()
}

/// A storefront wired to a fresh mock API.
pub struct TestContext {
    pub api: MockApi,
    pub store: MemoryStore,
    pub navigator: RecordingNavigator,
    pub shop: Storefront,
}

impl TestContext {
    /// Start a mock API and build a storefront against it.
    pub async fn new() -> Self {
        Self::with_debounce(Duration::from_millis(20)).await
    }

    /// Like [`new`](Self::new) with a custom search quiet period.
    pub async fn with_debounce(debounce: Duration) -> Self {
        let api = MockApi::start().await;
        let mut config =
            StorefrontConfig::with_api_url(api.base_url()).expect("Mock URL is valid");
        config.search_debounce = debounce;
        config.http_timeout = Duration::from_secs(5);

        let store = MemoryStore::new();
        let navigator = RecordingNavigator::new();
        let shop = Storefront::new(config, Arc::new(store.clone()), Arc::new(navigator.clone()))
            .expect("Failed to build storefront");

        Self {
            api,
            store,
            navigator,
            shop,
        }
    }

    /// Sign `username` in locally without calling the API.
    pub fn sign_in(&self, username: &str, is_admin: bool) {
        self.shop
            .session()
            .login(Session {
                access_token: SecretString::from(format!("token-{username}")),
                refresh_token: Some(SecretString::from(format!("refresh-{username}"))),
                user: SessionUser::new(username),
                is_admin,
            })
            .expect("Failed to sign in");
    }
}

/// A cart line with the given id, quantity and whole-unit price.
#[must_use]
pub fn cart_item(id: i32, quantity: u32, price: i64) -> CartItem {
    CartItem::new(
        ProductItemId::new(id),
        format!("Item {id}"),
        quantity,
        rust_decimal::Decimal::from(price),
    )
}
