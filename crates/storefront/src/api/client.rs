//! HTTP client facade over `reqwest`.

use std::sync::Arc;

use reqwest::{Method, RequestBuilder, StatusCode};
use secrecy::ExposeSecret;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, error, instrument, warn};

use super::navigation::{Navigator, Route};
use super::normalize::extract_error_message;
use super::ApiError;
use crate::config::StorefrontConfig;
use crate::session::SessionStore;

/// Longest body excerpt written to logs.
const LOG_BODY_LIMIT: usize = 500;

/// Longest raw body used as a user-facing message.
const MESSAGE_BODY_LIMIT: usize = 200;

/// Client for the storefront REST API.
///
/// Every request carries `Authorization: Bearer <token>` when the session has
/// one. A `401` from any endpoint clears the session, sends the user to
/// sign-in and fails the call with [`ApiError::Unauthorized`]; there is no
/// refresh attempt and no retry.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    client: reqwest::Client,
    config: StorefrontConfig,
    session: SessionStore,
    navigator: Arc<dyn Navigator>,
}

impl ApiClient {
    /// Create a new API client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(
        config: &StorefrontConfig,
        session: SessionStore,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(config.http_timeout)
            .user_agent(concat!("bazaar-storefront/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                client,
                config: config.clone(),
                session,
                navigator,
            }),
        })
    }

    /// Get a reference to the configuration this client was built with.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the session store.
    #[must_use]
    pub fn session(&self) -> &SessionStore {
        &self.inner.session
    }

    /// Get a reference to the navigator.
    #[must_use]
    pub fn navigator(&self) -> &Arc<dyn Navigator> {
        &self.inner.navigator
    }

    // =========================================================================
    // Verbs
    // =========================================================================

    /// `GET` and decode the response.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, the status is not successful,
    /// or the body does not decode into `T`.
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let request = self.request(Method::GET, path)?;
        decode(&self.execute(request).await?)
    }

    /// `GET` with query parameters and decode the response.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::get`].
    pub async fn get_query<T, Q>(&self, path: &str, query: &Q) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        let request = self.request(Method::GET, path)?.query(query);
        decode(&self.execute(request).await?)
    }

    /// `POST` a JSON body and decode the response.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::get`].
    pub async fn post<T, B>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let request = self.request(Method::POST, path)?.json(body);
        decode(&self.execute(request).await?)
    }

    /// `POST` a JSON body and ignore whatever comes back.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the status is not successful.
    pub async fn post_ignore<B>(&self, path: &str, body: &B) -> Result<(), ApiError>
    where
        B: Serialize + ?Sized,
    {
        let request = self.request(Method::POST, path)?.json(body);
        self.execute(request).await.map(|_| ())
    }

    /// `PUT` a JSON body and decode the response.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::get`].
    pub async fn put<T, B>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let request = self.request(Method::PUT, path)?.json(body);
        decode(&self.execute(request).await?)
    }

    /// `PATCH` a JSON body and decode the response.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::get`].
    pub async fn patch<T, B>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let request = self.request(Method::PATCH, path)?.json(body);
        decode(&self.execute(request).await?)
    }

    /// `DELETE` a resource.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the status is not successful.
    pub async fn delete(&self, path: &str) -> Result<(), ApiError> {
        let request = self.request(Method::DELETE, path)?;
        self.execute(request).await.map(|_| ())
    }

    // =========================================================================
    // Plumbing
    // =========================================================================

    /// Build a request with the bearer token attached.
    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, ApiError> {
        let url = self.inner.config.endpoint(path)?;
        let mut request = self.inner.client.request(method, url);
        if let Some(token) = self.inner.session.access_token() {
            request = request.bearer_auth(token.expose_secret());
        }
        Ok(request)
    }

    /// Send a request and return the body of a successful response.
    #[instrument(skip(self, request))]
    async fn execute(&self, request: RequestBuilder) -> Result<String, ApiError> {
        let response = request.send().await.map_err(|e| {
            warn!(error = %e, "API request failed");
            ApiError::Http(e)
        })?;

        let status = response.status();
        let url = response.url().path().to_string();

        if status == StatusCode::UNAUTHORIZED {
            self.handle_unauthorized(&url);
            return Err(ApiError::Unauthorized);
        }

        // Check for rate limiting
        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(1);
            return Err(ApiError::RateLimited(retry_after));
        }

        // Get response body as text first for better error diagnostics
        let body = response.text().await?;

        if !status.is_success() {
            error!(
                status = %status,
                path = %url,
                body = %truncate(&body, LOG_BODY_LIMIT),
                "API returned non-success status"
            );
            let message = extract_error_message(&body).unwrap_or_else(|| {
                if body.trim().is_empty() || body.trim_start().starts_with('<') {
                    status
                        .canonical_reason()
                        .unwrap_or("Request failed")
                        .to_string()
                } else {
                    truncate(body.trim(), MESSAGE_BODY_LIMIT)
                }
            });
            return Err(ApiError::Api {
                status: status.as_u16(),
                message,
            });
        }

        debug!(status = %status, path = %url, "API request succeeded");
        Ok(body)
    }

    /// Wipe the session and send the user to sign-in.
    fn handle_unauthorized(&self, path: &str) {
        warn!(path, "API rejected the session, signing out");
        if let Err(e) = self.inner.session.clear() {
            error!(error = %e, "Failed to clear session after 401");
        }
        self.inner.navigator.navigate(&Route::SignIn);
    }
}

/// Decode a response body, treating an empty body as JSON `null`.
fn decode<T: DeserializeOwned>(body: &str) -> Result<T, ApiError> {
    let body = if body.trim().is_empty() { "null" } else { body };
    serde_json::from_str(body).map_err(|e| {
        error!(
            error = %e,
            body = %truncate(body, LOG_BODY_LIMIT),
            "Failed to parse API response"
        );
        ApiError::Parse(e)
    })
}

fn truncate(s: &str, max_chars: usize) -> String {
    s.chars().take(max_chars).collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_empty_body_as_null() {
        let unit: () = decode("").unwrap();
        assert_eq!(unit, ());
        let none: Option<u32> = decode("  ").unwrap();
        assert_eq!(none, None);
    }

    #[test]
    fn test_decode_error_is_parse() {
        let err = decode::<Vec<u32>>("{oops").unwrap_err();
        assert!(matches!(err, ApiError::Parse(_)));
    }

    #[test]
    fn test_truncate_counts_chars() {
        assert_eq!(truncate("héllo", 2), "hé");
        assert_eq!(truncate("hi", 10), "hi");
    }
}
