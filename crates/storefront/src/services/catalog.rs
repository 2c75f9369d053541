//! Catalog reads: products, categories, countries and order statuses.
//!
//! Reference lists (categories, countries, statuses) are cached using `moka`
//! (5-minute TTL). Products are never cached; stock and prices change.

use std::time::Duration;

use moka::future::Cache;
use tracing::{debug, instrument};

use bazaar_core::ProductId;

use crate::api::normalize::{ItemPayload, ListPayload};
use crate::api::{ApiClient, ApiError, Category, Country, Product, ProductQuery, Status};

/// How long reference lists stay cached.
const CACHE_TTL: Duration = Duration::from_secs(300);

const CATEGORIES_KEY: &str = "categories";
const COUNTRIES_KEY: &str = "countries";
const STATUSES_KEY: &str = "statuses";

#[derive(Clone)]
enum CacheValue {
    Categories(Vec<Category>),
    Countries(Vec<Country>),
    Statuses(Vec<Status>),
}

/// Read access to the catalog.
///
/// Cheaply cloneable; clones share the cache.
#[derive(Clone)]
pub struct CatalogService {
    api: ApiClient,
    cache: Cache<&'static str, CacheValue>,
}

impl CatalogService {
    /// Create a new catalog service.
    #[must_use]
    pub fn new(api: ApiClient) -> Self {
        let cache = Cache::builder()
            .max_capacity(16)
            .time_to_live(CACHE_TTL)
            .build();
        Self { api, cache }
    }

    /// List products matching `query`.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn products(&self, query: &ProductQuery) -> Result<Vec<Product>, ApiError> {
        let products = self
            .api
            .get_query::<ListPayload<Product>, _>("products", query)
            .await?
            .into_vec();
        debug!(count = products.len(), "Fetched products");
        Ok(products)
    }

    /// Fetch one product.
    ///
    /// # Errors
    ///
    /// Returns an error if the product is not found or the API request fails.
    #[instrument(skip(self))]
    pub async fn product(&self, id: ProductId) -> Result<Product, ApiError> {
        Ok(self
            .api
            .get::<ItemPayload<Product>>(&format!("products/{id}"))
            .await?
            .into_inner())
    }

    /// All categories.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn categories(&self) -> Result<Vec<Category>, ApiError> {
        if let Some(CacheValue::Categories(categories)) = self.cache.get(CATEGORIES_KEY).await {
            debug!("Cache hit for categories");
            return Ok(categories);
        }

        let categories = self
            .api
            .get::<ListPayload<Category>>("categories")
            .await?
            .into_vec();
        self.cache
            .insert(CATEGORIES_KEY, CacheValue::Categories(categories.clone()))
            .await;
        Ok(categories)
    }

    /// A random selection of categories for the home page. Never cached.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn random_categories(&self) -> Result<Vec<Category>, ApiError> {
        Ok(self
            .api
            .get::<ListPayload<Category>>("categories/random")
            .await?
            .into_vec())
    }

    /// Countries offered at checkout.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn countries(&self) -> Result<Vec<Country>, ApiError> {
        if let Some(CacheValue::Countries(countries)) = self.cache.get(COUNTRIES_KEY).await {
            debug!("Cache hit for countries");
            return Ok(countries);
        }

        let countries = self
            .api
            .get::<ListPayload<Country>>("countries")
            .await?
            .into_vec();
        self.cache
            .insert(COUNTRIES_KEY, CacheValue::Countries(countries.clone()))
            .await;
        Ok(countries)
    }

    /// Order statuses for the admin order view.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn statuses(&self) -> Result<Vec<Status>, ApiError> {
        if let Some(CacheValue::Statuses(statuses)) = self.cache.get(STATUSES_KEY).await {
            debug!("Cache hit for statuses");
            return Ok(statuses);
        }

        let statuses = self
            .api
            .get::<ListPayload<Status>>("statuses")
            .await?
            .into_vec();
        self.cache
            .insert(STATUSES_KEY, CacheValue::Statuses(statuses.clone()))
            .await;
        Ok(statuses)
    }

    /// Drop every cached list.
    pub fn invalidate(&self) {
        self.cache.invalidate_all();
    }
}
