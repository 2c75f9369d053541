//! Debounced product search.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tracing::{debug, instrument};

use crate::api::{ApiError, Product, ProductQuery};
use crate::services::catalog::CatalogService;

/// Delays product searches until typing pauses.
///
/// Every call to [`search`](Self::search) supersedes the calls before it.
/// A superseded call resolves to `Ok(None)` and never reaches the API; a
/// call superseded while its request is in flight also resolves to `None`
/// so stale results are never shown.
#[derive(Clone)]
pub struct SearchDebouncer {
    catalog: CatalogService,
    delay: Duration,
    generation: Arc<AtomicU64>,
}

impl SearchDebouncer {
    /// Create a debouncer that waits `delay` of quiet before searching.
    #[must_use]
    pub fn new(catalog: CatalogService, delay: Duration) -> Self {
        Self {
            catalog,
            delay,
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Search for `term`, optionally inside a category.
    ///
    /// A blank term lists the category (or everything).
    ///
    /// # Errors
    ///
    /// Returns an error if the search request fails.
    #[instrument(skip(self, query), fields(search = ?query.search))]
    pub async fn search(&self, mut query: ProductQuery) -> Result<Option<Vec<Product>>, ApiError> {
        let ticket = self.generation.fetch_add(1, Ordering::AcqRel) + 1;

        tokio::time::sleep(self.delay).await;
        if self.is_superseded(ticket) {
            debug!("Search superseded before sending");
            return Ok(None);
        }

        query.search = query
            .search
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());
        let products = self.catalog.products(&query).await?;

        if self.is_superseded(ticket) {
            debug!("Search superseded while in flight");
            return Ok(None);
        }
        Ok(Some(products))
    }

    fn is_superseded(&self, ticket: u64) -> bool {
        self.generation.load(Ordering::Acquire) != ticket
    }
}
