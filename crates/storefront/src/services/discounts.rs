//! Admin coupon management.

use tracing::{info, instrument};

use bazaar_core::{Coupon, DiscountId};

use crate::api::normalize::{ItemPayload, ListPayload};
use crate::api::{ApiClient, ApiError, DiscountInput};

/// CRUD over `/discounts`. The backend enforces admin access.
#[derive(Clone)]
pub struct DiscountService {
    api: ApiClient,
}

impl DiscountService {
    /// Create a new discount service.
    #[must_use]
    pub const fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// All coupons.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<Coupon>, ApiError> {
        Ok(self
            .api
            .get::<ListPayload<Coupon>>("discounts")
            .await?
            .into_vec())
    }

    /// One coupon by code.
    ///
    /// # Errors
    ///
    /// Returns an error if the coupon is not found or the API request fails.
    #[instrument(skip(self))]
    pub async fn get(&self, code: &str) -> Result<Coupon, ApiError> {
        let path = format!("discounts/{}", urlencoding::encode(code.trim()));
        Ok(self.api.get::<ItemPayload<Coupon>>(&path).await?.into_inner())
    }

    /// Create a coupon.
    ///
    /// # Errors
    ///
    /// Returns an error if the API rejects the coupon.
    #[instrument(skip(self, input), fields(code = %input.code))]
    pub async fn create(&self, input: &DiscountInput) -> Result<Coupon, ApiError> {
        let coupon = self
            .api
            .post::<ItemPayload<Coupon>, _>("discounts", input)
            .await?
            .into_inner();
        info!(code = %coupon.code, "Coupon created");
        Ok(coupon)
    }

    /// Delete a coupon.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: DiscountId) -> Result<(), ApiError> {
        self.api.delete(&format!("discounts/{id}")).await?;
        info!(discount_id = %id, "Coupon deleted");
        Ok(())
    }
}
