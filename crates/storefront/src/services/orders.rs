//! Orders and saved addresses.

use serde::Serialize;
use tracing::{info, instrument};

use bazaar_core::{Order, OrderId, StatusId};

use crate::api::normalize::{ItemPayload, ListPayload};
use crate::api::{Address, AddressInput, ApiClient, ApiError};

#[derive(Debug, Serialize)]
struct StatusUpdate {
    status: StatusId,
}

/// Order history, admin status changes and the address book.
#[derive(Clone)]
pub struct OrderService {
    api: ApiClient,
}

impl OrderService {
    /// Create a new order service.
    #[must_use]
    pub const fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// Orders visible to the signed-in user (all orders for admins).
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn list_orders(&self) -> Result<Vec<Order>, ApiError> {
        Ok(self
            .api
            .get::<ListPayload<Order>>("orders")
            .await?
            .into_vec())
    }

    /// One order.
    ///
    /// # Errors
    ///
    /// Returns an error if the order is not found or the API request fails.
    #[instrument(skip(self))]
    pub async fn order(&self, id: OrderId) -> Result<Order, ApiError> {
        Ok(self
            .api
            .get::<ItemPayload<Order>>(&format!("orders/{id}"))
            .await?
            .into_inner())
    }

    /// Move an order to another status. Admin only; the backend enforces it.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn update_status(&self, id: OrderId, status: StatusId) -> Result<Order, ApiError> {
        let order = self
            .api
            .patch::<ItemPayload<Order>, _>(&format!("orders/{id}/status"), &StatusUpdate { status })
            .await?
            .into_inner();
        info!(order_id = %id, status = %order.status.name, "Order status updated");
        Ok(order)
    }

    /// Saved addresses of the signed-in user.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn addresses(&self) -> Result<Vec<Address>, ApiError> {
        Ok(self
            .api
            .get::<ListPayload<Address>>("addresses")
            .await?
            .into_vec())
    }

    /// The address flagged as default, or the first one saved.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    pub async fn default_address(&self) -> Result<Option<Address>, ApiError> {
        let addresses = self.addresses().await?;
        let default = addresses.iter().position(|a| a.is_default).unwrap_or(0);
        Ok(addresses.into_iter().nth(default))
    }

    /// Save a new address.
    ///
    /// # Errors
    ///
    /// Returns an error if the API rejects the address.
    #[instrument(skip(self, input))]
    pub async fn create_address(&self, input: &AddressInput) -> Result<Address, ApiError> {
        Ok(self
            .api
            .post::<ItemPayload<Address>, _>("addresses", input)
            .await?
            .into_inner())
    }
}
