//! Persisted cart, keyed by the user's email.

use cinnamon_core::{OrderType, ProductId};
use tracing::instrument;

use super::types::{QuantityUpdate, RemoteCartItem};
use super::{BackendClient, BackendError, Service, check_status, read_json};

impl BackendClient {
    fn cart_url(&self, email: &str, suffix: &str) -> String {
        self.url(
            Service::Commerce,
            &format!("/api/cart/database/{}{suffix}", urlencoding::encode(email)),
        )
    }

    fn cart_line_url(&self, email: &str, product_id: ProductId, order_type: OrderType) -> String {
        self.cart_url(email, &format!("/items/{product_id}/{order_type}"))
    }

    /// Fetch the persisted cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn fetch_remote_cart(&self, email: &str) -> Result<Vec<RemoteCartItem>, BackendError> {
        let response = self.http().get(self.cart_url(email, "")).send().await?;
        read_json(response).await
    }

    /// Insert or replace the line for `item`'s product and order type.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, item), fields(product_id = %item.product_id, order_type = %item.order_type))]
    pub async fn upsert_remote_item(
        &self,
        email: &str,
        item: &RemoteCartItem,
    ) -> Result<(), BackendError> {
        let response = self
            .http()
            .post(self.cart_url(email, "/items"))
            .json(item)
            .send()
            .await?;
        check_status(response).await?;
        Ok(())
    }

    /// Set a line's quantity.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn update_remote_quantity(
        &self,
        email: &str,
        product_id: ProductId,
        order_type: OrderType,
        quantity: u32,
    ) -> Result<(), BackendError> {
        let response = self
            .http()
            .put(self.cart_line_url(email, product_id, order_type))
            .json(&QuantityUpdate { quantity })
            .send()
            .await?;
        check_status(response).await?;
        Ok(())
    }

    /// Remove a line.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn remove_remote_item(
        &self,
        email: &str,
        product_id: ProductId,
        order_type: OrderType,
    ) -> Result<(), BackendError> {
        let response = self
            .http()
            .delete(self.cart_line_url(email, product_id, order_type))
            .send()
            .await?;
        check_status(response).await?;
        Ok(())
    }

    /// Empty the persisted cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn clear_remote_cart(&self, email: &str) -> Result<(), BackendError> {
        let response = self.http().delete(self.cart_url(email, "")).send().await?;
        check_status(response).await?;
        Ok(())
    }
}
