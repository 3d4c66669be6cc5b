//! Checkout route handlers.

use axum::{Json, extract::State};
use serde::Deserialize;
use tracing::instrument;

use cinnamon_core::{OrderSummary, OrderType, ProductId};

use crate::error::{AppError, add_breadcrumb};
use crate::middleware::Shop;
use crate::state::AppState;

/// Checkout request body. Without `directBuy` the whole cart is checked out.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    #[serde(default)]
    pub direct_buy: Option<DirectBuy>,
}

/// A single item bought without going through the cart.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectBuy {
    pub product_id: ProductId,
    pub quantity: u32,
    #[serde(default)]
    pub order_type: OrderType,
}

/// Enter checkout.
#[instrument(skip(state, shop))]
pub async fn start(
    State(state): State<AppState>,
    mut shop: Shop,
    body: Option<Json<CheckoutRequest>>,
) -> Result<Json<OrderSummary>, AppError> {
    let request = body.map(|Json(request)| request).unwrap_or_default();

    let summary = match request.direct_buy {
        Some(item) => {
            shop.require_user("check out")?;
            let product = state.backend().get_product(item.product_id).await?;
            shop.checkout_direct(&product, item.quantity, item.order_type)?
        }
        None => shop.checkout_cart()?,
    };
    shop.save().await?;

    add_breadcrumb(
        "checkout",
        "Entered checkout",
        Some(&[
            ("items", &summary.item_count.to_string()),
            ("total", &summary.total.display()),
        ]),
    );

    Ok(Json(summary))
}

/// The order waiting for payment.
#[instrument(skip(shop))]
pub async fn pending(shop: Shop) -> Result<Json<OrderSummary>, AppError> {
    shop.require_user("check out")?;
    shop.pending_checkout()
        .cloned()
        .map(Json)
        .ok_or_else(|| AppError::NotFound("no checkout in progress".to_string()))
}
