//! Cart route handlers.
//!
//! The session cart is authoritative: every handler changes it, saves the
//! session, then queues the same change for the cart mirror without waiting.

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use cinnamon_core::{OrderType, ProductId};

use crate::error::{AppError, add_breadcrumb};
use crate::middleware::{RequireAuth, Shop};
use crate::models::CartView;
use crate::services::{MirrorOp, SyncFailure};
use crate::state::AppState;

/// Add to cart request body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddToCartRequest {
    pub product_id: ProductId,
    pub quantity: u32,
    #[serde(default)]
    pub order_type: OrderType,
}

/// Update quantity request body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCartRequest {
    pub product_id: ProductId,
    pub order_type: OrderType,
    pub quantity: u32,
}

/// Remove line request body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveFromCartRequest {
    pub product_id: ProductId,
    pub order_type: OrderType,
}

/// Cart after a removal.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveResponse {
    pub removed: bool,
    pub cart: CartView,
}

/// Cart badge count.
#[derive(Debug, Serialize)]
pub struct CountResponse {
    pub count: u32,
}

/// Mirror status for the current user.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncStatus {
    pub in_sync: bool,
    pub failure: Option<SyncFailure>,
}

/// The current cart. Anonymous sessions see an empty cart.
#[instrument(skip(shop))]
pub async fn show(shop: Shop) -> Json<CartView> {
    Json(CartView::from(shop.cart()))
}

/// Add an item. The price always comes from the catalog.
#[instrument(skip(state, shop))]
pub async fn add(
    State(state): State<AppState>,
    mut shop: Shop,
    Json(request): Json<AddToCartRequest>,
) -> Result<Json<CartView>, AppError> {
    shop.require_user("add items to your cart")?;
    let product = state.backend().get_product(request.product_id).await?;

    let line = shop.add_to_cart(&product, request.quantity, request.order_type)?;
    shop.save().await?;

    if let Some(user) = shop.user() {
        state.mirror().enqueue(&user.email, MirrorOp::upsert(&line));
    }
    add_breadcrumb(
        "cart",
        "Added to cart",
        Some(&[
            ("product_id", &line.product_id.to_string()),
            ("order_type", line.order_type.as_str()),
            ("quantity", &line.quantity.to_string()),
        ]),
    );

    Ok(Json(CartView::from(shop.cart())))
}

/// Change a line's quantity. Below the minimum is rejected and nothing changes.
#[instrument(skip(state, shop))]
pub async fn update(
    State(state): State<AppState>,
    mut shop: Shop,
    Json(request): Json<UpdateCartRequest>,
) -> Result<Json<CartView>, AppError> {
    let line =
        shop.update_cart_quantity(request.product_id, request.order_type, request.quantity)?;
    shop.save().await?;

    if let Some(user) = shop.user() {
        state.mirror().enqueue(
            &user.email,
            MirrorOp::SetQuantity {
                product_id: line.product_id,
                order_type: line.order_type,
                quantity: line.quantity,
            },
        );
    }
    add_breadcrumb(
        "cart",
        "Updated quantity",
        Some(&[
            ("product_id", &line.product_id.to_string()),
            ("quantity", &line.quantity.to_string()),
        ]),
    );

    Ok(Json(CartView::from(shop.cart())))
}

/// Remove a line. Removing a missing line is not an error.
#[instrument(skip(state, shop))]
pub async fn remove(
    State(state): State<AppState>,
    mut shop: Shop,
    Json(request): Json<RemoveFromCartRequest>,
) -> Result<Json<RemoveResponse>, AppError> {
    let removed = shop.remove_from_cart(request.product_id, request.order_type)?;

    if let Some(line) = &removed {
        shop.save().await?;
        if let Some(user) = shop.user() {
            state.mirror().enqueue(
                &user.email,
                MirrorOp::Remove {
                    product_id: line.product_id,
                    order_type: line.order_type,
                },
            );
        }
        add_breadcrumb(
            "cart",
            "Removed from cart",
            Some(&[("product_id", &line.product_id.to_string())]),
        );
    }

    Ok(Json(RemoveResponse {
        removed: removed.is_some(),
        cart: CartView::from(shop.cart()),
    }))
}

/// Empty the cart.
#[instrument(skip(state, shop))]
pub async fn clear(
    State(state): State<AppState>,
    mut shop: Shop,
) -> Result<Json<CartView>, AppError> {
    shop.clear_cart()?;
    shop.save().await?;

    if let Some(user) = shop.user() {
        state.mirror().enqueue(&user.email, MirrorOp::Clear);
    }
    add_breadcrumb("cart", "Cleared cart", None);

    Ok(Json(CartView::from(shop.cart())))
}

/// Cart badge count.
#[instrument(skip(shop))]
pub async fn count(shop: Shop) -> Json<CountResponse> {
    Json(CountResponse {
        count: shop.cart().count(),
    })
}

/// The last mirror failure for this user, if it has not since recovered.
#[instrument(skip(state, user), fields(email = %user.email))]
pub async fn sync_status(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Json<SyncStatus> {
    let failure = state.mirror().failure(&user.email).await;
    Json(SyncStatus {
        in_sync: failure.is_none(),
        failure,
    })
}

/// Rewrite the remote cart from the session cart and report the outcome.
#[instrument(skip(state, shop))]
pub async fn resync(
    State(state): State<AppState>,
    shop: Shop,
) -> Result<Json<SyncStatus>, AppError> {
    let user = shop.require_user("sync your cart")?;
    let mirror = state.mirror();
    mirror.enqueue(&user.email, MirrorOp::replace(shop.cart()));
    mirror.flush().await;

    let failure = mirror.failure(&user.email).await;
    Ok(Json(SyncStatus {
        in_sync: failure.is_none(),
        failure,
    }))
}
