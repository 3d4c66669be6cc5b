//! Product route handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use cinnamon_core::{CheckoutSource, OrderSummary, OrderType, Product, ProductId};

use crate::error::{AppError, add_breadcrumb};
use crate::middleware::Shop;
use crate::services::MirrorOp;
use crate::state::AppState;

/// Query parameters for product listing.
#[derive(Debug, Default, Deserialize)]
pub struct ProductsQuery {
    pub category: Option<String>,
}

/// A product with its display helpers.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductView {
    #[serde(flatten)]
    pub product: Product,
    pub price_display: String,
    pub bulk_price_display: String,
    pub unit_label: &'static str,
    pub in_stock: bool,
}

impl From<Product> for ProductView {
    fn from(product: Product) -> Self {
        let list = product.list_price();
        Self {
            price_display: list.display(),
            bulk_price_display: cinnamon_core::pricing::unit_price(list, OrderType::Bulk).display(),
            unit_label: product.unit_label(),
            in_stock: product.in_stock(),
            product,
        }
    }
}

/// Product listing, optionally filtered by category.
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<ProductsQuery>,
) -> Result<Json<Vec<ProductView>>, AppError> {
    let products = match query.category.as_deref().map(str::trim) {
        Some(category) if !category.is_empty() => {
            state.backend().get_products_by_category(category).await?
        }
        _ => state.backend().get_products().await?,
    };
    Ok(Json(products.into_iter().map(ProductView::from).collect()))
}

/// Product detail.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<Json<ProductView>, AppError> {
    let product = state.backend().get_product(id).await?;
    Ok(Json(ProductView::from(product)))
}

/// Buy now request body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuyNowRequest {
    pub quantity: u32,
    #[serde(default)]
    pub order_type: OrderType,
}

/// "Buy now" from the product page.
///
/// Under the add-to-cart policy the item also lands in the cart (and is
/// mirrored); the returned summary covers only this item either way.
#[instrument(skip(state, shop))]
pub async fn buy_now(
    State(state): State<AppState>,
    mut shop: Shop,
    Path(id): Path<ProductId>,
    Json(request): Json<BuyNowRequest>,
) -> Result<Json<OrderSummary>, AppError> {
    // Gate before touching the catalog
    shop.require_user("buy this item")?;
    let product = state.backend().get_product(id).await?;

    let summary = shop.buy_now(
        &product,
        request.quantity,
        request.order_type,
        state.config().buy_now_policy,
    )?;

    if summary.source == (CheckoutSource::DirectBuy { added_to_cart: true })
        && let (Some(user), Some(line)) = (shop.user(), shop.cart().get(id, request.order_type))
    {
        state.mirror().enqueue(&user.email, MirrorOp::upsert(line));
    }
    shop.save().await?;

    add_breadcrumb(
        "checkout",
        "Buy now",
        Some(&[
            ("product_id", &id.to_string()),
            ("order_type", request.order_type.as_str()),
        ]),
    );

    Ok(Json(summary))
}
