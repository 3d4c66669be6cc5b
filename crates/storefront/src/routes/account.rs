//! Account dashboard.

use axum::{Json, extract::State};
use serde::Serialize;
use tracing::instrument;

use cinnamon_core::User;

use crate::backend::PaymentRecord;
use crate::error::AppError;
use crate::middleware::Shop;
use crate::models::CartView;
use crate::state::AppState;

/// Account dashboard data.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountView {
    pub user: User,
    pub display_name: String,
    pub cart: CartView,
    /// Completed payments by this user.
    pub orders: Vec<PaymentRecord>,
    /// Set when the order history could not be loaded.
    #[serde(rename = "orders_error", skip_serializing_if = "Option::is_none")]
    pub orders_error: Option<String>,
}

/// Profile, cart summary and order history.
///
/// A payment service outage degrades to an empty order list.
#[instrument(skip(state, shop))]
pub async fn index(
    State(state): State<AppState>,
    shop: Shop,
) -> Result<Json<AccountView>, AppError> {
    let user = shop.require_user("view your account")?.clone();

    let (orders, orders_error) = match state.backend().list_payments().await {
        Ok(payments) => (
            payments
                .into_iter()
                .filter(|payment| payment.is_completed_order_of(user.email.as_str()))
                .collect(),
            None,
        ),
        Err(e) => {
            tracing::warn!(email = %user.email, error = %e, "Failed to load order history");
            (Vec::new(), Some("Could not load your orders right now".to_string()))
        }
    };

    Ok(Json(AccountView {
        display_name: user.display_name(),
        cart: CartView::from(shop.cart()),
        user,
        orders,
        orders_error,
    }))
}
