//! Cart and session views.

use serde::Serialize;

use cinnamon_core::{CartStore, LineItem, OrderType, Price, ProductId, ShopSession, User};

/// One cart line with its derived prices.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLineView {
    pub product_id: ProductId,
    pub name: String,
    pub image_ref: Option<String>,
    pub order_type: OrderType,
    pub order_type_label: &'static str,
    pub quantity: u32,
    pub list_unit_price: Price,
    pub unit_price: Price,
    pub line_total: Price,
    pub line_discount: Price,
    /// Line total formatted for display, e.g. `$36.00`.
    pub line_total_display: String,
}

impl From<&LineItem> for CartLineView {
    fn from(item: &LineItem) -> Self {
        let line_total = item.line_total().rounded();
        Self {
            product_id: item.product_id,
            name: item.name.clone(),
            image_ref: item.image_ref.clone(),
            order_type: item.order_type,
            order_type_label: item.order_type.label(),
            quantity: item.quantity,
            list_unit_price: item.unit_price,
            unit_price: item.effective_unit_price().rounded(),
            line_total,
            line_discount: item.line_discount().rounded(),
            line_total_display: line_total.display(),
        }
    }
}

/// The whole cart with totals.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartView {
    pub items: Vec<CartLineView>,
    /// Units across all lines.
    pub count: u32,
    pub line_count: usize,
    pub subtotal: Price,
    pub bulk_savings: Price,
    pub total: Price,
    pub total_display: String,
}

impl From<&CartStore> for CartView {
    fn from(cart: &CartStore) -> Self {
        let total = cart.total();
        Self {
            items: cart.items().iter().map(CartLineView::from).collect(),
            count: cart.count(),
            line_count: cart.line_count(),
            subtotal: cart.subtotal_before_discount(),
            bulk_savings: cart.bulk_savings(),
            total,
            total_display: total.display(),
        }
    }
}

/// Who is logged in, plus the cart badge.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub user: Option<User>,
    pub display_name: Option<String>,
    pub cart_count: u32,
    /// Whether the login pulled a saved cart into the session.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub cart_restored: bool,
}

impl SessionView {
    #[must_use]
    pub fn of(session: &ShopSession) -> Self {
        Self {
            user: session.user().cloned(),
            display_name: session.user().map(User::display_name),
            cart_count: session.cart().count(),
            cart_restored: false,
        }
    }

    #[must_use]
    pub const fn with_cart_restored(mut self, restored: bool) -> Self {
        self.cart_restored = restored;
        self
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;
    use rust_decimal::Decimal;

    use cinnamon_core::Product;

    use super::*;

    fn cinnamon() -> Product {
        Product {
            id: ProductId::new(1),
            name: "Ceylon Cinnamon Sticks".to_string(),
            category: "spices".to_string(),
            price: Decimal::from(20),
            stock_quantity: 50,
            description: None,
            image_filename: Some("sticks.jpg".to_string()),
        }
    }

    #[test]
    fn test_cart_view_totals() {
        let mut cart = CartStore::new();
        let now = Utc::now();
        cart.add_at(&cinnamon(), 2, OrderType::Single, now).unwrap();
        cart.add_at(&cinnamon(), 10, OrderType::Bulk, now).unwrap();

        let view = CartView::from(&cart);
        assert_eq!(view.line_count, 2);
        assert_eq!(view.count, 12);
        assert_eq!(view.total_display, "$220.00");

        let bulk = view
            .items
            .iter()
            .find(|line| line.order_type == OrderType::Bulk)
            .unwrap();
        assert_eq!(bulk.unit_price.amount, Decimal::from(18));
        assert_eq!(bulk.line_discount.amount, Decimal::from(20));
    }

    #[test]
    fn test_session_view_anonymous() {
        let view = SessionView::of(&ShopSession::new());
        assert!(view.user.is_none());
        assert_eq!(view.cart_count, 0);

        let json = serde_json::to_value(&view).unwrap();
        assert!(json.get("cartRestored").is_none());
    }
}
