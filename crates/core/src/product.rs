//! Catalog product as served by the product backend.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{Price, ProductId};

/// A sellable product.
///
/// The catalog speaks a mix of `camelCase` and `snake_case`; both spellings
/// of the multi-word fields are accepted on input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub category: String,
    /// Listed unit price in USD.
    pub price: Decimal,
    #[serde(default, alias = "stock_quantity")]
    pub stock_quantity: i64,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, alias = "image_filename")]
    pub image_filename: Option<String>,
}

impl Product {
    /// Listed unit price as a [`Price`].
    #[must_use]
    pub const fn list_price(&self) -> Price {
        Price::usd(self.price)
    }

    /// Unit the price is quoted per. Oils are sold by volume.
    #[must_use]
    pub fn unit_label(&self) -> &'static str {
        if self.name.to_lowercase().contains("oil") {
            "per 100ml"
        } else {
            "per 100g"
        }
    }

    /// Whether any stock is on hand.
    #[must_use]
    pub const fn in_stock(&self) -> bool {
        self.stock_quantity > 0
    }
}
