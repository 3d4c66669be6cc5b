//! The session cart.
//!
//! Lines are keyed by `(product, order type)`: the same product may sit in
//! the cart once as a single purchase and once as a bulk purchase, and adding
//! to an existing key grows that line instead of appending a duplicate.
//! Insertion order is preserved for display.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::pricing::{self, OrderType};
use crate::product::Product;
use crate::types::{CurrencyCode, Price, ProductId};

/// Errors from cart mutations. A failed mutation leaves the cart unchanged.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CartError {
    /// Requested quantity is below what the order type allows.
    #[error("{order_type} orders require a quantity of at least {minimum} (got {requested})")]
    BelowMinimum {
        order_type: OrderType,
        minimum: u32,
        requested: u32,
    },

    /// No line exists for the given key.
    #[error("no {order_type} line for product {product_id} in the cart")]
    LineNotFound {
        product_id: ProductId,
        order_type: OrderType,
    },

    /// Merging quantities would overflow.
    #[error("quantity too large")]
    QuantityOverflow,
}

/// Check a quantity against the order type's minimum.
///
/// # Errors
///
/// Returns [`CartError::BelowMinimum`] when `quantity` is too small.
pub const fn check_minimum(order_type: OrderType, quantity: u32) -> Result<(), CartError> {
    let minimum = order_type.minimum_quantity();
    if quantity < minimum {
        return Err(CartError::BelowMinimum {
            order_type,
            minimum,
            requested: quantity,
        });
    }
    Ok(())
}

/// Identity of a cart line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineKey {
    pub product_id: ProductId,
    pub order_type: OrderType,
}

impl LineKey {
    #[must_use]
    pub const fn new(product_id: ProductId, order_type: OrderType) -> Self {
        Self {
            product_id,
            order_type,
        }
    }
}

/// One product entry in the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    pub product_id: ProductId,
    pub name: String,
    /// Listed (undiscounted) unit price.
    pub unit_price: Price,
    pub image_ref: Option<String>,
    pub quantity: u32,
    pub order_type: OrderType,
    pub added_at: DateTime<Utc>,
}

impl LineItem {
    /// Build a line for `product`. Does not check the quantity minimum.
    #[must_use]
    pub fn for_product(
        product: &Product,
        quantity: u32,
        order_type: OrderType,
        added_at: DateTime<Utc>,
    ) -> Self {
        Self {
            product_id: product.id,
            name: product.name.clone(),
            unit_price: product.list_price(),
            image_ref: product.image_filename.clone(),
            quantity,
            order_type,
            added_at,
        }
    }

    #[must_use]
    pub const fn key(&self) -> LineKey {
        LineKey::new(self.product_id, self.order_type)
    }

    /// Unit price after the order-type discount.
    #[must_use]
    pub fn effective_unit_price(&self) -> Price {
        pricing::unit_price(self.unit_price, self.order_type)
    }

    /// Unrounded line total.
    #[must_use]
    pub fn line_total(&self) -> Price {
        pricing::line_total(self.unit_price, self.quantity, self.order_type)
    }

    /// Unrounded savings on this line.
    #[must_use]
    pub fn line_discount(&self) -> Price {
        pricing::line_discount(self.unit_price, self.quantity, self.order_type)
    }
}

/// What taking a paid quantity out of the cart did to its line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Taken {
    /// Nothing payable was left, so the line is gone.
    Removed(LineItem),
    /// The line stays with the remaining quantity.
    Reduced(LineItem),
}

/// The in-memory cart for one session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartStore {
    items: Vec<LineItem>,
}

impl CartStore {
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Rebuild a cart from persisted lines.
    ///
    /// Lines sharing a key are merged in order. Lines below their order
    /// type's minimum are dropped.
    #[must_use]
    pub fn restore(lines: impl IntoIterator<Item = LineItem>) -> Self {
        let mut cart = Self::new();
        for line in lines {
            if check_minimum(line.order_type, line.quantity).is_err() {
                continue;
            }
            // Overflowing merges keep the first line.
            let _ = cart.merge(line);
        }
        cart
    }

    /// Add `quantity` of `product` as `order_type`, stamped with the current time.
    ///
    /// # Errors
    ///
    /// See [`CartStore::add_at`].
    pub fn add(
        &mut self,
        product: &Product,
        quantity: u32,
        order_type: OrderType,
    ) -> Result<&LineItem, CartError> {
        self.add_at(product, quantity, order_type, Utc::now())
    }

    /// Add `quantity` of `product` as `order_type`.
    ///
    /// An existing line with the same key has its quantity increased and
    /// keeps its original `added_at`; otherwise a new line is appended.
    /// Returns the resulting line.
    ///
    /// # Errors
    ///
    /// - [`CartError::BelowMinimum`] if `quantity` is below the order type minimum
    /// - [`CartError::QuantityOverflow`] if the merged quantity would overflow
    pub fn add_at(
        &mut self,
        product: &Product,
        quantity: u32,
        order_type: OrderType,
        now: DateTime<Utc>,
    ) -> Result<&LineItem, CartError> {
        check_minimum(order_type, quantity)?;
        self.merge(LineItem::for_product(product, quantity, order_type, now))
    }

    fn merge(&mut self, line: LineItem) -> Result<&LineItem, CartError> {
        let key = line.key();
        match self.items.iter().position(|item| item.key() == key) {
            Some(index) => {
                let existing = self
                    .items
                    .get_mut(index)
                    .ok_or(CartError::LineNotFound {
                        product_id: key.product_id,
                        order_type: key.order_type,
                    })?;
                existing.quantity = existing
                    .quantity
                    .checked_add(line.quantity)
                    .ok_or(CartError::QuantityOverflow)?;
                Ok(existing)
            }
            None => {
                self.items.push(line);
                self.items.last().ok_or(CartError::LineNotFound {
                    product_id: key.product_id,
                    order_type: key.order_type,
                })
            }
        }
    }

    /// Remove the line for `(product_id, order_type)`.
    ///
    /// Returns the removed line, or `None` if there was nothing to remove.
    pub fn remove(&mut self, product_id: ProductId, order_type: OrderType) -> Option<LineItem> {
        let key = LineKey::new(product_id, order_type);
        let index = self.items.iter().position(|item| item.key() == key)?;
        Some(self.items.remove(index))
    }

    /// Set the quantity of an existing line.
    ///
    /// # Errors
    ///
    /// - [`CartError::BelowMinimum`] if `quantity` is below the order type minimum
    /// - [`CartError::LineNotFound`] if there is no such line
    ///
    /// The cart is unchanged on error.
    pub fn update_quantity(
        &mut self,
        product_id: ProductId,
        order_type: OrderType,
        quantity: u32,
    ) -> Result<&LineItem, CartError> {
        check_minimum(order_type, quantity)?;
        let key = LineKey::new(product_id, order_type);
        let line = self
            .items
            .iter_mut()
            .find(|item| item.key() == key)
            .ok_or(CartError::LineNotFound {
                product_id,
                order_type,
            })?;
        line.quantity = quantity;
        Ok(line)
    }

    /// Take `quantity` units out of a line.
    ///
    /// The line is removed when nothing would remain, or when the remainder
    /// would fall below its order type's minimum. Returns `None` if there is
    /// no such line.
    pub fn take(
        &mut self,
        product_id: ProductId,
        order_type: OrderType,
        quantity: u32,
    ) -> Option<Taken> {
        let key = LineKey::new(product_id, order_type);
        let index = self.items.iter().position(|item| item.key() == key)?;
        let line = self.items.get_mut(index)?;
        let remaining = line.quantity.saturating_sub(quantity);
        if remaining == 0 || check_minimum(order_type, remaining).is_err() {
            return Some(Taken::Removed(self.items.remove(index)));
        }
        line.quantity = remaining;
        Some(Taken::Reduced(line.clone()))
    }

    /// Remove every line.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Lines in insertion order.
    #[must_use]
    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    /// Look up a line by key.
    #[must_use]
    pub fn get(&self, product_id: ProductId, order_type: OrderType) -> Option<&LineItem> {
        let key = LineKey::new(product_id, order_type);
        self.items.iter().find(|item| item.key() == key)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of distinct lines.
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.items.len()
    }

    /// Total units across all lines.
    #[must_use]
    pub fn count(&self) -> u32 {
        self.items
            .iter()
            .fold(0_u32, |acc, item| acc.saturating_add(item.quantity))
    }

    /// Grand total after bulk discounts, rounded to cents.
    #[must_use]
    pub fn total(&self) -> Price {
        self.sum(LineItem::line_total)
    }

    /// Total at listed prices, rounded to cents.
    #[must_use]
    pub fn subtotal_before_discount(&self) -> Price {
        self.sum(|item| item.unit_price.times(item.quantity))
    }

    /// Total saved by bulk lines, rounded to cents.
    #[must_use]
    pub fn bulk_savings(&self) -> Price {
        self.sum(LineItem::line_discount)
    }

    fn currency(&self) -> CurrencyCode {
        self.items
            .first()
            .map_or_else(CurrencyCode::default, |item| item.unit_price.currency_code)
    }

    fn sum(&self, f: impl Fn(&LineItem) -> Price) -> Price {
        self.items
            .iter()
            .map(f)
            .fold(Price::zero(self.currency()), |acc, price| acc + price)
            .rounded()
    }
}
