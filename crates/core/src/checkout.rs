//! Checkout handoff: cart (or a single direct-buy item) to order summary.
//!
//! An [`OrderSummary`] is an immutable, fully priced snapshot. The payment
//! step charges its `total` and uses its `source` to decide what to clear
//! once the payment completes.

use core::str::FromStr;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::cart::{self, CartError, CartStore, LineItem};
use crate::pricing::OrderType;
use crate::product::Product;
use crate::types::{CurrencyCode, Price, ProductId};

/// Errors entering checkout.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CheckoutError {
    /// Nothing to check out.
    #[error("there are no items to check out")]
    EmptyCart,

    /// The direct-buy item broke a cart rule.
    #[error(transparent)]
    Cart(#[from] CartError),
}

/// Where the summarized lines came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum CheckoutSource {
    /// The whole cart.
    Cart,
    /// One item bought from a product page.
    #[serde(rename_all = "camelCase")]
    DirectBuy {
        /// Whether the item was also put into the cart.
        added_to_cart: bool,
    },
}

impl CheckoutSource {
    /// Whether the summarized lines sit in the cart.
    ///
    /// Such a checkout goes stale when the cart changes, and a completed
    /// payment takes exactly the paid lines out of the cart. Only an
    /// isolated direct buy is independent of the cart.
    #[must_use]
    pub const fn draws_from_cart(self) -> bool {
        !matches!(
            self,
            Self::DirectBuy {
                added_to_cart: false
            }
        )
    }
}

/// What "buy now" does to the shared cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BuyNowPolicy {
    /// Put the item in the cart, then check out only that item.
    #[default]
    AddToCart,
    /// Check out the item without touching the cart.
    Isolated,
}

/// Error parsing a [`BuyNowPolicy`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown buy-now policy '{0}' (expected add-to-cart or isolated)")]
pub struct UnknownBuyNowPolicy(pub String);

impl FromStr for BuyNowPolicy {
    type Err = UnknownBuyNowPolicy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "add-to-cart" | "add_to_cart" => Ok(Self::AddToCart),
            "isolated" => Ok(Self::Isolated),
            other => Err(UnknownBuyNowPolicy(other.to_string())),
        }
    }
}

/// One priced line of an order summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricedLine {
    pub product_id: ProductId,
    pub name: String,
    pub image_ref: Option<String>,
    pub order_type: OrderType,
    pub quantity: u32,
    pub list_unit_price: Price,
    /// Unit price after discount, rounded to cents.
    pub unit_price: Price,
    /// Line total, rounded to cents.
    pub line_total: Price,
}

impl From<&LineItem> for PricedLine {
    fn from(item: &LineItem) -> Self {
        Self {
            product_id: item.product_id,
            name: item.name.clone(),
            image_ref: item.image_ref.clone(),
            order_type: item.order_type,
            quantity: item.quantity,
            list_unit_price: item.unit_price,
            unit_price: item.effective_unit_price().rounded(),
            line_total: item.line_total().rounded(),
        }
    }
}

/// Immutable, priced view of what is being bought.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderSummary {
    pub source: CheckoutSource,
    pub lines: Vec<PricedLine>,
    /// Total at listed prices.
    pub subtotal: Price,
    pub bulk_discount: Price,
    /// Amount to charge.
    pub total: Price,
    /// Units across all lines.
    pub item_count: u32,
}

impl OrderSummary {
    /// Summarize the whole cart.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::EmptyCart`] when the cart has no lines.
    pub fn from_cart(cart: &CartStore) -> Result<Self, CheckoutError> {
        if cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }
        Ok(Self {
            source: CheckoutSource::Cart,
            lines: cart.items().iter().map(PricedLine::from).collect(),
            subtotal: cart.subtotal_before_discount(),
            bulk_discount: cart.bulk_savings(),
            total: cart.total(),
            item_count: cart.count(),
        })
    }

    /// Summarize a single item without consulting any cart.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::Cart`] if the quantity is below the order
    /// type minimum.
    pub fn direct_buy(
        product: &Product,
        quantity: u32,
        order_type: OrderType,
    ) -> Result<Self, CheckoutError> {
        Self::direct(product, quantity, order_type, false)
    }

    fn direct(
        product: &Product,
        quantity: u32,
        order_type: OrderType,
        added_to_cart: bool,
    ) -> Result<Self, CheckoutError> {
        cart::check_minimum(order_type, quantity)?;
        // A one-line scratch cart keeps the arithmetic identical to the cart view.
        let mut scratch = CartStore::new();
        scratch.add_at(product, quantity, order_type, Utc::now())?;
        let mut summary = Self::from_cart(&scratch)?;
        summary.source = CheckoutSource::DirectBuy { added_to_cart };
        Ok(summary)
    }

    /// Whether any line carries the bulk discount.
    #[must_use]
    pub fn has_bulk_lines(&self) -> bool {
        self.lines
            .iter()
            .any(|line| line.order_type == OrderType::Bulk)
    }

    /// Currency of the charge.
    #[must_use]
    pub const fn currency(&self) -> CurrencyCode {
        self.total.currency_code
    }
}

/// "Buy now" from a product page.
///
/// Under [`BuyNowPolicy::AddToCart`] the item is added to `cart` first; the
/// returned summary covers only the bought item either way, and paying it
/// takes only that quantity back out of the cart.
///
/// # Errors
///
/// Returns [`CheckoutError::Cart`] if the quantity is invalid. The cart is
/// unchanged on error.
pub fn buy_now(
    cart: &mut CartStore,
    product: &Product,
    quantity: u32,
    order_type: OrderType,
    policy: BuyNowPolicy,
) -> Result<OrderSummary, CheckoutError> {
    let added_to_cart = policy == BuyNowPolicy::AddToCart;
    let summary = OrderSummary::direct(product, quantity, order_type, added_to_cart)?;
    if added_to_cart {
        cart.add(product, quantity, order_type)?;
    }
    Ok(summary)
}
