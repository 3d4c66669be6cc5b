//! Per-session store object and the auth gate in front of it.
//!
//! A [`ShopSession`] holds everything one browser session owns: who is
//! logged in, their cart, the checkout waiting for payment, and the last
//! receipt. Cart mutations and checkout entry go through the gate; an
//! anonymous session gets [`ShopError::LoginRequired`] and stays unchanged.

use serde::{Deserialize, Serialize};

use crate::cart::{CartError, CartStore, LineItem, Taken};
use crate::checkout::{self, BuyNowPolicy, CheckoutError, OrderSummary};
use crate::payment::PaymentReceipt;
use crate::pricing::OrderType;
use crate::product::Product;
use crate::types::{Email, ProductId};

/// A logged-in shopper.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub email: Email,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub mobile: String,
}

impl User {
    /// "First Last", trimmed. Empty when neither name is known.
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name.trim(), self.last_name.trim())
            .trim()
            .to_string()
    }

    /// Full name, falling back to the email local part.
    #[must_use]
    pub fn display_name(&self) -> String {
        let name = self.full_name();
        if name.is_empty() {
            self.email.local_part().to_string()
        } else {
            name
        }
    }
}

/// Authentication state of a session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "user", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuthState {
    #[default]
    Anonymous,
    Authenticated(User),
}

/// Errors from gated session operations.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ShopError {
    /// The operation needs a logged-in user.
    #[error("please log in to {action}")]
    LoginRequired { action: &'static str },

    #[error(transparent)]
    Cart(#[from] CartError),

    #[error(transparent)]
    Checkout(#[from] CheckoutError),
}

/// What a completed payment did to the cart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CartSettlement {
    /// The cart was not touched.
    Untouched,
    /// Every line was paid for, so the cart is empty.
    Cleared,
    /// The paid lines were taken out; the rest of the cart stays.
    Lines(Vec<Taken>),
}

/// Everything one browser session owns.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShopSession {
    auth: AuthState,
    cart: CartStore,
    pending_checkout: Option<OrderSummary>,
    last_receipt: Option<PaymentReceipt>,
    contact_edit_token: Option<String>,
}

impl ShopSession {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // =========================================================================
    // Auth gate
    // =========================================================================

    /// ANONYMOUS → AUTHENTICATED.
    ///
    /// Logging in as a different user first drops the previous user's cart
    /// and checkout, as a logout would.
    pub fn login(&mut self, user: User) {
        if let AuthState::Authenticated(current) = &self.auth
            && current.email != user.email
        {
            self.logout();
        }
        self.auth = AuthState::Authenticated(user);
    }

    /// AUTHENTICATED → ANONYMOUS, clearing the cart, pending checkout, last
    /// receipt and contact edit token. Returns the user who was logged in.
    pub fn logout(&mut self) -> Option<User> {
        self.cart.clear();
        self.pending_checkout = None;
        self.last_receipt = None;
        self.contact_edit_token = None;
        match std::mem::take(&mut self.auth) {
            AuthState::Authenticated(user) => Some(user),
            AuthState::Anonymous => None,
        }
    }

    #[must_use]
    pub const fn auth(&self) -> &AuthState {
        &self.auth
    }

    #[must_use]
    pub const fn user(&self) -> Option<&User> {
        match &self.auth {
            AuthState::Authenticated(user) => Some(user),
            AuthState::Anonymous => None,
        }
    }

    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        matches!(self.auth, AuthState::Authenticated(_))
    }

    /// The logged-in user, or a login prompt for `action`.
    ///
    /// # Errors
    ///
    /// Returns [`ShopError::LoginRequired`] for anonymous sessions.
    pub fn require_user(&self, action: &'static str) -> Result<&User, ShopError> {
        self.user().ok_or(ShopError::LoginRequired { action })
    }

    // =========================================================================
    // Cart (gated mutations)
    // =========================================================================

    #[must_use]
    pub const fn cart(&self) -> &CartStore {
        &self.cart
    }

    /// Add to the cart. Returns the resulting line.
    ///
    /// # Errors
    ///
    /// [`ShopError::LoginRequired`] when anonymous, [`ShopError::Cart`] when
    /// the quantity is invalid.
    pub fn add_to_cart(
        &mut self,
        product: &Product,
        quantity: u32,
        order_type: OrderType,
    ) -> Result<LineItem, ShopError> {
        self.require_user("add items to your cart")?;
        let line = self.cart.add(product, quantity, order_type)?.clone();
        self.cart_changed();
        Ok(line)
    }

    /// Remove a line. Returns the removed line, if any.
    ///
    /// # Errors
    ///
    /// [`ShopError::LoginRequired`] when anonymous.
    pub fn remove_from_cart(
        &mut self,
        product_id: ProductId,
        order_type: OrderType,
    ) -> Result<Option<LineItem>, ShopError> {
        self.require_user("change your cart")?;
        let removed = self.cart.remove(product_id, order_type);
        if removed.is_some() {
            self.cart_changed();
        }
        Ok(removed)
    }

    /// Change a line's quantity.
    ///
    /// # Errors
    ///
    /// [`ShopError::LoginRequired`] when anonymous, [`ShopError::Cart`] when
    /// the quantity is below the minimum or the line is missing.
    pub fn update_cart_quantity(
        &mut self,
        product_id: ProductId,
        order_type: OrderType,
        quantity: u32,
    ) -> Result<LineItem, ShopError> {
        self.require_user("change your cart")?;
        let line = self
            .cart
            .update_quantity(product_id, order_type, quantity)?
            .clone();
        self.cart_changed();
        Ok(line)
    }

    /// Empty the cart.
    ///
    /// # Errors
    ///
    /// [`ShopError::LoginRequired`] when anonymous.
    pub fn clear_cart(&mut self) -> Result<(), ShopError> {
        self.require_user("change your cart")?;
        self.cart.clear();
        self.cart_changed();
        Ok(())
    }

    /// Replace the cart with lines pulled from a remote copy.
    ///
    /// Only applies when the local cart is empty; local state wins otherwise.
    /// Returns whether the cart was replaced.
    pub fn hydrate_cart(&mut self, lines: Vec<LineItem>) -> bool {
        if !self.is_authenticated() || !self.cart.is_empty() || lines.is_empty() {
            return false;
        }
        self.cart = CartStore::restore(lines);
        self.cart_changed();
        !self.cart.is_empty()
    }

    /// Drop a pending checkout whose lines came from the cart; it no longer
    /// matches what the cart holds.
    fn cart_changed(&mut self) {
        if self
            .pending_checkout
            .as_ref()
            .is_some_and(|summary| summary.source.draws_from_cart())
        {
            self.pending_checkout = None;
        }
    }

    // =========================================================================
    // Checkout
    // =========================================================================

    /// Enter checkout with the whole cart.
    ///
    /// # Errors
    ///
    /// [`ShopError::LoginRequired`] when anonymous, [`CheckoutError::EmptyCart`]
    /// when there is nothing to buy.
    pub fn checkout_cart(&mut self) -> Result<OrderSummary, ShopError> {
        self.require_user("check out")?;
        let summary = OrderSummary::from_cart(&self.cart)?;
        self.pending_checkout = Some(summary.clone());
        Ok(summary)
    }

    /// Enter checkout with a single item, leaving the cart alone.
    ///
    /// # Errors
    ///
    /// [`ShopError::LoginRequired`] when anonymous, [`ShopError::Checkout`]
    /// when the quantity is invalid.
    pub fn checkout_direct(
        &mut self,
        product: &Product,
        quantity: u32,
        order_type: OrderType,
    ) -> Result<OrderSummary, ShopError> {
        self.require_user("check out")?;
        let summary = OrderSummary::direct_buy(product, quantity, order_type)?;
        self.pending_checkout = Some(summary.clone());
        Ok(summary)
    }

    /// "Buy now" from a product page under `policy`.
    ///
    /// # Errors
    ///
    /// As [`ShopSession::checkout_direct`].
    pub fn buy_now(
        &mut self,
        product: &Product,
        quantity: u32,
        order_type: OrderType,
        policy: BuyNowPolicy,
    ) -> Result<OrderSummary, ShopError> {
        self.require_user("buy this item")?;
        let summary = checkout::buy_now(&mut self.cart, product, quantity, order_type, policy)?;
        self.pending_checkout = Some(summary.clone());
        Ok(summary)
    }

    #[must_use]
    pub const fn pending_checkout(&self) -> Option<&OrderSummary> {
        self.pending_checkout.as_ref()
    }

    /// The summary the payment step should charge: the pending checkout if
    /// there is one, otherwise a fresh summary of the cart.
    ///
    /// # Errors
    ///
    /// [`ShopError::LoginRequired`] when anonymous, [`CheckoutError::EmptyCart`]
    /// when there is neither a pending checkout nor a cart.
    pub fn payable_order(&self) -> Result<OrderSummary, ShopError> {
        self.require_user("pay")?;
        match &self.pending_checkout {
            Some(summary) => Ok(summary.clone()),
            None => Ok(OrderSummary::from_cart(&self.cart)?),
        }
    }

    /// Apply a payment and remember its receipt.
    ///
    /// A completed payment drops the pending checkout and takes the paid
    /// lines out of the cart. Lines that were not part of the order stay,
    /// and an isolated direct buy leaves the cart alone.
    pub fn record_payment(&mut self, receipt: PaymentReceipt) -> CartSettlement {
        let settlement = if receipt.status.is_completed() {
            self.pending_checkout = None;
            self.settle_cart(&receipt.order)
        } else {
            CartSettlement::Untouched
        };
        self.last_receipt = Some(receipt);
        settlement
    }

    fn settle_cart(&mut self, order: &OrderSummary) -> CartSettlement {
        if !order.source.draws_from_cart() || self.cart.is_empty() {
            return CartSettlement::Untouched;
        }
        let taken: Vec<Taken> = order
            .lines
            .iter()
            .filter_map(|line| {
                self.cart
                    .take(line.product_id, line.order_type, line.quantity)
            })
            .collect();
        if taken.is_empty() {
            CartSettlement::Untouched
        } else if self.cart.is_empty() {
            CartSettlement::Cleared
        } else {
            CartSettlement::Lines(taken)
        }
    }

    #[must_use]
    pub const fn last_receipt(&self) -> Option<&PaymentReceipt> {
        self.last_receipt.as_ref()
    }

    // =========================================================================
    // Contact
    // =========================================================================

    /// Token that lets this session edit its contact messages.
    #[must_use]
    pub fn contact_edit_token(&self) -> Option<&str> {
        self.contact_edit_token.as_deref()
    }

    pub fn set_contact_edit_token(&mut self, token: String) {
        self.contact_edit_token = Some(token);
    }
}
