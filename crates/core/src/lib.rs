//! Cinnamon Core - cart, pricing and checkout domain library.
//!
//! This crate holds the storefront's session state machine:
//! - [`pricing`] - the single bulk discount rule every view reuses
//! - [`cart`] - the line-item store keyed by product and order type
//! - [`checkout`] - cart or direct-buy handoff into an order summary
//! - [`session`] - the auth gate wrapping the cart for one browser session
//! - [`payment`], [`contact`], [`review`] - form validation for the outbound calls
//!
//! # Architecture
//!
//! The core crate contains only types and pure logic - no I/O, no HTTP
//! clients, no clocks it does not take as arguments (except the `Utc::now`
//! convenience wrappers). The storefront crate owns everything remote.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod checkout;
pub mod contact;
pub mod payment;
pub mod pricing;
pub mod product;
pub mod review;
pub mod session;
pub mod types;

pub use cart::{CartError, CartStore, LineItem, LineKey, Taken};
pub use checkout::{BuyNowPolicy, CheckoutError, CheckoutSource, OrderSummary, PricedLine};
pub use contact::{ContactForm, ContactFormError, ContactSubmission};
pub use payment::{BillingAddress, CardBrand, PaymentForm, PaymentFormError, PaymentReceipt, ValidatedCard};
pub use pricing::OrderType;
pub use product::Product;
pub use review::{ReviewForm, ReviewFormError};
pub use session::{AuthState, CartSettlement, ShopError, ShopSession, User};
pub use types::*;
