//! Response models for the storefront API.
//!
//! Thin views over the core types: prices are rendered for display next to
//! their raw amounts, and the cart carries its derived totals.

pub mod cart;
pub mod session;

pub use cart::{CartLineView, CartView, SessionView};
pub use session::keys as session_keys;
