//! Session-related types.
//!
//! The whole shopping session is stored as one [`ShopSession`] value so that
//! the auth gate, cart and pending checkout always change together.

/// Session keys.
pub mod keys {
    /// Key for the serialized [`cinnamon_core::ShopSession`].
    pub const SHOP: &str = "shop";
}
