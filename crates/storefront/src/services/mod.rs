//! Business logic services for storefront.
//!
//! # Services
//!
//! - `auth` - login and signup against the test account and the auth service
//! - `cart_mirror` - background copy of session carts to the commerce service

pub mod auth;
pub mod cart_mirror;

pub use auth::{AuthError, AuthService, SignupForm};
pub use cart_mirror::{CartMirror, MirrorOp, SyncFailure};
