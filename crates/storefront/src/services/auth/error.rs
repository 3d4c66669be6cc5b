//! Authentication error types.

use thiserror::Error;

use crate::backend::BackendError;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Invalid email format.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] cinnamon_core::EmailError),

    /// Invalid phone number.
    #[error("invalid mobile number: {0}")]
    InvalidPhone(#[from] cinnamon_core::PhoneError),

    /// A required signup field is blank.
    #[error("{0} is required")]
    MissingField(&'static str),

    /// Password too weak or invalid.
    #[error("password validation failed: {0}")]
    WeakPassword(String),

    /// The auth service turned the request down.
    #[error("{0}")]
    Rejected(String),

    /// The auth service could not be reached or failed.
    #[error("auth service error: {0}")]
    Backend(#[from] BackendError),
}
