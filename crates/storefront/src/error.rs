//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures errors to Sentry before
//! responding to the client. All route handlers should return `Result<T, AppError>`.
//!
//! Every error answers with a JSON body `{"error": "..."}`. A login prompt
//! additionally carries `"login_required": true`.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use cinnamon_core::{
    CartError, CheckoutError, ContactFormError, PaymentFormError, ReviewFormError, ShopError,
};
use thiserror::Error;

use crate::backend::BackendError;
use crate::services::auth::AuthError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Backend service call failed.
    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),

    /// Authentication operation failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Session gate, cart or checkout rule.
    #[error(transparent)]
    Shop(#[from] ShopError),

    #[error(transparent)]
    PaymentForm(#[from] PaymentFormError),

    #[error(transparent)]
    ContactForm(#[from] ContactFormError),

    #[error(transparent)]
    ReviewForm(#[from] ReviewFormError),

    /// The payment service did not complete the charge.
    #[error("Payment failed: {0}")]
    Declined(String),

    /// Session store failure.
    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<CartError> for AppError {
    fn from(err: CartError) -> Self {
        Self::Shop(ShopError::Cart(err))
    }
}

impl From<CheckoutError> for AppError {
    fn from(err: CheckoutError) -> Self {
        Self::Shop(ShopError::Checkout(err))
    }
}

impl AppError {
    /// Whether the error is ours or a backend's rather than the client's.
    const fn is_server_error(&self) -> bool {
        match self {
            Self::Session(_) | Self::Internal(_) => true,
            Self::Backend(err) | Self::Auth(AuthError::Backend(err)) => err.is_unavailable(),
            _ => false,
        }
    }

    /// HTTP status for this error.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Session(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Backend(err) | Self::Auth(AuthError::Backend(err)) => backend_status(err),
            Self::Auth(AuthError::Rejected(_)) => StatusCode::UNAUTHORIZED,
            Self::Auth(_)
            | Self::PaymentForm(_)
            | Self::ContactForm(_)
            | Self::ReviewForm(_)
            | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Shop(err) => shop_status(err),
            Self::Declined(_) => StatusCode::PAYMENT_REQUIRED,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
        }
    }

    /// Message safe to show the client.
    #[must_use]
    pub fn client_message(&self) -> String {
        // Don't expose internal error details to clients
        if self.is_server_error() {
            return match self {
                Self::Session(_) | Self::Internal(_) => "Internal server error".to_string(),
                _ => "External service error".to_string(),
            };
        }

        match self {
            Self::Backend(BackendError::Api { message, .. })
            | Self::Auth(AuthError::Rejected(message))
            | Self::Declined(message)
            | Self::NotFound(message)
            | Self::BadRequest(message) => message.clone(),
            Self::Backend(BackendError::NotFound(what)) => what.clone(),
            Self::Auth(AuthError::InvalidEmail(_)) => "Invalid email address".to_string(),
            Self::Auth(err) => err.to_string(),
            Self::Shop(err) => err.to_string(),
            Self::PaymentForm(err) => err.to_string(),
            Self::ContactForm(err) => err.to_string(),
            Self::ReviewForm(err) => err.to_string(),
            _ => self.to_string(),
        }
    }

    const fn is_login_required(&self) -> bool {
        matches!(self, Self::Shop(ShopError::LoginRequired { .. }))
    }
}

fn backend_status(err: &BackendError) -> StatusCode {
    match err {
        BackendError::NotFound(_) => StatusCode::NOT_FOUND,
        BackendError::Api { status, .. } if *status < 500 => StatusCode::UNPROCESSABLE_ENTITY,
        _ => StatusCode::BAD_GATEWAY,
    }
}

const fn shop_status(err: &ShopError) -> StatusCode {
    match err {
        ShopError::LoginRequired { .. } => StatusCode::UNAUTHORIZED,
        ShopError::Cart(CartError::LineNotFound { .. })
        | ShopError::Checkout(CheckoutError::Cart(CartError::LineNotFound { .. })) => {
            StatusCode::NOT_FOUND
        }
        ShopError::Cart(_) | ShopError::Checkout(_) => StatusCode::BAD_REQUEST,
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture server errors to Sentry
        if self.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        } else {
            tracing::debug!(error = %self, "Request rejected");
        }

        let status = self.status();
        let mut body = serde_json::json!({ "error": self.client_message() });
        if self.is_login_required() {
            body["login_required"] = serde_json::Value::Bool(true);
        }

        (status, Json(body)).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context.
///
/// Call this after successful authentication to associate errors with users.
pub fn set_sentry_user(email: &str, name: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(email.to_string()),
            email: Some(email.to_string()),
            username: name.map(String::from),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
///
/// Call this on logout to stop associating errors with the user.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

/// Add a breadcrumb for user actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of user actions
/// leading up to an error.
///
/// # Example
///
/// ```rust,ignore
/// add_breadcrumb("cart", "Added to cart", Some(&[("product_id", "3")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use cinnamon_core::{OrderType, ProductId};
    use http_body_util::BodyExt;

    use super::*;

    async fn body_json(err: AppError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("product 123".to_string());
        assert_eq!(err.to_string(), "Not found: product 123");

        let err = AppError::BadRequest("invalid input".to_string());
        assert_eq!(err.to_string(), "Bad request: invalid input");
    }

    #[test]
    fn test_app_error_status_codes() {
        fn get_status(err: AppError) -> StatusCode {
            err.into_response().status()
        }

        assert_eq!(
            get_status(AppError::NotFound("test".to_string())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::BadRequest("test".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::Declined("card declined".to_string())),
            StatusCode::PAYMENT_REQUIRED
        );
        assert_eq!(
            get_status(AppError::Internal("test".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            get_status(AppError::from(CartError::BelowMinimum {
                order_type: OrderType::Bulk,
                minimum: 10,
                requested: 5
            })),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::from(CartError::LineNotFound {
                product_id: ProductId::new(1),
                order_type: OrderType::Single
            })),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::Auth(AuthError::Rejected("nope".to_string()))),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            get_status(AppError::Backend(BackendError::Api {
                status: 503,
                message: "down".to_string()
            })),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            get_status(AppError::Backend(BackendError::Api {
                status: 400,
                message: "bad review".to_string()
            })),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }

    #[tokio::test]
    async fn test_login_required_body() {
        let (status, body) = body_json(AppError::Shop(ShopError::LoginRequired {
            action: "add items to your cart",
        }))
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["login_required"], true);
        assert_eq!(body["error"], "please log in to add items to your cart");
    }

    #[tokio::test]
    async fn test_backend_outage_hides_details() {
        let (status, body) = body_json(AppError::Backend(BackendError::Api {
            status: 500,
            message: "NullPointerException at line 42".to_string(),
        }))
        .await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["error"], "External service error");
        assert!(body.get("login_required").is_none());
    }

    #[tokio::test]
    async fn test_validation_message_is_inline() {
        let (status, body) = body_json(AppError::PaymentForm(PaymentFormError::Cvv)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "please enter a valid CVV");
    }
}
