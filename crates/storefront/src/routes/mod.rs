//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                     - Health check
//!
//! # Auth
//! POST   /auth/login                 - Login (test account or auth service)
//! POST   /auth/signup                - Create account and log in
//! POST   /auth/logout                - Logout (clears cart and checkout)
//! GET    /auth/me                    - Current user or login prompt
//!
//! # Products
//! GET    /products                   - Product listing (?category=)
//! GET    /products/{id}              - Product detail
//! POST   /products/{id}/buy-now      - Buy now (per configured policy)
//! GET    /products/{id}/reviews      - Approved reviews
//! POST   /products/{id}/reviews      - Submit review (requires auth)
//! GET    /reviews/statistics         - Rating statistics
//! POST   /reviews/{id}/helpful       - Helpful vote
//!
//! # Cart (requires auth to change)
//! GET    /cart                       - Cart with totals
//! POST   /cart/items                 - Add item
//! PUT    /cart/items                 - Update quantity
//! DELETE /cart/items                 - Remove item
//! DELETE /cart                       - Clear
//! GET    /cart/count                 - Badge count
//! GET    /api/cart/sync              - Last cart mirror failure
//! POST   /api/cart/sync              - Rewrite the saved cart from the session
//!
//! # Checkout & payment (requires auth)
//! POST   /checkout                   - Enter checkout (cart or direct buy)
//! GET    /checkout                   - Pending order summary
//! POST   /payment                    - Pay for the pending order
//! GET    /payment/success            - Last receipt
//!
//! # Account (requires auth)
//! GET    /account                    - Profile, cart and orders
//!
//! # Contact
//! POST   /contact                    - Send message
//! GET    /contact/submissions        - This session's messages
//! PUT    /contact/{id}               - Edit message
//! DELETE /contact/{id}               - Delete message
//! ```

pub mod account;
pub mod auth;
pub mod cart;
pub mod checkout;
pub mod contact;
pub mod payment;
pub mod products;
pub mod reviews;

use axum::{
    Router,
    body::Body,
    http::Request,
    middleware as axum_middleware,
    routing::{get, post, put},
};
use tower_http::trace::TraceLayer;

use crate::middleware::{create_session_layer, request_id_middleware};
use crate::state::AppState;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", post(auth::login))
        .route("/signup", post(auth::signup))
        .route("/logout", post(auth::logout))
        .route("/me", get(auth::me))
}

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index))
        .route("/{id}", get(products::show))
        .route("/{id}/buy-now", post(products::buy_now))
        .route(
            "/{id}/reviews",
            get(reviews::for_product).post(reviews::submit),
        )
}

/// Create the review routes router.
pub fn review_routes() -> Router<AppState> {
    Router::new()
        .route("/statistics", get(reviews::statistics))
        .route("/{id}/helpful", post(reviews::helpful))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show).delete(cart::clear))
        .route(
            "/items",
            post(cart::add).put(cart::update).delete(cart::remove),
        )
        .route("/count", get(cart::count))
}

/// Create the contact routes router.
pub fn contact_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(contact::submit))
        .route("/submissions", get(contact::submissions))
        .route("/{id}", put(contact::edit).delete(contact::delete))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        // Auth routes
        .nest("/auth", auth_routes())
        // Product and review routes
        .nest("/products", product_routes())
        .nest("/reviews", review_routes())
        // Cart routes
        .nest("/cart", cart_routes())
        .route("/api/cart/sync", get(cart::sync_status).post(cart::resync))
        // Checkout and payment
        .route("/checkout", get(checkout::pending).post(checkout::start))
        .route("/payment", post(payment::pay))
        .route("/payment/success", get(payment::success))
        // Account
        .route("/account", get(account::index))
        // Contact
        .nest("/contact", contact_routes())
}

/// The full application: routes, sessions, request ids and tracing.
///
/// Sentry layers are added by the binary on top of this.
pub fn app(state: AppState) -> Router {
    let session_layer = create_session_layer(state.config());

    routes()
        .layer(session_layer)
        .layer(axum_middleware::from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                tracing::info_span!(
                    "request",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id = tracing::field::Empty,
                )
            }),
        )
        .with_state(state)
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check the backends.
async fn health() -> &'static str {
    "ok"
}
