//! Authentication route handlers.
//!
//! Login and signup go through [`AuthService`](crate::services::AuthService).
//! A successful login pulls the user's saved cart and restores it when the
//! session cart is empty.

use axum::{Json, extract::State, http::StatusCode};
use serde::Deserialize;
use tracing::instrument;

use cinnamon_core::User;

use crate::error::{AppError, add_breadcrumb, clear_sentry_user, set_sentry_user};
use crate::middleware::Shop;
use crate::models::SessionView;
use crate::services::{SignupForm, cart_mirror};
use crate::state::AppState;

/// Login form data.
#[derive(Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for LoginForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginForm")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Log in with email and password.
#[instrument(skip(state, shop, form), fields(email = %form.email))]
pub async fn login(
    State(state): State<AppState>,
    mut shop: Shop,
    Json(form): Json<LoginForm>,
) -> Result<Json<SessionView>, AppError> {
    let user = state.auth().login(&form.email, &form.password).await?;
    let restored = start_session(&state, &mut shop, user).await?;
    Ok(Json(SessionView::of(&shop).with_cart_restored(restored)))
}

/// Create an account and log it in.
#[instrument(skip(state, shop, form), fields(email = %form.email))]
pub async fn signup(
    State(state): State<AppState>,
    mut shop: Shop,
    Json(form): Json<SignupForm>,
) -> Result<(StatusCode, Json<SessionView>), AppError> {
    let user = state.auth().signup(&form).await?;
    tracing::info!(email = %user.email, "Account created");
    let restored = start_session(&state, &mut shop, user).await?;
    Ok((
        StatusCode::CREATED,
        Json(SessionView::of(&shop).with_cart_restored(restored)),
    ))
}

/// Log out. The saved cart on the commerce service is left alone.
#[instrument(skip(shop))]
pub async fn logout(mut shop: Shop) -> Result<StatusCode, AppError> {
    if let Some(user) = shop.logout() {
        tracing::info!(email = %user.email, "User logged out");
        add_breadcrumb("auth", "Logged out", None);
    }
    shop.flush().await?;
    clear_sentry_user();
    Ok(StatusCode::NO_CONTENT)
}

/// The logged-in user, or a login prompt.
#[instrument(skip(shop))]
pub async fn me(shop: Shop) -> Result<Json<SessionView>, AppError> {
    shop.require_user("view your profile")?;
    Ok(Json(SessionView::of(&shop)))
}

/// Log `user` in and restore their saved cart. Returns whether the cart was
/// restored.
async fn start_session(state: &AppState, shop: &mut Shop, user: User) -> Result<bool, AppError> {
    set_sentry_user(user.email.as_str(), Some(&user.display_name()));
    add_breadcrumb("auth", "Logged in", Some(&[("email", user.email.as_str())]));

    let email = user.email.clone();
    shop.login(user);

    // Best effort: a missing saved cart never blocks the login
    let restored = match cart_mirror::pull(state.backend(), &email).await {
        Ok(lines) => shop.hydrate_cart(lines),
        Err(e) => {
            tracing::warn!(email = %email, error = %e, "Could not load saved cart");
            false
        }
    };
    if restored {
        tracing::info!(email = %email, items = shop.cart().count(), "Restored saved cart");
    }

    shop.save_with_new_id().await?;
    Ok(restored)
}
