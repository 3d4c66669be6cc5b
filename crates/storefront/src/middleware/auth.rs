//! Session-backed extractors.
//!
//! [`Shop`] loads the [`ShopSession`] for the request and writes it back with
//! [`Shop::save`]. [`RequireAuth`] and [`OptionalAuth`] only read the user.

use std::ops::{Deref, DerefMut};

use axum::{extract::FromRequestParts, http::request::Parts};
use tower_sessions::Session;

use cinnamon_core::{ShopError, ShopSession, User};

use crate::error::AppError;
use crate::models::session_keys;

/// The shopping session for this request.
///
/// Derefs to [`ShopSession`]. Changes are kept in memory until
/// [`Shop::save`] is called, so a handler that fails half way leaves the
/// stored session untouched.
///
/// # Example
///
/// ```rust,ignore
/// async fn clear(mut shop: Shop) -> Result<StatusCode, AppError> {
///     shop.clear_cart()?;
///     shop.save().await?;
///     Ok(StatusCode::NO_CONTENT)
/// }
/// ```
pub struct Shop {
    session: Session,
    state: ShopSession,
}

impl Shop {
    /// Persist the current state.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store rejects the write.
    pub async fn save(&self) -> Result<(), AppError> {
        self.session.insert(session_keys::SHOP, &self.state).await?;
        Ok(())
    }

    /// Persist the state under a fresh session id.
    ///
    /// Used when the logged-in identity changes.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store rejects the write.
    pub async fn save_with_new_id(&self) -> Result<(), AppError> {
        self.session.cycle_id().await?;
        self.save().await
    }

    /// Drop the stored session entirely and reset to anonymous.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store rejects the delete.
    pub async fn flush(&mut self) -> Result<(), AppError> {
        self.session.flush().await?;
        self.state = ShopSession::new();
        Ok(())
    }
}

impl Deref for Shop {
    type Target = ShopSession;

    fn deref(&self) -> &Self::Target {
        &self.state
    }
}

impl DerefMut for Shop {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.state
    }
}

impl<S> FromRequestParts<S> for Shop
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Set by SessionManagerLayer
        let session = parts
            .extensions
            .get::<Session>()
            .cloned()
            .ok_or_else(|| AppError::Internal("session layer missing".to_string()))?;

        let state = session
            .get::<ShopSession>(session_keys::SHOP)
            .await?
            .unwrap_or_default();

        Ok(Self { session, state })
    }
}

/// Extractor that requires a logged-in user.
///
/// Rejects with a 401 login prompt when the session is anonymous.
pub struct RequireAuth(pub User);

impl<S> FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let shop = Shop::from_request_parts(parts, state).await?;
        let user = shop.user().cloned().ok_or(ShopError::LoginRequired {
            action: "view this page",
        })?;
        Ok(Self(user))
    }
}

/// Extractor that optionally gets the current user.
///
/// A missing or unreadable session counts as anonymous.
pub struct OptionalAuth(pub Option<User>);

impl<S> FromRequestParts<S> for OptionalAuth
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = match parts.extensions.get::<Session>() {
            Some(session) => session
                .get::<ShopSession>(session_keys::SHOP)
                .await
                .ok()
                .flatten()
                .and_then(|shop| shop.user().cloned()),
            None => None,
        };

        Ok(Self(user))
    }
}
