//! Contact route handlers.
//!
//! Sending a message does not need a login. The edit token handed back by
//! the engagement service is kept in the session and authorizes listing,
//! editing and deleting that session's messages.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Serialize;
use tracing::instrument;

use cinnamon_core::{ContactForm, ContactMessageId};

use crate::backend::ContactMessage;
use crate::error::{AppError, add_breadcrumb};
use crate::middleware::Shop;
use crate::state::AppState;

/// Reply to a new message.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactResponse {
    pub message: String,
    pub id: Option<ContactMessageId>,
    /// Whether this session can edit its messages.
    pub editable: bool,
}

/// Send a contact message.
#[instrument(skip(state, shop, form), fields(subject = %form.subject))]
pub async fn submit(
    State(state): State<AppState>,
    mut shop: Shop,
    Json(form): Json<ContactForm>,
) -> Result<(StatusCode, Json<ContactResponse>), AppError> {
    let submission = form.validate()?;
    let receipt = state.backend().submit_contact(&submission).await?;

    if let Some(token) = receipt.edit_token {
        shop.set_contact_edit_token(token);
        shop.save().await?;
    }
    add_breadcrumb("contact", "Sent contact message", None);

    Ok((
        StatusCode::CREATED,
        Json(ContactResponse {
            message: receipt
                .message
                .unwrap_or_else(|| "Thank you, we will be in touch soon".to_string()),
            id: receipt.id,
            editable: shop.contact_edit_token().is_some(),
        }),
    ))
}

/// Messages sent from this session.
#[instrument(skip(state, shop))]
pub async fn submissions(
    State(state): State<AppState>,
    shop: Shop,
) -> Result<Json<Vec<ContactMessage>>, AppError> {
    let Some(token) = shop.contact_edit_token() else {
        return Ok(Json(Vec::new()));
    };
    Ok(Json(state.backend().contact_submissions(token).await?))
}

/// Edit one of this session's messages.
#[instrument(skip(state, shop, form))]
pub async fn edit(
    State(state): State<AppState>,
    shop: Shop,
    Path(id): Path<ContactMessageId>,
    Json(form): Json<ContactForm>,
) -> Result<StatusCode, AppError> {
    let token = edit_token(&shop)?;
    let submission = form.validate()?;
    state.backend().edit_contact(id, &submission, token).await?;
    add_breadcrumb("contact", "Edited contact message", None);
    Ok(StatusCode::NO_CONTENT)
}

/// Delete one of this session's messages.
#[instrument(skip(state, shop))]
pub async fn delete(
    State(state): State<AppState>,
    shop: Shop,
    Path(id): Path<ContactMessageId>,
) -> Result<StatusCode, AppError> {
    let token = edit_token(&shop)?;
    state.backend().delete_contact(id, token).await?;
    add_breadcrumb("contact", "Deleted contact message", None);
    Ok(StatusCode::NO_CONTENT)
}

fn edit_token(shop: &Shop) -> Result<&str, AppError> {
    shop.contact_edit_token()
        .ok_or_else(|| AppError::NotFound("no contact messages for this session".to_string()))
}
