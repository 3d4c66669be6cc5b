//! Review route handlers.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use tracing::instrument;

use cinnamon_core::{ProductId, ReviewForm, ReviewId};

use crate::backend::{Review, ReviewStatistics, ReviewSubmission};
use crate::error::{AppError, add_breadcrumb};
use crate::middleware::RequireAuth;
use crate::state::AppState;

/// Approved reviews for a product.
#[instrument(skip(state))]
pub async fn for_product(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<Json<Vec<Review>>, AppError> {
    Ok(Json(state.backend().approved_reviews(id).await?))
}

/// Submit a review. It shows up once a moderator approves it.
#[instrument(skip(state, user, form), fields(email = %user.email))]
pub async fn submit(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<ProductId>,
    Json(form): Json<ReviewForm>,
) -> Result<StatusCode, AppError> {
    let form = form.validate()?;
    let product = state.backend().get_product(id).await?;

    let submission = ReviewSubmission {
        customer_name: user.display_name(),
        email: user.email.as_str().to_string(),
        rating: form.rating,
        review_title: form.title,
        comment: form.comment,
        product_id: product.id,
        product_name: product.name,
        product_type: product.category,
        verified_purchase: false,
    };
    state.backend().submit_review(&submission).await?;

    add_breadcrumb(
        "review",
        "Submitted review",
        Some(&[("product_id", &id.to_string())]),
    );
    Ok(StatusCode::ACCEPTED)
}

/// Aggregate rating numbers.
#[instrument(skip(state))]
pub async fn statistics(State(state): State<AppState>) -> Result<Json<ReviewStatistics>, AppError> {
    Ok(Json(state.backend().review_statistics().await?))
}

/// Count a helpful vote.
#[instrument(skip(state))]
pub async fn helpful(
    State(state): State<AppState>,
    Path(id): Path<ReviewId>,
) -> Result<StatusCode, AppError> {
    state.backend().mark_review_helpful(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
