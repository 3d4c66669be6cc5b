//! Product review form and rating display.

use serde::{Deserialize, Serialize};

/// Highest star rating.
pub const MAX_RATING: u8 = 5;

/// Review form as submitted by a shopper.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewForm {
    pub rating: u8,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub comment: String,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ReviewFormError {
    #[error("rating must be between 1 and {MAX_RATING} (got {0})")]
    Rating(u8),

    #[error("please enter a review title")]
    MissingTitle,

    #[error("please enter a review comment")]
    MissingComment,
}

impl ReviewForm {
    /// Returns the form with its text trimmed.
    ///
    /// # Errors
    ///
    /// Returns a [`ReviewFormError`] for an out-of-range rating or blank text.
    pub fn validate(&self) -> Result<Self, ReviewFormError> {
        if !(1..=MAX_RATING).contains(&self.rating) {
            return Err(ReviewFormError::Rating(self.rating));
        }
        let title = self.title.trim();
        if title.is_empty() {
            return Err(ReviewFormError::MissingTitle);
        }
        let comment = self.comment.trim();
        if comment.is_empty() {
            return Err(ReviewFormError::MissingComment);
        }
        Ok(Self {
            rating: self.rating,
            title: title.to_string(),
            comment: comment.to_string(),
        })
    }
}

/// Render a rating as five stars: filled for each whole point, hollow for the rest.
///
/// Ratings are clamped to `0..=5`; fractions round down.
#[must_use]
pub fn star_rating(rating: f64) -> String {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let filled = if rating.is_nan() {
        0
    } else {
        rating.clamp(0.0, f64::from(MAX_RATING)).floor() as usize
    };
    let empty = usize::from(MAX_RATING) - filled;
    format!("{}{}", "★".repeat(filled), "☆".repeat(empty))
}
