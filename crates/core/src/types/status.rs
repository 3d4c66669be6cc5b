//! Status enums reported by the backend services.

use serde::{Deserialize, Serialize};

/// Outcome of a payment attempt.
///
/// Only [`PaymentStatus::Completed`] counts as a placed order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    Completed,
    #[default]
    Pending,
    Failed,
    Cancelled,
}

impl PaymentStatus {
    /// Whether the payment went through.
    #[must_use]
    pub const fn is_completed(self) -> bool {
        matches!(self, Self::Completed)
    }
}

/// Moderation state of a product review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReviewStatus {
    #[default]
    Submitted,
    UnderReview,
    Approved,
    Rejected,
}

impl ReviewStatus {
    /// Human-readable label. A freshly submitted review reads as "Pending".
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Submitted => "Pending",
            Self::UnderReview => "Under Review",
            Self::Approved => "Approved",
            Self::Rejected => "Rejected",
        }
    }
}

/// Handling state of a contact message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ContactStatus {
    #[default]
    Pending,
    Read,
    Responded,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_payment_status_wire_format() {
        let status: PaymentStatus = serde_json::from_str("\"COMPLETED\"").unwrap();
        assert!(status.is_completed());
        assert!(!PaymentStatus::Failed.is_completed());
    }

    #[test]
    fn test_review_status_display() {
        let status: ReviewStatus = serde_json::from_str("\"UNDER_REVIEW\"").unwrap();
        assert_eq!(status.display_name(), "Under Review");
        assert_eq!(ReviewStatus::Submitted.display_name(), "Pending");
    }
}
