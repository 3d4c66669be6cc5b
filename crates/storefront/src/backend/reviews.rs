//! Product reviews.

use cinnamon_core::{ProductId, ReviewId};
use tracing::instrument;

use super::types::{Review, ReviewStatistics, ReviewSubmission};
use super::{BackendClient, BackendError, Service, check_status, read_json};

impl BackendClient {
    /// Approved reviews for a product.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn approved_reviews(&self, product_id: ProductId) -> Result<Vec<Review>, BackendError> {
        let url = self.url(Service::Engagement, "/api/reviews/approved");
        let response = self
            .http()
            .get(&url)
            .query(&[("productId", product_id.as_i64())])
            .send()
            .await?;
        read_json(response).await
    }

    /// Submit a review. It is published once approved.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, review), fields(product_id = %review.product_id, rating = review.rating))]
    pub async fn submit_review(&self, review: &ReviewSubmission) -> Result<(), BackendError> {
        let url = self.url(Service::Engagement, "/api/reviews");
        let response = self.http().post(&url).json(review).send().await?;
        check_status(response).await?;
        Ok(())
    }

    /// Aggregate review statistics.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn review_statistics(&self) -> Result<ReviewStatistics, BackendError> {
        let url = self.url(Service::Engagement, "/api/reviews/statistics");
        let response = self.http().get(&url).send().await?;
        read_json(response).await
    }

    /// Count a helpful vote.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn mark_review_helpful(&self, id: ReviewId) -> Result<(), BackendError> {
        let url = self.url(Service::Engagement, &format!("/api/reviews/{id}/helpful"));
        let response = self.http().post(&url).send().await?;
        check_status(response).await?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use url::Url;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::config::BackendUrls;

    #[tokio::test]
    async fn test_approved_reviews_by_product() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/reviews/approved"))
            .and(query_param("productId", "3"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([{
                "id": 11,
                "customerName": "Jane",
                "rating": 4,
                "reviewTitle": "Lovely",
                "comment": "Fresh",
                "status": "APPROVED",
                "helpfulVotes": 2
            }])))
            .mount(&server)
            .await;

        let base = Url::parse(&server.uri()).unwrap();
        let client = BackendClient::new(BackendUrls::single(&base), Duration::from_secs(60));
        let reviews = client.approved_reviews(ProductId::new(3)).await.unwrap();
        let review = reviews.first().unwrap();
        assert_eq!(review.id, ReviewId::new(11));
        assert_eq!(review.stars(), "★★★★☆");
        assert_eq!(review.helpful_votes, 2);
    }
}
