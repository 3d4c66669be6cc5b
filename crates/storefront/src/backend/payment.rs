//! Payment processing and payment history.

use tracing::instrument;

use super::types::{PaymentRecord, PaymentRequest, PaymentResponse};
use super::{BackendClient, BackendError, Service, error_message, read_json};

impl BackendClient {
    /// Submit a charge.
    ///
    /// Declines come back as `Ok` with a non-completed status. A 4xx whose
    /// body is not a payment response is reported as a failed payment
    /// carrying the service's message.
    ///
    /// # Errors
    ///
    /// Returns an error if the service is unreachable or fails.
    #[instrument(skip(self, request), fields(amount = %request.amount, email = %request.customer_email))]
    pub async fn process_payment(
        &self,
        request: &PaymentRequest,
    ) -> Result<PaymentResponse, BackendError> {
        let url = self.url(Service::Commerce, "/api/payment/process");
        let response = self.http().post(&url).json(request).send().await?;

        let status = response.status();
        if status.is_server_error() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(status = %status, "Payment service returned server error");
            return Err(BackendError::Api {
                status: status.as_u16(),
                message: error_message(&body, "payment service error"),
            });
        }

        let text = response.text().await?;
        match serde_json::from_str::<PaymentResponse>(&text) {
            Ok(parsed) => Ok(parsed),
            Err(_) if status.is_client_error() => Ok(PaymentResponse {
                status: cinnamon_core::PaymentStatus::Failed,
                payment_id: None,
                amount: None,
                error_message: Some(error_message(&text, "Payment failed")),
                message: None,
            }),
            Err(e) => Err(BackendError::Parse(e.to_string())),
        }
    }

    /// Every payment the service knows about.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn list_payments(&self) -> Result<Vec<PaymentRecord>, BackendError> {
        let url = self.url(Service::Commerce, "/api/payment/all");
        let response = self.http().get(&url).send().await?;
        read_json(response).await
    }
}
