//! Auth service: credential check and signup share one endpoint.

use tracing::instrument;

use super::types::{AuthRequest, AuthResponse};
use super::{BackendClient, BackendError, Service, error_message};

impl BackendClient {
    /// Check credentials, or create an account when `request.is_signup`.
    ///
    /// A rejection comes back as `Ok` with `success: false`, whether the
    /// service answered 200 or a 4xx carrying the same body.
    ///
    /// # Errors
    ///
    /// Returns an error if the service is unreachable, fails, or answers
    /// with something that is not an auth response.
    #[instrument(skip(self, request), fields(email = %request.email, signup = request.is_signup))]
    pub async fn authenticate(
        &self,
        request: &AuthRequest<'_>,
    ) -> Result<AuthResponse, BackendError> {
        let url = self.url(Service::Auth, "/api/auth/authenticateuser");
        let response = self.http().post(&url).json(request).send().await?;

        let status = response.status();
        let text = response.text().await?;

        if status.is_success() || status.is_client_error() {
            if let Ok(parsed) = serde_json::from_str::<AuthResponse>(&text) {
                return Ok(parsed);
            }
            if status.is_client_error() {
                return Ok(AuthResponse {
                    success: false,
                    message: Some(error_message(&text, "Invalid credentials")),
                    user: None,
                });
            }
            return Err(BackendError::Parse(format!(
                "unexpected auth response: {}",
                text.chars().take(200).collect::<String>()
            )));
        }

        tracing::warn!(status = %status, "Auth service returned non-success status");
        Err(BackendError::Api {
            status: status.as_u16(),
            message: error_message(&text, "auth service error"),
        })
    }
}
