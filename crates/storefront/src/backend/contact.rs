//! Contact messages. Edits and deletes are authorized by the edit token the
//! service hands out with the first message.

use cinnamon_core::{ContactMessageId, ContactSubmission};
use tracing::instrument;

use super::types::{ContactEdit, ContactMessage, ContactReceipt};
use super::{BackendClient, BackendError, Service, check_status, read_json};

impl BackendClient {
    /// Send a new contact message.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, submission), fields(subject = %submission.subject))]
    pub async fn submit_contact(
        &self,
        submission: &ContactSubmission,
    ) -> Result<ContactReceipt, BackendError> {
        let url = self.url(Service::Engagement, "/api/contact");
        let response = self.http().post(&url).json(submission).send().await?;
        let response = check_status(response).await?;
        let text = response.text().await?;
        if text.trim().is_empty() {
            return Ok(ContactReceipt::default());
        }
        serde_json::from_str(&text).map_err(|e| BackendError::Parse(e.to_string()))
    }

    /// Messages sent under `token`.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip_all)]
    pub async fn contact_submissions(
        &self,
        token: &str,
    ) -> Result<Vec<ContactMessage>, BackendError> {
        let url = self.url(Service::Engagement, "/api/contact/submissions");
        let response = self
            .http()
            .get(&url)
            .query(&[("token", token)])
            .send()
            .await?;
        read_json(response).await
    }

    /// Replace a message's fields.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, submission, token))]
    pub async fn edit_contact(
        &self,
        id: ContactMessageId,
        submission: &ContactSubmission,
        token: &str,
    ) -> Result<(), BackendError> {
        let url = self.url(Service::Engagement, &format!("/api/contact/{id}/edit"));
        let body = ContactEdit {
            submission,
            edit_token: token,
        };
        let response = self.http().put(&url).json(&body).send().await?;
        check_status(response).await?;
        Ok(())
    }

    /// Delete a message.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, token))]
    pub async fn delete_contact(
        &self,
        id: ContactMessageId,
        token: &str,
    ) -> Result<(), BackendError> {
        let url = self.url(
            Service::Engagement,
            &format!("/api/contact/submissions/{id}"),
        );
        let response = self
            .http()
            .delete(&url)
            .query(&[("token", token)])
            .send()
            .await?;
        check_status(response).await?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use cinnamon_core::ContactForm;
    use url::Url;
    use wiremock::matchers::{body_partial_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::config::BackendUrls;

    fn client(server: &MockServer) -> BackendClient {
        let base = Url::parse(&server.uri()).unwrap();
        BackendClient::new(BackendUrls::single(&base), Duration::from_secs(60))
    }

    fn submission() -> ContactSubmission {
        ContactForm {
            name: "Jane Doe".to_string(),
            email: "jane@example.com".to_string(),
            phone: "+94777369330".to_string(),
            country: "Sri Lanka".to_string(),
            subject: "Wholesale".to_string(),
            message: "Price list please".to_string(),
        }
        .validate()
        .unwrap()
    }

    #[tokio::test]
    async fn test_submit_returns_edit_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/contact"))
            .and(body_partial_json(serde_json::json!({"subject": "Wholesale"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "message": "Thanks, we will be in touch",
                "editToken": "tok-123"
            })))
            .mount(&server)
            .await;

        let receipt = client(&server).submit_contact(&submission()).await.unwrap();
        assert_eq!(receipt.edit_token.as_deref(), Some("tok-123"));
    }

    #[tokio::test]
    async fn test_edit_sends_token_with_fields() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/api/contact/5/edit"))
            .and(body_partial_json(serde_json::json!({
                "editToken": "tok-123",
                "email": "jane@example.com"
            })))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        client(&server)
            .edit_contact(ContactMessageId::new(5), &submission(), "tok-123")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_list_and_delete_pass_token_as_query() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/contact/submissions"))
            .and(query_param("token", "tok-123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"id": 5, "name": "Jane Doe", "subject": "Wholesale", "status": "READ"}
            ])))
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/api/contact/submissions/5"))
            .and(query_param("token", "tok-123"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let client = client(&server);
        let messages = client.contact_submissions("tok-123").await.unwrap();
        assert_eq!(messages.len(), 1);
        client
            .delete_contact(ContactMessageId::new(5), "tok-123")
            .await
            .unwrap();
    }
}
