//! Contact form validation.

use serde::{Deserialize, Serialize};

use crate::types::{Email, EmailError, PhoneError, PhoneNumber};

/// Contact form as submitted. Every field is required.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub message: String,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ContactFormError {
    #[error("please fill in all required fields ({0} is missing)")]
    MissingField(&'static str),

    #[error("invalid email: {0}")]
    Email(#[from] EmailError),

    #[error("invalid phone number: {0}")]
    Phone(#[from] PhoneError),
}

/// A contact message ready to send, with trimmed text fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactSubmission {
    pub name: String,
    pub email: Email,
    pub phone: PhoneNumber,
    pub country: String,
    pub subject: String,
    pub message: String,
}

impl ContactForm {
    /// # Errors
    ///
    /// [`ContactFormError::MissingField`] for the first blank field, otherwise
    /// an email or phone error.
    pub fn validate(&self) -> Result<ContactSubmission, ContactFormError> {
        for (field, value) in [
            ("name", &self.name),
            ("email", &self.email),
            ("phone", &self.phone),
            ("country", &self.country),
            ("subject", &self.subject),
            ("message", &self.message),
        ] {
            if value.trim().is_empty() {
                return Err(ContactFormError::MissingField(field));
            }
        }

        Ok(ContactSubmission {
            name: self.name.trim().to_string(),
            email: Email::parse(&self.email)?,
            phone: PhoneNumber::parse(&self.phone)?,
            country: self.country.trim().to_string(),
            subject: self.subject.trim().to_string(),
            message: self.message.trim().to_string(),
        })
    }
}
