//! Authentication service.
//!
//! Checks the configured test account first, then the auth service.
//! Passwords are never stored here; the auth service owns them.

mod error;

pub use error::AuthError;

use secrecy::ExposeSecret;
use serde::Deserialize;

use cinnamon_core::{Email, PhoneNumber, User};

use crate::backend::{AuthRequest, AuthResponse, BackendClient, RemoteUser};
use crate::config::TestLogin;

/// Minimum password length.
const MIN_PASSWORD_LENGTH: usize = 6;

/// Signup form.
#[derive(Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub mobile: String,
}

impl std::fmt::Debug for SignupForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignupForm")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .field("mobile", &self.mobile)
            .finish()
    }
}

/// Authentication service.
pub struct AuthService<'a> {
    backend: &'a BackendClient,
    test_login: Option<&'a TestLogin>,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(backend: &'a BackendClient, test_login: Option<&'a TestLogin>) -> Self {
        Self {
            backend,
            test_login,
        }
    }

    /// Login with email and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail` if the email format is invalid.
    /// Returns `AuthError::Rejected` with the service's message if the
    /// credentials are wrong.
    pub async fn login(&self, email: &str, password: &str) -> Result<User, AuthError> {
        let email = Email::parse(email)?;

        if let Some(user) = self.check_test_login(&email, password) {
            tracing::info!(email = %email, "Test account login");
            return Ok(user);
        }

        let response = self
            .backend
            .authenticate(&AuthRequest {
                email: email.as_str(),
                password,
                is_signup: false,
                first_name: None,
                last_name: None,
                mobile: None,
            })
            .await?;

        accept(response, &email, None)
    }

    /// Create an account and log it in.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a bad email, phone, blank name or short
    /// password; `AuthError::Rejected` if the service refuses the signup.
    pub async fn signup(&self, form: &SignupForm) -> Result<User, AuthError> {
        let email = Email::parse(&form.email)?;
        let first_name = required(&form.first_name, "first name")?;
        let last_name = required(&form.last_name, "last name")?;
        let mobile = PhoneNumber::parse(&form.mobile)?;
        validate_password(&form.password)?;

        let response = self
            .backend
            .authenticate(&AuthRequest {
                email: email.as_str(),
                password: &form.password,
                is_signup: true,
                first_name: Some(first_name),
                last_name: Some(last_name),
                mobile: Some(mobile.as_str()),
            })
            .await?;

        let submitted = User {
            email: email.clone(),
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            mobile: mobile.to_string(),
        };
        accept(response, &email, Some(submitted))
    }

    fn check_test_login(&self, email: &Email, password: &str) -> Option<User> {
        let test = self.test_login?;
        let matches = test.email.trim().eq_ignore_ascii_case(email.as_str())
            && test.password.expose_secret() == password;
        matches.then(|| User {
            email: email.clone(),
            first_name: test.first_name.clone(),
            last_name: test.last_name.clone(),
            mobile: test.mobile.clone(),
        })
    }
}

/// Turn an auth response into a user.
///
/// Prefers the profile the service returned; falls back to `fallback`, then
/// to a bare user with just the email.
fn accept(response: AuthResponse, email: &Email, fallback: Option<User>) -> Result<User, AuthError> {
    if !response.success {
        return Err(AuthError::Rejected(
            response
                .message
                .unwrap_or_else(|| "Invalid credentials".to_string()),
        ));
    }

    Ok(match response.user {
        Some(remote) => user_from_remote(remote, email),
        None => fallback.unwrap_or_else(|| User {
            email: email.clone(),
            first_name: String::new(),
            last_name: String::new(),
            mobile: String::new(),
        }),
    })
}

fn user_from_remote(remote: RemoteUser, requested: &Email) -> User {
    let email = Email::parse(&remote.email).unwrap_or_else(|_| requested.clone());
    User {
        email,
        first_name: remote.first_name.unwrap_or_default(),
        last_name: remote.last_name.unwrap_or_default(),
        mobile: remote.mobile.unwrap_or_default(),
    }
}

fn required<'f>(value: &'f str, field: &'static str) -> Result<&'f str, AuthError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(AuthError::MissingField(field));
    }
    Ok(value)
}

/// Validate password meets requirements.
fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    Ok(())
}
