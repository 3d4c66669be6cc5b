//! Phone number type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`PhoneNumber`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PhoneError {
    /// Nothing left after stripping separators.
    #[error("phone number cannot be empty")]
    Empty,
    /// A character other than a digit (or a leading `+`) was found.
    #[error("phone number may only contain digits and an optional leading +")]
    InvalidCharacter,
    /// The first digit is zero.
    #[error("phone number cannot start with 0")]
    LeadingZero,
    /// More than 16 digits.
    #[error("phone number must be at most {max} digits")]
    TooLong {
        /// Maximum digit count.
        max: usize,
    },
}

/// A mobile or contact phone number.
///
/// Separators (spaces, dashes, parentheses) are stripped on parse. The
/// remaining text must be an optional `+` followed by 1-16 digits, the first
/// of which is non-zero.
///
/// ```
/// use cinnamon_core::PhoneNumber;
///
/// let phone = PhoneNumber::parse("+94 (77) 123-4567").unwrap();
/// assert_eq!(phone.as_str(), "+94771234567");
/// assert!(PhoneNumber::parse("0771234567").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(try_from = "String", into = "String")]
pub struct PhoneNumber(String);

impl PhoneNumber {
    /// Maximum number of digits.
    pub const MAX_DIGITS: usize = 16;

    /// Parse a phone number, stripping separators.
    ///
    /// # Errors
    ///
    /// Returns a [`PhoneError`] when the normalized number is malformed.
    pub fn parse(s: &str) -> Result<Self, PhoneError> {
        let normalized: String = s
            .chars()
            .filter(|c| !matches!(c, ' ' | '-' | '(' | ')'))
            .collect();

        let digits = normalized.strip_prefix('+').unwrap_or(&normalized);
        if digits.is_empty() {
            return Err(PhoneError::Empty);
        }
        if !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(PhoneError::InvalidCharacter);
        }
        if digits.starts_with('0') {
            return Err(PhoneError::LeadingZero);
        }
        if digits.len() > Self::MAX_DIGITS {
            return Err(PhoneError::TooLong {
                max: Self::MAX_DIGITS,
            });
        }

        Ok(Self(normalized))
    }

    /// Returns the normalized number.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for PhoneNumber {
    type Error = PhoneError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<PhoneNumber> for String {
    fn from(phone: PhoneNumber) -> Self {
        phone.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_separators() {
        let phone = PhoneNumber::parse("(771) 234-567").unwrap();
        assert_eq!(phone.as_str(), "771234567");
    }

    #[test]
    fn test_rejects() {
        assert_eq!(PhoneNumber::parse(" - "), Err(PhoneError::Empty));
        assert_eq!(PhoneNumber::parse("+"), Err(PhoneError::Empty));
        assert_eq!(PhoneNumber::parse("77x123"), Err(PhoneError::InvalidCharacter));
        assert_eq!(PhoneNumber::parse("0771234567"), Err(PhoneError::LeadingZero));
        assert!(matches!(
            PhoneNumber::parse("12345678901234567"),
            Err(PhoneError::TooLong { .. })
        ));
    }

    #[test]
    fn test_sixteen_digits_allowed() {
        assert!(PhoneNumber::parse("+1234567890123456").is_ok());
    }
}
