//! Input validation for invitation targets and signup profiles.
//!
//! Password strength is the identity provider's concern and is not checked
//! here beyond rejecting an empty value.

mod email;
mod profile;

pub use email::{normalize_email, validate_email};
pub use profile::validate_profile;

use crate::SecretString;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    EmailEmpty,
    EmailTooLong,
    EmailInvalidFormat,
    NameEmpty { field: &'static str },
    NameTooLong { field: &'static str, max: usize },
    PasswordEmpty,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmailEmpty => write!(f, "Email cannot be empty"),
            Self::EmailTooLong => write!(f, "Email is too long (max 254 characters)"),
            Self::EmailInvalidFormat => write!(f, "Invalid email format"),
            Self::NameEmpty { field } => write!(f, "{field} cannot be empty"),
            Self::NameTooLong { field, max } => {
                write!(f, "{field} is too long (max {max} characters)")
            }
            Self::PasswordEmpty => write!(f, "Password cannot be empty"),
        }
    }
}

impl std::error::Error for ValidationError {}

pub fn validate_password_present(password: &SecretString) -> Result<(), ValidationError> {
    if password.is_empty() {
        return Err(ValidationError::PasswordEmpty);
    }
    Ok(())
}
