use std::sync::LazyLock;

use regex::Regex;

use super::ValidationError;

#[allow(clippy::unwrap_used)]
static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").unwrap()
});

/// Trims and lowercases an address so invitation targets and account emails
/// compare equal regardless of how they were typed.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    if email.is_empty() {
        return Err(ValidationError::EmailEmpty);
    }

    if email.len() > 254 {
        return Err(ValidationError::EmailTooLong);
    }

    if !EMAIL_REGEX.is_match(email) {
        return Err(ValidationError::EmailInvalidFormat);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_emails() {
        assert!(validate_email("new@example.org").is_ok());
        assert!(validate_email("first.last@tutoring.example.org").is_ok());
        assert!(validate_email("tutor+ela@example.com").is_ok());
    }

    #[test]
    fn test_invalid_emails() {
        assert_eq!(validate_email(""), Err(ValidationError::EmailEmpty));
        assert_eq!(
            validate_email("not-an-email"),
            Err(ValidationError::EmailInvalidFormat)
        );
        assert_eq!(
            validate_email("missing@tld"),
            Err(ValidationError::EmailInvalidFormat)
        );
        assert_eq!(
            validate_email("two words@example.org"),
            Err(ValidationError::EmailInvalidFormat)
        );
    }

    #[test]
    fn test_email_too_long() {
        let long_email = format!("{}@example.org", "a".repeat(250));
        assert_eq!(validate_email(&long_email), Err(ValidationError::EmailTooLong));
    }

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  New@Example.ORG "), "new@example.org");
    }
}
