//! Wrapper for values that must never reach a log line.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Passwords, session tokens and invitation codes.
///
/// `Debug` and `Display` print `[REDACTED]`; the value is only reachable
/// through [`SecretString::expose_secret`]. Serialization writes the plain
/// value, since an issued code or session token has to be returned once.
///
/// ```rust
/// use portico::SecretString;
///
/// let code = SecretString::new("q8ZrT2mW0pLx7vNc4bHy1kDs");
/// assert_eq!(format!("{code:?}"), "SecretString([REDACTED])");
/// assert_eq!(code.expose_secret().len(), 24);
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct SecretString(String);

impl SecretString {
    #[must_use]
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    #[must_use]
    pub fn expose_secret(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretString([REDACTED])")
    }
}

impl fmt::Display for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl From<String> for SecretString {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for SecretString {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl Serialize for SecretString {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for SecretString {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        String::deserialize(deserializer).map(SecretString)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_is_redacted_in_debug_and_display() {
        let password = SecretString::new("hunter2-but-longer");
        assert_eq!(format!("{password:?}"), "SecretString([REDACTED])");
        assert_eq!(format!("{password}"), "[REDACTED]");
        assert_eq!(password.expose_secret(), "hunter2-but-longer");
    }

    #[test]
    fn test_redacted_inside_derived_debug() {
        #[derive(Debug)]
        #[allow(dead_code)]
        struct Form {
            email: String,
            password: SecretString,
        }

        let form = Form {
            email: "new@example.org".to_owned(),
            password: "tutor-pass".into(),
        };
        let printed = format!("{form:?}");
        assert!(printed.contains("new@example.org"));
        assert!(!printed.contains("tutor-pass"));
    }

    #[test]
    fn test_deserialize_from_request_body() {
        let code: SecretString = serde_json::from_str("\"abc123\"").unwrap();
        assert_eq!(code.expose_secret(), "abc123");
        assert!(!code.is_empty());
        assert_eq!(serde_json::to_string(&code).unwrap(), "\"abc123\"");
    }
}
