//! Configuration for the access layer.
//!
//! # Example
//!
//! ```rust
//! use portico::config::PorticoConfig;
//!
//! let config = PorticoConfig::new("https://tutoring.example.org");
//! assert_eq!(
//!     config.redemption_link("abc"),
//!     "https://tutoring.example.org/invite/abc"
//! );
//! ```

use chrono::Duration;

use crate::crypto::{DEFAULT_CODE_LENGTH, MIN_CODE_LENGTH};

/// Days an invitation stays redeemable after creation.
///
/// Deliberately not part of [`PorticoConfig`]: issuers cannot shorten or
/// extend it.
pub const INVITATION_EXPIRY_DAYS: i64 = 7;

/// Lifetime of an invitation as a duration.
pub fn invitation_expiry() -> Duration {
    Duration::days(INVITATION_EXPIRY_DAYS)
}

#[derive(Debug, Clone)]
pub struct PorticoConfig {
    /// Origin used to build redemption links (`{base_url}/invite/{code}`).
    pub base_url: String,

    /// Length of generated invitation codes.
    ///
    /// Values below [`MIN_CODE_LENGTH`] are raised to it when used.
    pub invitation_code_length: usize,

    /// Lifetime of sessions issued by the local identity provider.
    ///
    /// Default: 7 days
    pub session_expiry: Duration,

    /// Upper bound on a role lookup. A lookup that exceeds it resolves to
    /// "no privileged role".
    ///
    /// Default: 5 seconds
    pub role_lookup_timeout: std::time::Duration,
}

impl Default for PorticoConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_owned(),
            invitation_code_length: DEFAULT_CODE_LENGTH,
            session_expiry: Duration::days(7),
            role_lookup_timeout: std::time::Duration::from_secs(5),
        }
    }
}

impl PorticoConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Long sessions and a generous lookup timeout for local work.
    pub fn development() -> Self {
        Self {
            session_expiry: Duration::days(30),
            role_lookup_timeout: std::time::Duration::from_secs(30),
            ..Self::default()
        }
    }

    /// Short sessions, longer codes, tight lookup timeout.
    pub fn strict() -> Self {
        Self {
            invitation_code_length: 32,
            session_expiry: Duration::hours(12),
            role_lookup_timeout: std::time::Duration::from_secs(2),
            ..Self::default()
        }
    }

    /// Effective code length after applying the entropy floor.
    pub fn code_length(&self) -> usize {
        self.invitation_code_length.max(MIN_CODE_LENGTH)
    }

    /// The code is the only path segment; nothing sensitive goes in a query.
    pub fn redemption_link(&self, code: &str) -> String {
        format!("{}/invite/{code}", self.base_url.trim_end_matches('/'))
    }
}
