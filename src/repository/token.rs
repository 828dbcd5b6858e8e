use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::{AuthError, SecretString};

/// Opaque session token.
///
/// Stores keep only the SHA-256 hash; the plain value is present only on the
/// token returned by [`TokenRepository::create_token`].
#[derive(Debug, Clone, Serialize)]
pub struct AccessToken {
    pub token: SecretString,
    pub user_id: i64,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl AccessToken {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

#[async_trait]
pub trait TokenRepository: Send + Sync {
    async fn create_token(
        &self,
        user_id: i64,
        expires_at: DateTime<Utc>,
    ) -> Result<AccessToken, AuthError>;

    /// Looks up a token by its plain value.
    async fn find_token(&self, token: &str) -> Result<Option<AccessToken>, AuthError>;
    async fn revoke_token(&self, token: &str) -> Result<(), AuthError>;
}
