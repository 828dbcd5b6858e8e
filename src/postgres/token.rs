use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

use crate::crypto::{generate_code, hash_token, SESSION_TOKEN_LENGTH};
use crate::repository::{AccessToken, TokenRepository};
use crate::{AuthError, SecretString};

#[derive(Clone)]
pub struct PostgresTokenRepository {
    pool: PgPool,
}

impl PostgresTokenRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct TokenRecord {
    user_id: i64,
    expires_at: DateTime<Utc>,
    created_at: DateTime<Utc>,
}

impl TokenRecord {
    fn into_access_token(self, plain_token: String) -> AccessToken {
        AccessToken {
            token: SecretString::new(plain_token),
            user_id: self.user_id,
            expires_at: self.expires_at,
            created_at: self.created_at,
        }
    }
}

#[async_trait]
impl TokenRepository for PostgresTokenRepository {
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self), err))]
    async fn create_token(
        &self,
        user_id: i64,
        expires_at: DateTime<Utc>,
    ) -> Result<AccessToken, AuthError> {
        let plain_token = generate_code(SESSION_TOKEN_LENGTH);
        let token_hash = hash_token(&plain_token);

        let row: TokenRecord = sqlx::query_as(
            r"INSERT INTO session_tokens (token_hash, user_id, expires_at, created_at)
               VALUES ($1, $2, $3, $4)
               RETURNING user_id, expires_at, created_at",
        )
        .bind(&token_hash)
        .bind(user_id)
        .bind(expires_at)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            log::error!(target: "portico", "msg=\"database error\", operation=\"create_token\", error=\"{e}\"");
            AuthError::DatabaseError(e.to_string())
        })?;

        Ok(row.into_access_token(plain_token))
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self, token), err))]
    async fn find_token(&self, token: &str) -> Result<Option<AccessToken>, AuthError> {
        let row: Option<TokenRecord> = sqlx::query_as(
            "SELECT user_id, expires_at, created_at FROM session_tokens WHERE token_hash = $1",
        )
        .bind(hash_token(token))
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            log::error!(target: "portico", "msg=\"database error\", operation=\"find_token\", error=\"{e}\"");
            AuthError::DatabaseError(e.to_string())
        })?;

        Ok(row.map(|r| r.into_access_token(token.to_owned())))
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self, token), err))]
    async fn revoke_token(&self, token: &str) -> Result<(), AuthError> {
        sqlx::query("DELETE FROM session_tokens WHERE token_hash = $1")
            .bind(hash_token(token))
            .execute(&self.pool)
            .await
            .map_err(|e| {
                log::error!(target: "portico", "msg=\"database error\", operation=\"revoke_token\", error=\"{e}\"");
                AuthError::DatabaseError(e.to_string())
            })?;

        Ok(())
    }
}
