use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqlitePool};

use crate::invitations::{CreateInvitation, Invitation, InvitationRepository};
use crate::roles::RoleLabel;
use crate::AuthError;

#[derive(Clone)]
pub struct SqliteInvitationRepository {
    pool: SqlitePool,
}

impl SqliteInvitationRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct InvitationRecord {
    id: i64,
    email: String,
    role: String,
    code_hash: String,
    created_by: i64,
    created_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
    redeemed_at: Option<DateTime<Utc>>,
    redeemed_by: Option<i64>,
}

impl TryFrom<InvitationRecord> for Invitation {
    type Error = AuthError;

    fn try_from(row: InvitationRecord) -> Result<Self, Self::Error> {
        let role = RoleLabel::parse(&row.role).ok_or_else(|| {
            log::error!(
                target: "portico",
                "msg=\"invitation has unknown role\", invitation_id={}, role=\"{}\"",
                row.id,
                row.role
            );
            AuthError::DatabaseError(format!("unknown role label: {}", row.role))
        })?;

        Ok(Invitation {
            id: row.id,
            email: row.email,
            role,
            code_hash: row.code_hash,
            created_by: row.created_by,
            created_at: row.created_at,
            expires_at: row.expires_at,
            redeemed_at: row.redeemed_at,
            redeemed_by: row.redeemed_by,
        })
    }
}

const INVITATION_COLUMNS: &str =
    "id, email, role, code_hash, created_by, created_at, expires_at, redeemed_at, redeemed_by";

#[async_trait]
impl InvitationRepository for SqliteInvitationRepository {
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self, data), err))]
    async fn create(&self, data: CreateInvitation) -> Result<Invitation, AuthError> {
        let row: InvitationRecord = sqlx::query_as(&format!(
            "INSERT INTO invitations (email, role, code_hash, created_by, created_at, expires_at) VALUES (?, ?, ?, ?, ?, ?) RETURNING {INVITATION_COLUMNS}"
        ))
        .bind(&data.email)
        .bind(data.role.as_str())
        .bind(&data.code_hash)
        .bind(data.created_by)
        .bind(data.created_at)
        .bind(data.expires_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            log::error!(target: "portico", "msg=\"database error\", operation=\"create_invitation\", error=\"{e}\"");
            AuthError::DatabaseError(e.to_string())
        })?;

        row.try_into()
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self, code_hash), err))]
    async fn find_by_code_hash(&self, code_hash: &str) -> Result<Option<Invitation>, AuthError> {
        let row: Option<InvitationRecord> = sqlx::query_as(&format!(
            "SELECT {INVITATION_COLUMNS} FROM invitations WHERE code_hash = ?"
        ))
        .bind(code_hash)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            log::error!(target: "portico", "msg=\"database error\", operation=\"find_invitation\", error=\"{e}\"");
            AuthError::DatabaseError(e.to_string())
        })?;

        row.map(TryInto::try_into).transpose()
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self), err))]
    async fn list(&self) -> Result<Vec<Invitation>, AuthError> {
        let rows: Vec<InvitationRecord> = sqlx::query_as(&format!(
            "SELECT {INVITATION_COLUMNS} FROM invitations ORDER BY created_at DESC, id DESC"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            log::error!(target: "portico", "msg=\"database error\", operation=\"list_invitations\", error=\"{e}\"");
            AuthError::DatabaseError(e.to_string())
        })?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self, code_hash), err))]
    async fn redeem(
        &self,
        code_hash: &str,
        account_id: i64,
        now: DateTime<Utc>,
    ) -> Result<Invitation, AuthError> {
        let map_err = |e: sqlx::Error| {
            log::error!(target: "portico", "msg=\"database error\", operation=\"redeem_invitation\", error=\"{e}\"");
            AuthError::DatabaseError(e.to_string())
        };

        let mut tx = self.pool.begin().await.map_err(map_err)?;

        // compare-and-swap on redeemed_at
        let stamped: Option<InvitationRecord> = sqlx::query_as(&format!(
            "UPDATE invitations SET redeemed_at = ?, redeemed_by = ? WHERE code_hash = ? AND redeemed_at IS NULL AND expires_at > ? RETURNING {INVITATION_COLUMNS}"
        ))
        .bind(now)
        .bind(account_id)
        .bind(code_hash)
        .bind(now)
        .fetch_optional(&mut *tx)
        .await
        .map_err(map_err)?;

        let Some(stamped) = stamped else {
            let current: Option<InvitationRecord> = sqlx::query_as(&format!(
                "SELECT {INVITATION_COLUMNS} FROM invitations WHERE code_hash = ?"
            ))
            .bind(code_hash)
            .fetch_optional(&mut *tx)
            .await
            .map_err(map_err)?;

            let current: Invitation = current.ok_or(AuthError::InvalidInvitation)?.try_into()?;
            current.check_redeemable(now)?;
            return Err(AuthError::InvitationAlreadyUsed);
        };
        let invitation: Invitation = stamped.try_into()?;

        sqlx::query("INSERT OR IGNORE INTO user_roles (user_id, role, created_at) VALUES (?, ?, ?)")
            .bind(account_id)
            .bind(invitation.role.as_str())
            .bind(now)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                log::error!(target: "portico", "msg=\"database error\", operation=\"grant_invited_role\", error=\"{e}\"");
                AuthError::RoleStore(e.to_string())
            })?;

        tx.commit().await.map_err(map_err)?;
        Ok(invitation)
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self), err))]
    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<u64, AuthError> {
        let result =
            sqlx::query("DELETE FROM invitations WHERE redeemed_at IS NULL AND expires_at <= ?")
                .bind(now)
                .execute(&self.pool)
                .await
                .map_err(|e| {
                    log::error!(target: "portico", "msg=\"database error\", operation=\"delete_expired_invitations\", error=\"{e}\"");
                    AuthError::DatabaseError(e.to_string())
                })?;

        Ok(result.rows_affected())
    }
}
