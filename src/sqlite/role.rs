use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqlitePool};

use crate::roles::{RoleAssignment, RoleLabel, RoleRepository};
use crate::AuthError;

#[derive(Clone)]
pub struct SqliteRoleRepository {
    pool: SqlitePool,
}

impl SqliteRoleRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct RoleRecord {
    user_id: i64,
    role: String,
    created_at: DateTime<Utc>,
}

impl RoleRecord {
    fn into_assignment(self) -> Option<RoleAssignment> {
        let Some(role) = RoleLabel::parse(&self.role) else {
            log::warn!(
                target: "portico",
                "msg=\"skipping unknown role label\", user_id={}, role=\"{}\"",
                self.user_id,
                self.role
            );
            return None;
        };
        Some(RoleAssignment {
            user_id: self.user_id,
            role,
            created_at: self.created_at,
        })
    }
}

#[async_trait]
impl RoleRepository for SqliteRoleRepository {
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self), err))]
    async fn list_roles(&self, user_id: i64) -> Result<Vec<RoleLabel>, AuthError> {
        Ok(self
            .list_assignments(user_id)
            .await?
            .into_iter()
            .map(|a| a.role)
            .collect())
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self), err))]
    async fn list_assignments(&self, user_id: i64) -> Result<Vec<RoleAssignment>, AuthError> {
        let rows: Vec<RoleRecord> = sqlx::query_as(
            "SELECT user_id, role, created_at FROM user_roles WHERE user_id = ? ORDER BY role",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            log::error!(target: "portico", "msg=\"database error\", operation=\"list_roles\", error=\"{e}\"");
            AuthError::RoleStore(e.to_string())
        })?;

        Ok(rows
            .into_iter()
            .filter_map(RoleRecord::into_assignment)
            .collect())
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self), err))]
    async fn add_role(&self, user_id: i64, role: RoleLabel) -> Result<(), AuthError> {
        sqlx::query("INSERT OR IGNORE INTO user_roles (user_id, role, created_at) VALUES (?, ?, ?)")
            .bind(user_id)
            .bind(role.as_str())
            .bind(Utc::now())
            .execute(&self.pool)
            .await
            .map_err(|e| {
                log::error!(target: "portico", "msg=\"database error\", operation=\"add_role\", error=\"{e}\"");
                AuthError::RoleStore(e.to_string())
            })?;

        Ok(())
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self), err))]
    async fn replace_roles(&self, user_id: i64, roles: &[RoleLabel]) -> Result<(), AuthError> {
        let map_err = |e: sqlx::Error| {
            log::error!(target: "portico", "msg=\"database error\", operation=\"replace_roles\", error=\"{e}\"");
            AuthError::RoleStore(e.to_string())
        };

        let mut tx = self.pool.begin().await.map_err(map_err)?;

        sqlx::query("DELETE FROM user_roles WHERE user_id = ?")
            .bind(user_id)
            .execute(&mut *tx)
            .await
            .map_err(map_err)?;

        let now = Utc::now();
        for role in roles {
            sqlx::query(
                "INSERT OR IGNORE INTO user_roles (user_id, role, created_at) VALUES (?, ?, ?)",
            )
            .bind(user_id)
            .bind(role.as_str())
            .bind(now)
            .execute(&mut *tx)
            .await
            .map_err(map_err)?;
        }

        tx.commit().await.map_err(map_err)?;
        Ok(())
    }
}
