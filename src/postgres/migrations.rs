//! Embedded migrations for `PostgreSQL`.
//!
//! ```rust,ignore
//! use portico::postgres::migrations;
//! use sqlx::PgPool;
//!
//! async fn setup_database(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
//!     migrations::run(pool).await
//! }
//! ```

use sqlx::PgPool;

/// Applies `users`, `session_tokens`, `user_roles` and `invitations`.
pub async fn run(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations_postgres").run(pool).await
}
