//! Embedded migrations for `SQLite`.
//!
//! ```rust,ignore
//! use portico::sqlite::migrations;
//! use sqlx::SqlitePool;
//!
//! async fn setup_database(pool: &SqlitePool) -> Result<(), sqlx::Error> {
//!     migrations::run(pool).await
//! }
//! ```

use sqlx::{Executor, SqlitePool};

const MIGRATIONS: &[(&str, &str)] = &[
    (
        "20250301000001_create_users_table",
        include_str!("../../migrations_sqlite/20250301000001_create_users_table.sql"),
    ),
    (
        "20250301000002_create_session_tokens_table",
        include_str!("../../migrations_sqlite/20250301000002_create_session_tokens_table.sql"),
    ),
    (
        "20250301000003_create_user_roles_table",
        include_str!("../../migrations_sqlite/20250301000003_create_user_roles_table.sql"),
    ),
    (
        "20250301000004_create_invitations_table",
        include_str!("../../migrations_sqlite/20250301000004_create_invitations_table.sql"),
    ),
];

/// Applies pending migrations in order, tracked in `_portico_migrations`.
pub async fn run(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    pool.execute(
        r"
        CREATE TABLE IF NOT EXISTS _portico_migrations (
            name TEXT PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
        )
        ",
    )
    .await?;

    for (name, sql) in MIGRATIONS {
        let applied: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM _portico_migrations WHERE name = ?)")
                .bind(*name)
                .fetch_one(pool)
                .await?;

        if applied {
            continue;
        }

        // one statement per execute; bundled migrations contain no ';' in literals
        for statement in sql.split(';') {
            let trimmed = statement.trim();
            if !trimmed.is_empty() {
                pool.execute(trimmed).await?;
            }
        }

        sqlx::query("INSERT INTO _portico_migrations (name) VALUES (?)")
            .bind(*name)
            .execute(pool)
            .await?;

        log::info!(target: "portico", "msg=\"migration applied\", name=\"{name}\"");
    }

    Ok(())
}
