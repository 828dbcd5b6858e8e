//! `SQLite` implementations of the store traits.
//!
//! Enable the `sqlx_sqlite` feature and run [`migrations::run`] before use.

mod invitation;
pub mod migrations;
mod role;
mod token;
mod user;

pub use invitation::SqliteInvitationRepository;
pub use role::SqliteRoleRepository;
use sqlx::SqlitePool;
pub use token::SqliteTokenRepository;
pub use user::SqliteUserRepository;

/// Creates every `SQLite` store from one connection pool.
pub fn create_repositories(
    pool: SqlitePool,
) -> (
    SqliteUserRepository,
    SqliteTokenRepository,
    SqliteRoleRepository,
    SqliteInvitationRepository,
) {
    (
        SqliteUserRepository::new(pool.clone()),
        SqliteTokenRepository::new(pool.clone()),
        SqliteRoleRepository::new(pool.clone()),
        SqliteInvitationRepository::new(pool),
    )
}
