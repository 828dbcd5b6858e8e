//! `PostgreSQL` implementations of the store traits.
//!
//! Enable the `sqlx_postgres` feature and run [`migrations::run`] before use.

mod invitation;
pub mod migrations;
mod role;
mod token;
mod user;

pub use invitation::PostgresInvitationRepository;
pub use role::PostgresRoleRepository;
use sqlx::PgPool;
pub use token::PostgresTokenRepository;
pub use user::PostgresUserRepository;

/// Creates every `PostgreSQL` store from one connection pool.
pub fn create_repositories(
    pool: PgPool,
) -> (
    PostgresUserRepository,
    PostgresTokenRepository,
    PostgresRoleRepository,
    PostgresInvitationRepository,
) {
    (
        PostgresUserRepository::new(pool.clone()),
        PostgresTokenRepository::new(pool.clone()),
        PostgresRoleRepository::new(pool.clone()),
        PostgresInvitationRepository::new(pool),
    )
}
