//! Account and session-token storage behind the local identity provider.
//!
//! | Trait | Description |
//! |-------|-------------|
//! | [`UserRepository`] | Account records with hashed passwords |
//! | [`TokenRepository`] | Hashed opaque session tokens |
//!
//! Enable the `mocks` feature for [`MockUserRepository`] and
//! [`MockTokenRepository`].

mod token;
mod user;

#[cfg(any(test, feature = "mocks"))]
mod token_mock;
#[cfg(any(test, feature = "mocks"))]
mod user_mock;

pub use token::{AccessToken, TokenRepository};
pub use user::{AuthUser, NewUser, UserRepository};

#[cfg(any(test, feature = "mocks"))]
pub use token_mock::MockTokenRepository;
#[cfg(any(test, feature = "mocks"))]
pub use user_mock::MockUserRepository;
