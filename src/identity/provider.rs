use async_trait::async_trait;
use tokio::sync::watch;

use super::types::{Account, ProfileAttributes, Session};
use crate::{AuthError, SecretString};

/// Account and session provider consumed by the access layer.
///
/// A provider value is one client's handle: it tracks that client's current
/// session and notifies subscribers when it changes.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Creates an account. Does not sign in.
    ///
    /// # Errors
    ///
    /// `AuthError::UserAlreadyExists` if the email is taken.
    async fn sign_up(
        &self,
        email: &str,
        password: &SecretString,
        profile: &ProfileAttributes,
    ) -> Result<Account, AuthError>;

    async fn sign_in(&self, email: &str, password: &SecretString) -> Result<Session, AuthError>;

    async fn sign_out(&self) -> Result<(), AuthError>;

    /// Replaces the current session with a fresh one for the same account.
    async fn refresh_session(&self) -> Result<Session, AuthError>;

    fn current_session(&self) -> Option<Session>;

    /// Receives the session after every sign-in, sign-out and refresh.
    fn on_session_change(&self) -> watch::Receiver<Option<Session>>;
}
