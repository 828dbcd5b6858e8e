use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::watch;

use super::provider::IdentityProvider;
use super::types::{Account, ProfileAttributes, Session};
use crate::crypto::{Argon2Hasher, PasswordHasher};
use crate::events::{dispatch, PorticoEvent};
use crate::repository::{NewUser, TokenRepository, UserRepository};
use crate::validators::{normalize_email, validate_email, validate_password_present};
use crate::{AuthError, PorticoConfig, SecretString};

/// Identity provider backed by the crate's user and token stores.
///
/// Passwords are hashed with Argon2id; sessions are opaque random tokens
/// whose SHA-256 hash is stored.
pub struct LocalIdentityProvider<U, T, H = Argon2Hasher>
where
    U: UserRepository,
    T: TokenRepository,
    H: PasswordHasher,
{
    user_repo: U,
    token_repo: T,
    hasher: H,
    session_expiry: chrono::Duration,
    session: watch::Sender<Option<Session>>,
}

impl<U: UserRepository, T: TokenRepository> LocalIdentityProvider<U, T> {
    pub fn new(user_repo: U, token_repo: T, config: &PorticoConfig) -> Self {
        Self::with_hasher(user_repo, token_repo, Argon2Hasher::default(), config)
    }
}

impl<U, T, H> LocalIdentityProvider<U, T, H>
where
    U: UserRepository,
    T: TokenRepository,
    H: PasswordHasher,
{
    pub fn with_hasher(user_repo: U, token_repo: T, hasher: H, config: &PorticoConfig) -> Self {
        let (session, _) = watch::channel(None);
        Self {
            user_repo,
            token_repo,
            hasher,
            session_expiry: config.session_expiry,
            session,
        }
    }

    /// Adopts an existing session token, e.g. one presented as a bearer
    /// token, and publishes it as the current session.
    ///
    /// # Errors
    ///
    /// `AuthError::TokenInvalid` for unknown tokens, `AuthError::TokenExpired`
    /// for expired ones.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip_all, err))]
    pub async fn resume(&self, token: &SecretString) -> Result<Session, AuthError> {
        let stored = self
            .token_repo
            .find_token(token.expose_secret())
            .await?
            .ok_or(AuthError::TokenInvalid)?;

        if stored.is_expired_at(Utc::now()) {
            return Err(AuthError::TokenExpired);
        }

        let user = self
            .user_repo
            .find_user_by_id(stored.user_id)
            .await?
            .ok_or(AuthError::TokenInvalid)?;

        let session = Session {
            account: Account::from(&user),
            token: token.clone(),
            expires_at: stored.expires_at,
        };
        self.session.send_replace(Some(session.clone()));
        Ok(session)
    }

    async fn issue_session(&self, account: Account) -> Result<Session, AuthError> {
        let expires_at = Utc::now() + self.session_expiry;
        let token = self.token_repo.create_token(account.id, expires_at).await?;
        Ok(Session {
            account,
            token: token.token,
            expires_at,
        })
    }
}

#[async_trait]
impl<U, T, H> IdentityProvider for LocalIdentityProvider<U, T, H>
where
    U: UserRepository,
    T: TokenRepository,
    H: PasswordHasher,
{
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self, password), err))]
    async fn sign_up(
        &self,
        email: &str,
        password: &SecretString,
        profile: &ProfileAttributes,
    ) -> Result<Account, AuthError> {
        let email = normalize_email(email);
        validate_email(&email)?;
        validate_password_present(password)?;

        let hashed_password = self.hasher.hash(password.expose_secret())?;
        let user = self
            .user_repo
            .create_user(NewUser {
                email,
                first_name: profile.first_name.trim().to_owned(),
                last_name: profile.last_name.trim().to_owned(),
                hashed_password,
            })
            .await?;

        log::info!(
            target: "portico",
            "msg=\"account registered\", user_id={}",
            user.id
        );

        dispatch(PorticoEvent::AccountRegistered {
            user_id: user.id,
            email: user.email.clone(),
            at: Utc::now(),
        })
        .await;

        Ok(Account::from(&user))
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self, password), err))]
    async fn sign_in(&self, email: &str, password: &SecretString) -> Result<Session, AuthError> {
        let email = normalize_email(email);
        let user = self
            .user_repo
            .find_user_by_email(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !self
            .hasher
            .verify(password.expose_secret(), &user.hashed_password)?
        {
            log::info!(
                target: "portico",
                "msg=\"sign in failed\", user_id={}",
                user.id
            );
            return Err(AuthError::InvalidCredentials);
        }

        let session = self.issue_session(Account::from(&user)).await?;
        self.session.send_replace(Some(session.clone()));

        dispatch(PorticoEvent::SignedIn {
            user_id: user.id,
            at: Utc::now(),
        })
        .await;

        Ok(session)
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self), err))]
    async fn sign_out(&self) -> Result<(), AuthError> {
        let Some(session) = self.current_session() else {
            return Ok(());
        };

        // clear first so no subscriber keeps a revoked session
        self.session.send_replace(None);
        self.token_repo
            .revoke_token(session.token.expose_secret())
            .await?;

        dispatch(PorticoEvent::SignedOut {
            user_id: session.account.id,
            at: Utc::now(),
        })
        .await;

        Ok(())
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self), err))]
    async fn refresh_session(&self) -> Result<Session, AuthError> {
        let current = self.current_session().ok_or(AuthError::TokenInvalid)?;
        if current.is_expired_at(Utc::now()) {
            self.session.send_replace(None);
            return Err(AuthError::TokenExpired);
        }

        let session = self.issue_session(current.account.clone()).await?;
        self.token_repo
            .revoke_token(current.token.expose_secret())
            .await?;
        self.session.send_replace(Some(session.clone()));

        dispatch(PorticoEvent::SessionRefreshed {
            user_id: session.account.id,
            at: Utc::now(),
        })
        .await;

        Ok(session)
    }

    fn current_session(&self) -> Option<Session> {
        self.session.borrow().clone()
    }

    fn on_session_change(&self) -> watch::Receiver<Option<Session>> {
        self.session.subscribe()
    }
}
