//! Role-based access and invitation system for the tutoring program's
//! administrative layer.
//!
//! A visitor becomes an authenticated account with a capability tier
//! (administrator, a volunteer subject track, or plain user) either by an
//! administrator editing roles or by redeeming a single-use, expiring
//! invitation. The tier is derived from the role store into an
//! [`authz::AuthorizationContext`] whenever the identity changes, and
//! [`authz::AccessGate`] decides what a given context may see.
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`roles`] | Role labels, the role store, admin role edits |
//! | [`invitations`] | Invitation store, issuance, preview and redemption |
//! | [`identity`] | Identity provider contract and a local implementation |
//! | [`authz`] | Authorization context, resolver and access gate |
//! | [`events`] | Domain events and listeners |
//!
//! # Features
//!
//! - `mocks`: in-memory stores for tests
//! - `sqlx_sqlite` / `sqlx_postgres`: sqlx-backed stores and migrations
//! - `axum_support`: HTTP router with gated extractors
//! - `tracing`: span instrumentation on actions and repositories

use std::fmt;

pub mod authz;
pub mod config;
pub mod crypto;
pub mod events;
pub mod identity;
mod inflight;
pub mod invitations;
pub mod repository;
pub mod roles;
mod secret;
pub mod validators;

pub mod api;

#[cfg(feature = "sqlx_postgres")]
pub mod postgres;
#[cfg(feature = "sqlx_sqlite")]
pub mod sqlite;

pub use authz::{
    AccessGate, AccessRequirement, AuthorizationContext, AuthorizationResolver, GateDecision,
    RedirectTarget, RoleFlags, RouteClass, SessionAuthorizer,
};
pub use config::PorticoConfig;
pub use events::{register_event_listeners, PorticoEvent};
pub use identity::{Account, IdentityProvider, LocalIdentityProvider, ProfileAttributes, Session};
pub use invitations::{
    Invitation, InvitationRepository, InvitationStatus, IssueInvitationAction,
    PreviewInvitationAction, RedeemInvitationAction,
};
pub use repository::{AccessToken, AuthUser, NewUser, TokenRepository, UserRepository};
pub use roles::{
    ReplaceRolesAction, RoleAssignment, RoleEdit, RoleEditState, RoleLabel, RoleRepository,
    VolunteerTrack,
};
pub use secret::SecretString;

#[cfg(any(test, feature = "mocks"))]
pub use invitations::MockInvitationRepository;
#[cfg(any(test, feature = "mocks"))]
pub use repository::{MockTokenRepository, MockUserRepository};
#[cfg(any(test, feature = "mocks"))]
pub use roles::MockRoleRepository;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    // invitation state
    InvalidInvitation,
    InvitationExpired,
    InvitationAlreadyUsed,
    InvitationNotCreated,
    /// The account was created but the pre-authorized role could not be
    /// granted. The account can sign in; an administrator grants the role.
    RoleGrantIncomplete {
        account_id: i64,
    },

    // identity
    IdentityProvider(String),
    UserAlreadyExists,
    UserNotFound,
    InvalidCredentials,
    PasswordHashError,
    TokenInvalid,
    TokenExpired,

    // authorization
    AuthorizationUnresolved,
    Forbidden,

    RequestInFlight,
    NotFound,
    Validation(String),
    RoleStore(String),
    DatabaseError(String),
    Internal(String),
}

impl AuthError {
    /// Store failures that may succeed when the same request is repeated.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::DatabaseError(_) | Self::RoleStore(_))
    }

    /// Invitation failures are terminal and shown to the redeemer verbatim.
    pub fn is_invitation_state(&self) -> bool {
        matches!(
            self,
            Self::InvalidInvitation | Self::InvitationExpired | Self::InvitationAlreadyUsed
        )
    }
}

impl std::error::Error for AuthError {}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidInvitation => write!(f, "This invitation link is invalid"),
            Self::InvitationExpired => write!(f, "This invitation has expired"),
            Self::InvitationAlreadyUsed => write!(f, "This invitation has already been used"),
            Self::InvitationNotCreated => write!(f, "Could not create invitation"),
            Self::RoleGrantIncomplete { .. } => write!(
                f,
                "Your account was created but setup is incomplete; sign in and contact an administrator"
            ),
            Self::IdentityProvider(msg) => write!(f, "{msg}"),
            Self::UserAlreadyExists => write!(f, "User already exists"),
            Self::UserNotFound => write!(f, "User not found"),
            Self::InvalidCredentials => write!(f, "Invalid email or password"),
            Self::PasswordHashError => write!(f, "Failed to hash password"),
            Self::TokenInvalid => write!(f, "Invalid session"),
            Self::TokenExpired => write!(f, "Session has expired"),
            Self::AuthorizationUnresolved => write!(f, "Authorization is still being resolved"),
            Self::Forbidden => write!(f, "Forbidden"),
            Self::RequestInFlight => write!(f, "A request is already in progress"),
            Self::NotFound => write!(f, "Not found"),
            Self::Validation(msg) => write!(f, "{msg}"),
            Self::RoleStore(msg) => write!(f, "Role store error: {msg}"),
            Self::DatabaseError(msg) => write!(f, "Database error: {msg}"),
            Self::Internal(msg) => write!(f, "Internal error: {msg}"),
        }
    }
}

impl From<validators::ValidationError> for AuthError {
    fn from(err: validators::ValidationError) -> Self {
        Self::Validation(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        assert!(AuthError::DatabaseError("timeout".to_owned()).is_transient());
        assert!(AuthError::RoleStore("unavailable".to_owned()).is_transient());
        assert!(!AuthError::InvitationAlreadyUsed.is_transient());
        assert!(!AuthError::Forbidden.is_transient());
    }

    #[test]
    fn test_invitation_errors_name_the_reason() {
        assert_eq!(
            AuthError::InvitationExpired.to_string(),
            "This invitation has expired"
        );
        assert_eq!(
            AuthError::InvitationAlreadyUsed.to_string(),
            "This invitation has already been used"
        );
        assert!(AuthError::InvalidInvitation.is_invitation_state());
        assert!(!AuthError::RequestInFlight.is_invitation_state());
    }

    #[test]
    fn test_forbidden_does_not_name_a_role() {
        let message = AuthError::Forbidden.to_string().to_lowercase();
        assert!(!message.contains("admin"));
        assert!(!message.contains("volunteer"));
    }
}
