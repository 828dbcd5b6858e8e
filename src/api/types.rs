use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::authz::AuthorizationContext;
use crate::identity::Session;
use crate::invitations::{Invitation, InvitationStatus, IssuedInvitation, Redemption};
use crate::repository::AuthUser;
use crate::roles::{primary_role, RoleAssignment, RoleLabel, VolunteerTrack};
use crate::{AuthError, SecretString};

// Request DTOs

#[derive(Debug, Deserialize)]
pub struct SignInRequest {
    pub email: String,
    pub password: SecretString,
}

/// The email comes from the invitation and is not part of the form.
#[derive(Debug, Deserialize)]
pub struct RedeemInvitationRequest {
    pub password: SecretString,
    pub first_name: String,
    pub last_name: String,
}

#[derive(Debug, Deserialize)]
pub struct IssueInvitationRequest {
    pub email: String,
    pub role: RoleLabel,
}

#[derive(Debug, Deserialize)]
pub struct ReplaceRoleRequest {
    pub role: RoleLabel,
}

// Response DTOs

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub user_id: i64,
    pub email: String,
    pub token: SecretString,
    pub expires_at: DateTime<Utc>,
}

impl From<Session> for SessionResponse {
    fn from(session: Session) -> Self {
        Self {
            user_id: session.account.id,
            email: session.account.email,
            token: session.token,
            expires_at: session.expires_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AuthorizationResponse {
    pub user_id: i64,
    pub email: String,
    pub is_admin: bool,
    pub is_volunteer: bool,
    pub volunteer_track: Option<VolunteerTrack>,
}

impl AuthorizationResponse {
    pub fn from_context(ctx: &AuthorizationContext) -> Option<Self> {
        let account = ctx.account()?;
        Some(Self {
            user_id: account.id,
            email: account.email.clone(),
            is_admin: ctx.is_admin(),
            is_volunteer: ctx.is_volunteer(),
            volunteer_track: ctx.volunteer_track(),
        })
    }
}

#[derive(Debug, Serialize)]
pub struct InvitationResponse {
    pub id: i64,
    pub email: String,
    pub role: RoleLabel,
    pub role_display: &'static str,
    pub status: InvitationStatus,
    pub created_by: i64,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub redeemed_at: Option<DateTime<Utc>>,
}

impl InvitationResponse {
    pub fn at(invitation: Invitation, now: DateTime<Utc>) -> Self {
        Self {
            status: invitation.status_at(now),
            id: invitation.id,
            email: invitation.email,
            role: invitation.role,
            role_display: invitation.role.display_name(),
            created_by: invitation.created_by,
            created_at: invitation.created_at,
            expires_at: invitation.expires_at,
            redeemed_at: invitation.redeemed_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct IssuedInvitationResponse {
    pub invitation: InvitationResponse,
    pub code: SecretString,
    pub link: String,
}

impl From<IssuedInvitation> for IssuedInvitationResponse {
    fn from(issued: IssuedInvitation) -> Self {
        Self {
            invitation: InvitationResponse::at(issued.invitation, Utc::now()),
            code: issued.code,
            link: issued.link,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RedemptionResponse {
    pub user_id: i64,
    pub email: String,
    pub role: RoleLabel,
    pub message: String,
}

impl From<Redemption> for RedemptionResponse {
    fn from(redemption: Redemption) -> Self {
        Self {
            user_id: redemption.account.id,
            email: redemption.account.email,
            role: redemption.role,
            message: "Account ready. Sign in to continue.".to_owned(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UserSummaryResponse {
    pub id: i64,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub roles: Vec<RoleLabel>,
    pub primary_role: RoleLabel,
    pub primary_role_display: &'static str,
    /// When the primary role was granted; absent for the implicit `user` role.
    pub role_granted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl UserSummaryResponse {
    pub fn new(user: AuthUser, assignments: Vec<RoleAssignment>) -> Self {
        let mut roles: Vec<RoleLabel> = assignments.iter().map(|a| a.role).collect();
        roles.sort_by_key(|r| r.as_str());
        roles.dedup();
        let primary = primary_role(&roles);
        let role_granted_at = assignments
            .iter()
            .filter(|a| a.role == primary)
            .map(|a| a.created_at)
            .min();
        Self {
            id: user.id,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            roles,
            primary_role: primary,
            primary_role_display: primary.display_name(),
            role_granted_at,
            created_at: user.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct VolunteerDashboardResponse {
    pub user_id: i64,
    pub email: String,
    pub volunteer_track: Option<VolunteerTrack>,
    pub is_admin: bool,
}

#[derive(Debug, Serialize)]
pub struct PruneResponse {
    pub deleted: u64,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

/// Shown for store and provider failures; the backend text is only logged.
pub const RETRY_MESSAGE: &str = "Something went wrong. Please try again.";

impl From<AuthError> for ErrorResponse {
    fn from(err: AuthError) -> Self {
        let code = match &err {
            AuthError::InvalidInvitation => "INVALID_INVITATION",
            AuthError::InvitationExpired => "INVITATION_EXPIRED",
            AuthError::InvitationAlreadyUsed => "INVITATION_ALREADY_USED",
            AuthError::InvitationNotCreated => "INVITATION_NOT_CREATED",
            AuthError::RoleGrantIncomplete { .. } => "ROLE_GRANT_INCOMPLETE",
            AuthError::IdentityProvider(_) => "IDENTITY_PROVIDER_ERROR",
            AuthError::UserAlreadyExists => "USER_ALREADY_EXISTS",
            AuthError::UserNotFound => "USER_NOT_FOUND",
            AuthError::InvalidCredentials => "INVALID_CREDENTIALS",
            AuthError::PasswordHashError => "PASSWORD_HASH_ERROR",
            AuthError::TokenInvalid => "TOKEN_INVALID",
            AuthError::TokenExpired => "TOKEN_EXPIRED",
            AuthError::AuthorizationUnresolved => "AUTHORIZATION_UNRESOLVED",
            AuthError::Forbidden => "FORBIDDEN",
            AuthError::RequestInFlight => "REQUEST_IN_FLIGHT",
            AuthError::NotFound => "NOT_FOUND",
            AuthError::Validation(_) => "VALIDATION_ERROR",
            AuthError::RoleStore(_) => "ROLE_STORE_ERROR",
            AuthError::DatabaseError(_) => "DATABASE_ERROR",
            AuthError::Internal(_) => "INTERNAL_ERROR",
        };

        let error = match &err {
            AuthError::RoleStore(_)
            | AuthError::DatabaseError(_)
            | AuthError::Internal(_)
            | AuthError::PasswordHashError => RETRY_MESSAGE.to_owned(),
            _ => err.to_string(),
        };

        ErrorResponse {
            error,
            code: code.to_owned(),
        }
    }
}
