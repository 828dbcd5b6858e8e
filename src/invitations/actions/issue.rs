use chrono::Utc;
use serde::Serialize;

use crate::config::invitation_expiry;
use crate::crypto::{generate_code, hash_token};
use crate::events::{dispatch, PorticoEvent};
use crate::inflight::InFlight;
use crate::invitations::{CreateInvitation, Invitation, InvitationRepository};
use crate::roles::{RoleLabel, RoleRepository};
use crate::validators::{normalize_email, validate_email};
use crate::{AuthError, PorticoConfig, SecretString};

/// Result of issuing an invitation. The only place the plain code exists.
#[derive(Debug, Clone, Serialize)]
pub struct IssuedInvitation {
    pub invitation: Invitation,
    pub code: SecretString,
    /// `{base_url}/invite/{code}`, for out-of-band distribution.
    pub link: String,
}

/// Action to create an invitation for an email and a role.
///
/// This action:
/// 1. Validates and normalizes the target email
/// 2. Checks the issuer holds `admin` in the role store
/// 3. Generates a random code and stores only its hash
/// 4. Sets expiry to creation time plus seven days
///
/// No account or role is created.
pub struct IssueInvitationAction<R, I>
where
    R: RoleRepository,
    I: InvitationRepository,
{
    role_repo: R,
    invitation_repo: I,
    config: PorticoConfig,
    in_flight: InFlight,
}

impl<R, I> IssueInvitationAction<R, I>
where
    R: RoleRepository,
    I: InvitationRepository,
{
    pub fn new(role_repo: R, invitation_repo: I, config: PorticoConfig) -> Self {
        Self {
            role_repo,
            invitation_repo,
            config,
            in_flight: InFlight::default(),
        }
    }

    /// # Returns
    ///
    /// - `Ok(issued)` - the stored invitation with its code and link
    /// - `Err(AuthError::Validation(_))` - malformed email
    /// - `Err(AuthError::Forbidden)` - issuer is not an administrator
    /// - `Err(AuthError::InvitationNotCreated)` - the store write failed
    /// - `Err(AuthError::RequestInFlight)` - this action is already running
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "issue_invitation", skip(self, email), err)
    )]
    pub async fn execute(
        &self,
        issuer_id: i64,
        email: &str,
        role: RoleLabel,
    ) -> Result<IssuedInvitation, AuthError> {
        let _guard = self.in_flight.begin()?;

        let email = normalize_email(email);
        validate_email(&email)?;

        let issuer_roles = self.role_repo.list_roles(issuer_id).await?;
        if !issuer_roles.contains(&RoleLabel::Admin) {
            log::warn!(
                target: "portico",
                "msg=\"invitation issue rejected\", issuer_id={issuer_id}"
            );
            return Err(AuthError::Forbidden);
        }

        let code = generate_code(self.config.code_length());
        let created_at = Utc::now();

        let invitation = self
            .invitation_repo
            .create(CreateInvitation {
                email,
                role,
                code_hash: hash_token(&code),
                created_by: issuer_id,
                created_at,
                expires_at: created_at + invitation_expiry(),
            })
            .await
            .map_err(|e| {
                log::error!(
                    target: "portico",
                    "msg=\"invitation not created\", issuer_id={issuer_id}, error=\"{e}\""
                );
                AuthError::InvitationNotCreated
            })?;

        log::info!(
            target: "portico",
            "msg=\"invitation issued\", invitation_id={}, issuer_id={issuer_id}, role=\"{role}\"",
            invitation.id
        );

        dispatch(PorticoEvent::InvitationIssued {
            invitation_id: invitation.id,
            email: invitation.email.clone(),
            role,
            issued_by: issuer_id,
            at: created_at,
        })
        .await;

        let link = self.config.redemption_link(&code);
        Ok(IssuedInvitation {
            invitation,
            code: SecretString::new(code),
            link,
        })
    }
}
