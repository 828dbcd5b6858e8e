use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::crypto::hash_token;
use crate::invitations::InvitationRepository;
use crate::roles::RoleLabel;
use crate::{AuthError, SecretString};

/// What the redemption page shows before signup.
#[derive(Debug, Clone, Serialize)]
pub struct InvitationPreview {
    pub email: String,
    pub role: RoleLabel,
    pub role_display: &'static str,
    pub expires_at: DateTime<Utc>,
}

/// Loads an invitation by its plain code for the public redemption page.
///
/// Fails with the same reasons as redemption, so a dead link is reported
/// before the visitor fills in the form.
pub struct PreviewInvitationAction<I: InvitationRepository> {
    invitation_repo: I,
}

impl<I: InvitationRepository> PreviewInvitationAction<I> {
    pub fn new(invitation_repo: I) -> Self {
        Self { invitation_repo }
    }

    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "preview_invitation", skip_all, err)
    )]
    pub async fn execute(&self, code: &SecretString) -> Result<InvitationPreview, AuthError> {
        let invitation = self
            .invitation_repo
            .find_by_code_hash(&hash_token(code.expose_secret()))
            .await?
            .ok_or(AuthError::InvalidInvitation)?;

        invitation.check_redeemable(Utc::now())?;

        Ok(InvitationPreview {
            email: invitation.email,
            role: invitation.role,
            role_display: invitation.role.display_name(),
            expires_at: invitation.expires_at,
        })
    }
}
