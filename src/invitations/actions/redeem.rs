use chrono::Utc;
use serde::Serialize;

use crate::crypto::hash_token;
use crate::events::{dispatch, PorticoEvent};
use crate::identity::{Account, IdentityProvider, ProfileAttributes};
use crate::inflight::InFlight;
use crate::invitations::{Invitation, InvitationRepository};
use crate::roles::RoleLabel;
use crate::validators::{validate_password_present, validate_profile};
use crate::{AuthError, SecretString};

#[derive(Debug, Clone, Serialize)]
pub struct Redemption {
    pub account: Account,
    pub role: RoleLabel,
    pub invitation: Invitation,
    /// False when a resubmission found the account from an earlier attempt.
    pub account_created: bool,
}

/// Action to consume an invitation and create the invited account.
///
/// This action:
/// 1. Looks up the invitation by the hash of the code
/// 2. Rejects invalid, used or expired invitations before any signup
/// 3. Creates the account at the identity provider with the invitation's email
/// 4. Stamps the invitation and grants its role in one store operation
///
/// The redeemer is not signed in afterwards.
///
/// If a previous attempt created the account but failed before the grant,
/// resubmitting with the same password signs in to prove ownership and
/// completes the grant. A grant that fails twice on a transient error, or
/// finds the invitation expired, after the account was created yields
/// `AuthError::RoleGrantIncomplete`; the account is kept.
pub struct RedeemInvitationAction<I, P>
where
    I: InvitationRepository,
    P: IdentityProvider,
{
    invitation_repo: I,
    provider: P,
    in_flight: InFlight,
}

impl<I, P> RedeemInvitationAction<I, P>
where
    I: InvitationRepository,
    P: IdentityProvider,
{
    pub fn new(invitation_repo: I, provider: P) -> Self {
        Self {
            invitation_repo,
            provider,
            in_flight: InFlight::default(),
        }
    }

    /// # Returns
    ///
    /// - `Ok(redemption)` - account exists and holds the invited role
    /// - `Err(AuthError::InvalidInvitation)` - unknown code
    /// - `Err(AuthError::InvitationAlreadyUsed)` - redeemed, possibly by a concurrent attempt
    /// - `Err(AuthError::InvitationExpired)` - past expiry
    /// - `Err(AuthError::IdentityProvider(_))` - signup or credential failure, provider message
    /// - `Err(AuthError::RoleGrantIncomplete { .. })` - account created, role not granted
    /// - `Err(AuthError::RequestInFlight)` - this action is already running
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "redeem_invitation", skip_all, err)
    )]
    pub async fn execute(
        &self,
        code: &SecretString,
        password: &SecretString,
        profile: &ProfileAttributes,
    ) -> Result<Redemption, AuthError> {
        let _guard = self.in_flight.begin()?;

        let code_hash = hash_token(code.expose_secret());
        let invitation = self
            .invitation_repo
            .find_by_code_hash(&code_hash)
            .await?
            .ok_or(AuthError::InvalidInvitation)?;
        invitation.check_redeemable(Utc::now())?;

        validate_profile(profile)?;
        validate_password_present(password)?;

        let (account, account_created) = self
            .create_or_prove_account(&invitation.email, password, profile)
            .await?;

        let redeemed = match self.grant(&code_hash, account.id).await {
            Ok(redeemed) => redeemed,
            Err(e) if account_created && (e.is_transient() || e == AuthError::InvitationExpired) => {
                log::error!(
                    target: "portico",
                    "msg=\"role grant incomplete\", invitation_id={}, account_id={}, error=\"{e}\"",
                    invitation.id,
                    account.id
                );
                return Err(AuthError::RoleGrantIncomplete {
                    account_id: account.id,
                });
            }
            Err(e) => return Err(e),
        };

        log::info!(
            target: "portico",
            "msg=\"invitation redeemed\", invitation_id={}, account_id={}, role=\"{}\"",
            redeemed.id,
            account.id,
            redeemed.role
        );

        dispatch(PorticoEvent::InvitationRedeemed {
            invitation_id: redeemed.id,
            user_id: account.id,
            role: redeemed.role,
            at: Utc::now(),
        })
        .await;

        Ok(Redemption {
            role: redeemed.role,
            account,
            invitation: redeemed,
            account_created,
        })
    }

    async fn create_or_prove_account(
        &self,
        email: &str,
        password: &SecretString,
        profile: &ProfileAttributes,
    ) -> Result<(Account, bool), AuthError> {
        match self.provider.sign_up(email, password, profile).await {
            Ok(account) => Ok((account, true)),
            Err(AuthError::UserAlreadyExists) => {
                let session = self
                    .provider
                    .sign_in(email, password)
                    .await
                    .map_err(|_| {
                        AuthError::IdentityProvider(
                            "An account already exists for this email; sign in to continue"
                                .to_owned(),
                        )
                    })?;
                // proof of ownership only; the redeemer signs in separately
                self.provider.sign_out().await?;
                Ok((session.account, false))
            }
            Err(e) if e.is_transient() => Err(e),
            Err(e) => Err(AuthError::IdentityProvider(e.to_string())),
        }
    }

    /// Redeems with one retry on a transient store error.
    async fn grant(&self, code_hash: &str, account_id: i64) -> Result<Invitation, AuthError> {
        match self
            .invitation_repo
            .redeem(code_hash, account_id, Utc::now())
            .await
        {
            Err(e) if e.is_transient() => {
                log::warn!(
                    target: "portico",
                    "msg=\"retrying role grant\", account_id={account_id}, error=\"{e}\""
                );
                self.invitation_repo
                    .redeem(code_hash, account_id, Utc::now())
                    .await
            }
            other => other,
        }
    }
}
