use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::types::{CreateInvitation, Invitation};
use crate::AuthError;

#[async_trait]
pub trait InvitationRepository: Send + Sync {
    async fn create(&self, data: CreateInvitation) -> Result<Invitation, AuthError>;

    async fn find_by_code_hash(&self, code_hash: &str) -> Result<Option<Invitation>, AuthError>;

    /// All invitations, newest first.
    async fn list(&self) -> Result<Vec<Invitation>, AuthError>;

    /// Consumes the invitation for `account_id` and grants its role.
    ///
    /// Implementations perform the validity check, the redeemed stamp and
    /// the role insert as one indivisible step: of two concurrent calls for
    /// the same code, exactly one succeeds and the other returns
    /// `AuthError::InvitationAlreadyUsed`. If the role insert fails nothing
    /// is stamped.
    ///
    /// # Errors
    ///
    /// - `AuthError::InvalidInvitation` - no invitation has this hash
    /// - `AuthError::InvitationAlreadyUsed` - already stamped
    /// - `AuthError::InvitationExpired` - `expires_at <= now`
    async fn redeem(
        &self,
        code_hash: &str,
        account_id: i64,
        now: DateTime<Utc>,
    ) -> Result<Invitation, AuthError>;

    /// Removes expired invitations that were never redeemed.
    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<u64, AuthError>;
}
