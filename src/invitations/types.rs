use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::roles::RoleLabel;
use crate::AuthError;

/// Derived state of an invitation at a point in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InvitationStatus {
    Pending,
    Expired,
    Redeemed,
}

/// A single-use, expiring pre-authorization of `role` for `email`.
///
/// Only the SHA-256 hash of the code is kept; the plain code exists once, in
/// the [`IssuedInvitation`](super::IssuedInvitation) handed to the issuer.
#[derive(Debug, Clone, Serialize)]
pub struct Invitation {
    pub id: i64,
    pub email: String,
    pub role: RoleLabel,
    #[serde(skip_serializing)]
    pub code_hash: String,
    pub created_by: i64,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub redeemed_at: Option<DateTime<Utc>>,
    pub redeemed_by: Option<i64>,
}

impl Invitation {
    pub fn is_redeemed(&self) -> bool {
        self.redeemed_at.is_some()
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }

    /// Exactly one status holds for any `now`. A redeemed invitation stays
    /// `Redeemed` after its expiry passes.
    pub fn status_at(&self, now: DateTime<Utc>) -> InvitationStatus {
        if self.is_redeemed() {
            InvitationStatus::Redeemed
        } else if self.is_expired_at(now) {
            InvitationStatus::Expired
        } else {
            InvitationStatus::Pending
        }
    }

    /// Maps a non-pending status to the error shown to the redeemer.
    pub fn check_redeemable(&self, now: DateTime<Utc>) -> Result<(), AuthError> {
        match self.status_at(now) {
            InvitationStatus::Pending => Ok(()),
            InvitationStatus::Redeemed => Err(AuthError::InvitationAlreadyUsed),
            InvitationStatus::Expired => Err(AuthError::InvitationExpired),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CreateInvitation {
    pub email: String,
    pub role: RoleLabel,
    pub code_hash: String,
    pub created_by: i64,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    fn invitation(expires_in: Duration, redeemed: bool) -> Invitation {
        let now = Utc::now();
        Invitation {
            id: 1,
            email: "new@example.org".to_owned(),
            role: RoleLabel::Admin,
            code_hash: "hash".to_owned(),
            created_by: 1,
            created_at: now,
            expires_at: now + expires_in,
            redeemed_at: redeemed.then_some(now),
            redeemed_by: redeemed.then_some(2),
        }
    }

    #[test]
    fn test_status_derivation() {
        let now = Utc::now();
        assert_eq!(
            invitation(Duration::days(7), false).status_at(now),
            InvitationStatus::Pending
        );
        assert_eq!(
            invitation(Duration::seconds(-1), false).status_at(now),
            InvitationStatus::Expired
        );
        assert_eq!(
            invitation(Duration::days(7), true).status_at(now),
            InvitationStatus::Redeemed
        );
    }

    #[test]
    fn test_redeemed_wins_over_expired() {
        let inv = invitation(Duration::seconds(-1), true);
        assert_eq!(inv.status_at(Utc::now()), InvitationStatus::Redeemed);
        assert_eq!(
            inv.check_redeemable(Utc::now()),
            Err(AuthError::InvitationAlreadyUsed)
        );
    }

    #[test]
    fn test_expiry_boundary_is_expired() {
        let inv = invitation(Duration::days(7), false);
        assert_eq!(inv.status_at(inv.expires_at), InvitationStatus::Expired);
    }

    #[test]
    fn test_code_hash_not_serialized() {
        let json = serde_json::to_value(invitation(Duration::days(1), false)).unwrap();
        assert!(json.get("code_hash").is_none());
        assert_eq!(json["role"], "admin");
    }
}
