#![allow(clippy::unwrap_used)]

use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::repository::InvitationRepository;
use super::types::{CreateInvitation, Invitation};
use crate::roles::MockRoleRepository;
use crate::AuthError;

/// In-memory invitation store sharing state with a [`MockRoleRepository`],
/// so a redemption stamps the invitation and grants the role under one lock.
#[derive(Clone)]
pub struct MockInvitationRepository {
    pub invitations: Arc<Mutex<Vec<Invitation>>>,
    roles: MockRoleRepository,
    next_id: Arc<AtomicI64>,
    redeem_failures: Arc<AtomicUsize>,
}

impl MockInvitationRepository {
    pub fn new(roles: MockRoleRepository) -> Self {
        Self {
            invitations: Arc::new(Mutex::new(vec![])),
            roles,
            next_id: Arc::new(AtomicI64::new(1)),
            redeem_failures: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// The next `n` redemptions fail with `AuthError::DatabaseError` before
    /// touching state.
    pub fn fail_next_redeems(&self, n: usize) {
        self.redeem_failures.store(n, Ordering::SeqCst);
    }

    fn take_redeem_failure(&self) -> Result<(), AuthError> {
        let took = self
            .redeem_failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if took {
            Err(AuthError::DatabaseError("simulated failure".to_owned()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl InvitationRepository for MockInvitationRepository {
    async fn create(&self, data: CreateInvitation) -> Result<Invitation, AuthError> {
        let invitation = Invitation {
            id: self.next_id.fetch_add(1, Ordering::SeqCst),
            email: data.email,
            role: data.role,
            code_hash: data.code_hash,
            created_by: data.created_by,
            created_at: data.created_at,
            expires_at: data.expires_at,
            redeemed_at: None,
            redeemed_by: None,
        };

        let mut invitations = self.invitations.lock().unwrap();
        invitations.push(invitation.clone());
        drop(invitations);

        Ok(invitation)
    }

    async fn find_by_code_hash(&self, code_hash: &str) -> Result<Option<Invitation>, AuthError> {
        let invitations = self.invitations.lock().unwrap();
        Ok(invitations
            .iter()
            .find(|i| i.code_hash == code_hash)
            .cloned())
    }

    async fn list(&self) -> Result<Vec<Invitation>, AuthError> {
        let mut invitations = self.invitations.lock().unwrap().clone();
        invitations.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(invitations)
    }

    async fn redeem(
        &self,
        code_hash: &str,
        account_id: i64,
        now: DateTime<Utc>,
    ) -> Result<Invitation, AuthError> {
        self.take_redeem_failure()?;

        let mut invitations = self.invitations.lock().unwrap();
        let invitation = invitations
            .iter_mut()
            .find(|i| i.code_hash == code_hash)
            .ok_or(AuthError::InvalidInvitation)?;
        invitation.check_redeemable(now)?;

        // role insert first: a failed grant leaves the invitation unstamped
        self.roles.take_failure()?;
        MockRoleRepository::insert(
            &mut self.roles.assignments.lock().unwrap(),
            account_id,
            invitation.role,
        );

        invitation.redeemed_at = Some(now);
        invitation.redeemed_by = Some(account_id);
        let redeemed = invitation.clone();
        drop(invitations);

        Ok(redeemed)
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<u64, AuthError> {
        let mut invitations = self.invitations.lock().unwrap();
        let before = invitations.len();
        invitations.retain(|i| i.is_redeemed() || !i.is_expired_at(now));
        let removed = before - invitations.len();
        drop(invitations);
        Ok(removed as u64)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;
    use crate::roles::{RoleLabel, RoleRepository, VolunteerTrack};

    fn create_data(code_hash: &str, expires_in: Duration) -> CreateInvitation {
        let now = Utc::now();
        CreateInvitation {
            email: "new@example.org".to_owned(),
            role: RoleLabel::Volunteer(VolunteerTrack::Ela),
            code_hash: code_hash.to_owned(),
            created_by: 1,
            created_at: now,
            expires_at: now + expires_in,
        }
    }

    #[tokio::test]
    async fn test_redeem_stamps_and_grants() {
        let roles = MockRoleRepository::new();
        let repo = MockInvitationRepository::new(roles.clone());
        repo.create(create_data("h1", Duration::days(7))).await.unwrap();

        let redeemed = repo.redeem("h1", 9, Utc::now()).await.unwrap();

        assert_eq!(redeemed.redeemed_by, Some(9));
        assert_eq!(
            roles.list_roles(9).await.unwrap(),
            vec![RoleLabel::Volunteer(VolunteerTrack::Ela)]
        );
        assert_eq!(
            repo.redeem("h1", 9, Utc::now()).await.unwrap_err(),
            AuthError::InvitationAlreadyUsed
        );
    }

    #[tokio::test]
    async fn test_failed_grant_leaves_invitation_unstamped() {
        let roles = MockRoleRepository::new();
        let repo = MockInvitationRepository::new(roles.clone());
        repo.create(create_data("h1", Duration::days(7))).await.unwrap();

        roles.fail_next(1);
        assert!(repo.redeem("h1", 9, Utc::now()).await.is_err());

        let stored = repo.find_by_code_hash("h1").await.unwrap().unwrap();
        assert!(!stored.is_redeemed());
        assert!(roles.list_roles(9).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_and_expired() {
        let repo = MockInvitationRepository::new(MockRoleRepository::new());
        repo.create(create_data("old", Duration::seconds(-1))).await.unwrap();

        assert_eq!(
            repo.redeem("nope", 1, Utc::now()).await.unwrap_err(),
            AuthError::InvalidInvitation
        );
        assert_eq!(
            repo.redeem("old", 1, Utc::now()).await.unwrap_err(),
            AuthError::InvitationExpired
        );
    }

    #[tokio::test]
    async fn test_delete_expired_keeps_redeemed() {
        let repo = MockInvitationRepository::new(MockRoleRepository::new());
        repo.create(create_data("old", Duration::seconds(-1))).await.unwrap();
        repo.create(create_data("live", Duration::days(1))).await.unwrap();
        repo.create(create_data("used", Duration::days(1))).await.unwrap();
        repo.redeem("used", 3, Utc::now()).await.unwrap();

        let removed = repo.delete_expired(Utc::now()).await.unwrap();

        assert_eq!(removed, 1);
        let mut left: Vec<String> = repo
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|i| i.code_hash)
            .collect();
        left.sort();
        assert_eq!(left, vec!["live".to_owned(), "used".to_owned()]);
    }
}
