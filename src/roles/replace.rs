use chrono::Utc;

use super::repository::RoleRepository;
use super::types::RoleLabel;
use crate::events::{dispatch, PorticoEvent};
use crate::AuthError;

/// Administrator operation that sets a user's role.
///
/// The previous labels are removed and exactly the new one is stored, so
/// choosing `user` leaves an explicit `user` row. Repeating the call with
/// the same role yields the same final set.
pub struct ReplaceRolesAction<R: RoleRepository> {
    role_repo: R,
}

impl<R: RoleRepository> ReplaceRolesAction<R> {
    pub fn new(role_repo: R) -> Self {
        Self { role_repo }
    }

    /// # Returns
    ///
    /// - `Ok(roles)` - the target's labels after the edit
    /// - `Err(AuthError::Forbidden)` - the actor does not hold `admin`
    /// - `Err(AuthError::RoleStore(_))` / `Err(AuthError::DatabaseError(_))` - store failure
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "replace_roles", skip(self), err)
    )]
    pub async fn execute(
        &self,
        actor_id: i64,
        target_id: i64,
        role: RoleLabel,
    ) -> Result<Vec<RoleLabel>, AuthError> {
        // the gate already checked this; the store is the real boundary
        let actor_roles = self.role_repo.list_roles(actor_id).await?;
        if !actor_roles.contains(&RoleLabel::Admin) {
            log::warn!(
                target: "portico",
                "msg=\"role edit rejected\", actor_id={actor_id}, target_id={target_id}"
            );
            return Err(AuthError::Forbidden);
        }

        let roles = vec![role];
        self.role_repo.replace_roles(target_id, &roles).await?;

        log::info!(
            target: "portico",
            "msg=\"roles replaced\", actor_id={actor_id}, target_id={target_id}, role=\"{role}\""
        );

        dispatch(PorticoEvent::RolesReplaced {
            user_id: target_id,
            roles: roles.clone(),
            changed_by: actor_id,
            at: Utc::now(),
        })
        .await;

        Ok(roles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roles::{MockRoleRepository, VolunteerTrack};

    fn setup() -> (MockRoleRepository, ReplaceRolesAction<MockRoleRepository>) {
        let repo = MockRoleRepository::new();
        repo.grant(1, RoleLabel::Admin);
        let action = ReplaceRolesAction::new(repo.clone());
        (repo, action)
    }

    #[tokio::test]
    async fn test_replace_is_not_a_merge() {
        let (repo, action) = setup();
        repo.grant(7, RoleLabel::Volunteer(VolunteerTrack::Math));
        repo.grant(7, RoleLabel::Volunteer(VolunteerTrack::Ela));

        let roles = action
            .execute(1, 7, RoleLabel::Volunteer(VolunteerTrack::Adlo))
            .await
            .unwrap();

        assert_eq!(roles, vec![RoleLabel::Volunteer(VolunteerTrack::Adlo)]);
        assert_eq!(repo.list_roles(7).await.unwrap(), roles);
    }

    #[tokio::test]
    async fn test_replace_twice_same_result() {
        let (repo, action) = setup();
        action.execute(1, 7, RoleLabel::Admin).await.unwrap();
        let once = repo.list_roles(7).await.unwrap();
        action.execute(1, 7, RoleLabel::Admin).await.unwrap();
        assert_eq!(repo.list_roles(7).await.unwrap(), once);
    }

    #[tokio::test]
    async fn test_choosing_user_stores_explicit_row() {
        let (repo, action) = setup();
        repo.grant(7, RoleLabel::Admin);
        action.execute(1, 7, RoleLabel::User).await.unwrap();
        assert_eq!(repo.list_roles(7).await.unwrap(), vec![RoleLabel::User]);
    }

    #[tokio::test]
    async fn test_non_admin_actor_rejected() {
        let (repo, action) = setup();
        repo.grant(2, RoleLabel::Volunteer(VolunteerTrack::Math));

        let result = action.execute(2, 7, RoleLabel::Admin).await;

        assert_eq!(result, Err(AuthError::Forbidden));
        assert!(repo.list_roles(7).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_store_failure_propagates() {
        let (repo, action) = setup();
        repo.fail_next(1);
        let result = action.execute(1, 7, RoleLabel::User).await;
        assert!(matches!(result, Err(AuthError::RoleStore(_))));
    }
}
