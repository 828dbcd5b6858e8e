#![allow(clippy::unwrap_used)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;

use super::repository::RoleRepository;
use super::types::{RoleAssignment, RoleLabel};
use crate::AuthError;

/// In-memory role store.
///
/// Clones share state. `fail_next` and `set_latency` simulate an unreliable
/// backend for the resolver and redemption tests.
#[derive(Clone, Default)]
pub struct MockRoleRepository {
    pub assignments: Arc<Mutex<HashMap<i64, Vec<RoleAssignment>>>>,
    failures: Arc<AtomicUsize>,
    latency: Arc<Mutex<Option<Duration>>>,
}

impl MockRoleRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// The next `n` calls fail with `AuthError::RoleStore`.
    pub fn fail_next(&self, n: usize) {
        self.failures.store(n, Ordering::SeqCst);
    }

    /// Every call sleeps for `latency` before touching state.
    pub fn set_latency(&self, latency: Option<Duration>) {
        *self.latency.lock().unwrap() = latency;
    }

    /// Seeds a label without going through the trait.
    pub fn grant(&self, user_id: i64, role: RoleLabel) {
        Self::insert(&mut self.assignments.lock().unwrap(), user_id, role);
    }

    pub(crate) fn insert(
        assignments: &mut HashMap<i64, Vec<RoleAssignment>>,
        user_id: i64,
        role: RoleLabel,
    ) {
        let rows = assignments.entry(user_id).or_default();
        if !rows.iter().any(|a| a.role == role) {
            rows.push(RoleAssignment {
                user_id,
                role,
                created_at: Utc::now(),
            });
        }
    }

    pub(crate) fn take_failure(&self) -> Result<(), AuthError> {
        let took = self
            .failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if took {
            Err(AuthError::RoleStore("simulated failure".to_owned()))
        } else {
            Ok(())
        }
    }

    async fn before_call(&self) -> Result<(), AuthError> {
        let latency = *self.latency.lock().unwrap();
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
        self.take_failure()
    }
}

#[async_trait]
impl RoleRepository for MockRoleRepository {
    async fn list_roles(&self, user_id: i64) -> Result<Vec<RoleLabel>, AuthError> {
        self.before_call().await?;
        let assignments = self.assignments.lock().unwrap();
        Ok(assignments
            .get(&user_id)
            .map(|rows| rows.iter().map(|a| a.role).collect())
            .unwrap_or_default())
    }

    async fn list_assignments(&self, user_id: i64) -> Result<Vec<RoleAssignment>, AuthError> {
        self.before_call().await?;
        let assignments = self.assignments.lock().unwrap();
        Ok(assignments.get(&user_id).cloned().unwrap_or_default())
    }

    async fn add_role(&self, user_id: i64, role: RoleLabel) -> Result<(), AuthError> {
        self.before_call().await?;
        Self::insert(&mut self.assignments.lock().unwrap(), user_id, role);
        Ok(())
    }

    async fn replace_roles(&self, user_id: i64, roles: &[RoleLabel]) -> Result<(), AuthError> {
        self.before_call().await?;
        let mut assignments = self.assignments.lock().unwrap();
        assignments.remove(&user_id);
        for role in roles {
            Self::insert(&mut assignments, user_id, *role);
        }
        drop(assignments);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roles::VolunteerTrack;

    #[tokio::test]
    async fn test_add_role_is_idempotent() {
        let repo = MockRoleRepository::new();
        repo.add_role(1, RoleLabel::Admin).await.unwrap();
        repo.add_role(1, RoleLabel::Admin).await.unwrap();
        assert_eq!(repo.list_roles(1).await.unwrap(), vec![RoleLabel::Admin]);
    }

    #[tokio::test]
    async fn test_replace_roles_removes_previous() {
        let repo = MockRoleRepository::new();
        repo.grant(3, RoleLabel::Admin);
        repo.grant(3, RoleLabel::Volunteer(VolunteerTrack::Math));

        repo.replace_roles(3, &[RoleLabel::User]).await.unwrap();

        assert_eq!(repo.list_roles(3).await.unwrap(), vec![RoleLabel::User]);
    }

    #[tokio::test]
    async fn test_fail_next_counts_down() {
        let repo = MockRoleRepository::new();
        repo.fail_next(2);
        assert!(repo.list_roles(1).await.is_err());
        assert!(repo.list_roles(1).await.is_err());
        assert!(repo.list_roles(1).await.is_ok());
    }
}
