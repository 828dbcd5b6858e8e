use super::repository::RoleRepository;
use super::replace::ReplaceRolesAction;
use super::types::RoleLabel;
use crate::AuthError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleEditState {
    Proposed,
    Committed,
    Cancelled,
}

/// A pending role change for one user, as staged in the admin user list.
///
/// `Proposed` moves to `Committed` on a successful commit or to `Cancelled`
/// on cancel; both are final. A failed commit stays `Proposed` so it can be
/// retried or cancelled.
///
/// ```rust
/// use portico::{RoleEdit, RoleEditState, RoleLabel};
///
/// let mut edit = RoleEdit::propose(42, RoleLabel::Admin);
/// edit.cancel().unwrap();
/// assert_eq!(edit.state(), RoleEditState::Cancelled);
/// assert!(edit.cancel().is_err());
/// ```
#[derive(Debug, Clone)]
pub struct RoleEdit {
    target_id: i64,
    proposed: RoleLabel,
    state: RoleEditState,
}

impl RoleEdit {
    pub fn propose(target_id: i64, role: RoleLabel) -> Self {
        Self {
            target_id,
            proposed: role,
            state: RoleEditState::Proposed,
        }
    }

    pub fn target_id(&self) -> i64 {
        self.target_id
    }

    pub fn proposed(&self) -> RoleLabel {
        self.proposed
    }

    pub fn state(&self) -> RoleEditState {
        self.state
    }

    /// Changes the staged role before committing.
    pub fn revise(&mut self, role: RoleLabel) -> Result<(), AuthError> {
        self.ensure_proposed()?;
        self.proposed = role;
        Ok(())
    }

    pub fn cancel(&mut self) -> Result<(), AuthError> {
        self.ensure_proposed()?;
        self.state = RoleEditState::Cancelled;
        Ok(())
    }

    /// Applies the staged role through `action`.
    ///
    /// Takes `&mut self`, so one edit cannot be committed twice concurrently.
    pub async fn commit<R: RoleRepository>(
        &mut self,
        action: &ReplaceRolesAction<R>,
        actor_id: i64,
    ) -> Result<Vec<RoleLabel>, AuthError> {
        self.ensure_proposed()?;
        let roles = action
            .execute(actor_id, self.target_id, self.proposed)
            .await?;
        self.state = RoleEditState::Committed;
        Ok(roles)
    }

    fn ensure_proposed(&self) -> Result<(), AuthError> {
        match self.state {
            RoleEditState::Proposed => Ok(()),
            RoleEditState::Committed => {
                Err(AuthError::Validation("role edit already committed".to_owned()))
            }
            RoleEditState::Cancelled => {
                Err(AuthError::Validation("role edit was cancelled".to_owned()))
            }
        }
    }
}
