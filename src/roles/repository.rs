use async_trait::async_trait;

use super::types::{RoleAssignment, RoleLabel};
use crate::AuthError;

/// Storage for (account, label) pairs.
///
/// An account may hold several labels. Stores must skip labels they cannot
/// parse instead of failing the whole lookup, so a stray row never locks an
/// administrator out.
#[async_trait]
pub trait RoleRepository: Send + Sync {
    /// Labels held by the account, in no particular order.
    async fn list_roles(&self, user_id: i64) -> Result<Vec<RoleLabel>, AuthError>;

    async fn list_assignments(&self, user_id: i64) -> Result<Vec<RoleAssignment>, AuthError>;

    /// Adds one label. Adding a label the account already holds is a no-op.
    async fn add_role(&self, user_id: i64, role: RoleLabel) -> Result<(), AuthError>;

    /// Replaces every label held by the account in a single step.
    ///
    /// Readers never observe a state between the delete and the insert.
    async fn replace_roles(&self, user_id: i64, roles: &[RoleLabel]) -> Result<(), AuthError>;
}
