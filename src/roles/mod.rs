//! Role labels, the role store and administrator role edits.

mod edit;
mod replace;
mod repository;
mod types;

#[cfg(any(test, feature = "mocks"))]
mod mocks;

pub use edit::{RoleEdit, RoleEditState};
pub use replace::ReplaceRolesAction;
pub use repository::RoleRepository;
pub use types::{chosen_volunteer_track, primary_role, RoleAssignment, RoleLabel, VolunteerTrack};

#[cfg(any(test, feature = "mocks"))]
pub use mocks::MockRoleRepository;
