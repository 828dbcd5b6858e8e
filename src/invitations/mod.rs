//! Single-use, expiring invitations that pre-authorize a role for an email.
//!
//! Codes are 24 random alphanumeric characters by default and are stored
//! hashed. An invitation is redeemable for seven days after creation.

mod actions;
mod repository;
mod types;

#[cfg(any(test, feature = "mocks"))]
mod mocks;

pub use actions::{
    InvitationPreview, IssueInvitationAction, IssuedInvitation, PreviewInvitationAction,
    RedeemInvitationAction, Redemption,
};
pub use repository::InvitationRepository;
pub use types::{CreateInvitation, Invitation, InvitationStatus};

#[cfg(any(test, feature = "mocks"))]
pub use mocks::MockInvitationRepository;
