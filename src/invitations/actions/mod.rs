mod issue;
mod preview;
mod redeem;

pub use issue::{IssueInvitationAction, IssuedInvitation};
pub use preview::{InvitationPreview, PreviewInvitationAction};
pub use redeem::{RedeemInvitationAction, Redemption};
