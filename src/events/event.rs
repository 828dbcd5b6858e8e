use chrono::{DateTime, Utc};

use crate::roles::RoleLabel;

/// Domain events fired by the access layer.
///
/// Dispatch is a no-op until listeners are registered with
/// [`register_event_listeners`](crate::register_event_listeners).
#[derive(Debug, Clone)]
pub enum PorticoEvent {
    // identity
    AccountRegistered {
        user_id: i64,
        email: String,
        at: DateTime<Utc>,
    },
    SignedIn {
        user_id: i64,
        at: DateTime<Utc>,
    },
    SignedOut {
        user_id: i64,
        at: DateTime<Utc>,
    },
    SessionRefreshed {
        user_id: i64,
        at: DateTime<Utc>,
    },

    // invitations
    InvitationIssued {
        invitation_id: i64,
        email: String,
        role: RoleLabel,
        issued_by: i64,
        at: DateTime<Utc>,
    },
    InvitationRedeemed {
        invitation_id: i64,
        user_id: i64,
        role: RoleLabel,
        at: DateTime<Utc>,
    },

    // roles
    RolesReplaced {
        user_id: i64,
        roles: Vec<RoleLabel>,
        changed_by: i64,
        at: DateTime<Utc>,
    },
    RoleLookupFailed {
        user_id: i64,
        reason: String,
        at: DateTime<Utc>,
    },
}

impl PorticoEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::AccountRegistered { .. } => "identity.account.registered",
            Self::SignedIn { .. } => "identity.session.signed_in",
            Self::SignedOut { .. } => "identity.session.signed_out",
            Self::SessionRefreshed { .. } => "identity.session.refreshed",
            Self::InvitationIssued { .. } => "invitation.issued",
            Self::InvitationRedeemed { .. } => "invitation.redeemed",
            Self::RolesReplaced { .. } => "roles.replaced",
            Self::RoleLookupFailed { .. } => "roles.lookup_failed",
        }
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            Self::AccountRegistered { at, .. }
            | Self::SignedIn { at, .. }
            | Self::SignedOut { at, .. }
            | Self::SessionRefreshed { at, .. }
            | Self::InvitationIssued { at, .. }
            | Self::InvitationRedeemed { at, .. }
            | Self::RolesReplaced { at, .. }
            | Self::RoleLookupFailed { at, .. } => *at,
        }
    }
}
