use serde::Serialize;

use crate::identity::Account;
use crate::roles::{chosen_volunteer_track, RoleLabel, VolunteerTrack};

/// Role flags derived from a set of labels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RoleFlags {
    pub is_admin: bool,
    pub is_volunteer: bool,
    pub volunteer_track: Option<VolunteerTrack>,
}

impl RoleFlags {
    /// Duplicates and `user` rows have no effect.
    pub fn from_labels(labels: &[RoleLabel]) -> Self {
        let volunteer_track = chosen_volunteer_track(labels);
        Self {
            is_admin: labels.contains(&RoleLabel::Admin),
            is_volunteer: volunteer_track.is_some(),
            volunteer_track,
        }
    }
}

/// Who is signed in and what they may do, as last resolved.
///
/// A derived view: it is rebuilt from the role store on every identity
/// change and the stores still enforce their own checks. While `loading`
/// every flag reads false.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthorizationContext {
    account: Option<Account>,
    loading: bool,
    flags: RoleFlags,
}

impl AuthorizationContext {
    /// Before the provider has reported whether anyone is signed in.
    pub fn initial() -> Self {
        Self {
            account: None,
            loading: true,
            flags: RoleFlags::default(),
        }
    }

    pub fn anonymous() -> Self {
        Self {
            account: None,
            loading: false,
            flags: RoleFlags::default(),
        }
    }

    /// Identity known, role lookup outstanding.
    pub fn roles_pending(account: Account) -> Self {
        Self {
            account: Some(account),
            loading: true,
            flags: RoleFlags::default(),
        }
    }

    pub fn resolved(account: Account, labels: &[RoleLabel]) -> Self {
        Self {
            account: Some(account),
            loading: false,
            flags: RoleFlags::from_labels(labels),
        }
    }

    /// Signed in, no privileged role. Used when the lookup fails.
    pub fn fail_closed(account: Account) -> Self {
        Self::resolved(account, &[])
    }

    pub fn account(&self) -> Option<&Account> {
        self.account.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn is_admin(&self) -> bool {
        !self.loading && self.flags.is_admin
    }

    pub fn is_volunteer(&self) -> bool {
        !self.loading && self.flags.is_volunteer
    }

    pub fn volunteer_track(&self) -> Option<VolunteerTrack> {
        if self.loading {
            None
        } else {
            self.flags.volunteer_track
        }
    }

    pub fn flags(&self) -> RoleFlags {
        RoleFlags {
            is_admin: self.is_admin(),
            is_volunteer: self.is_volunteer(),
            volunteer_track: self.volunteer_track(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account() -> Account {
        Account {
            id: 1,
            email: "a@example.org".to_owned(),
        }
    }

    #[test]
    fn test_admin_only_is_not_volunteer() {
        let ctx = AuthorizationContext::resolved(account(), &[RoleLabel::Admin]);
        assert!(ctx.is_admin());
        assert!(!ctx.is_volunteer());
        assert_eq!(ctx.volunteer_track(), None);
    }

    #[test]
    fn test_volunteer_math() {
        let ctx = AuthorizationContext::resolved(
            account(),
            &[RoleLabel::Volunteer(VolunteerTrack::Math)],
        );
        assert!(ctx.is_volunteer());
        assert!(!ctx.is_admin());
        assert_eq!(ctx.volunteer_track().map(|t| t.as_str()), Some("math"));
    }

    #[test]
    fn test_duplicates_tolerated() {
        let flags = RoleFlags::from_labels(&[
            RoleLabel::Admin,
            RoleLabel::Admin,
            RoleLabel::User,
        ]);
        assert_eq!(flags, RoleFlags::from_labels(&[RoleLabel::Admin]));
    }

    #[test]
    fn test_loading_reads_false() {
        let ctx = AuthorizationContext::roles_pending(account());
        assert!(ctx.is_loading());
        assert!(ctx.account().is_some());
        assert_eq!(ctx.flags(), RoleFlags::default());
    }

    #[test]
    fn test_anonymous_has_no_flags() {
        let ctx = AuthorizationContext::anonymous();
        assert!(!ctx.is_loading());
        assert!(!ctx.is_admin());
        assert!(!ctx.is_volunteer());
    }
}
