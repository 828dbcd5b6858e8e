use serde::Serialize;
use tokio::sync::watch;

use super::context::AuthorizationContext;

/// Role requirements of a protected region. Every gated region requires an
/// identity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AccessRequirement {
    pub require_admin: bool,
    /// Satisfied by any volunteer track and also by `admin`.
    pub require_volunteer: bool,
}

impl AccessRequirement {
    pub fn authenticated() -> Self {
        Self::default()
    }

    pub fn admin() -> Self {
        Self {
            require_admin: true,
            require_volunteer: false,
        }
    }

    pub fn volunteer() -> Self {
        Self {
            require_admin: false,
            require_volunteer: true,
        }
    }

    fn needs_roles(&self) -> bool {
        self.require_admin || self.require_volunteer
    }
}

/// Where a denied visitor is sent. The target is the only signal; no
/// reason accompanies it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RedirectTarget {
    SignIn,
    Home,
}

impl RedirectTarget {
    pub fn path(&self) -> &'static str {
        match self {
            Self::SignIn => "/auth",
            Self::Home => "/",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    /// Not yet known; render nothing privileged.
    Pending,
    Redirect(RedirectTarget),
    Allow,
}

/// Guard for a protected region.
///
/// ```rust
/// use portico::{AccessGate, AccessRequirement, AuthorizationContext, GateDecision, RedirectTarget};
///
/// let gate = AccessGate::new(AccessRequirement::admin());
/// assert_eq!(
///     gate.evaluate(&AuthorizationContext::anonymous()),
///     GateDecision::Redirect(RedirectTarget::SignIn)
/// );
/// ```
#[derive(Debug, Clone, Copy)]
pub struct AccessGate {
    requirement: AccessRequirement,
}

impl AccessGate {
    pub fn new(requirement: AccessRequirement) -> Self {
        Self { requirement }
    }

    pub fn requirement(&self) -> AccessRequirement {
        self.requirement
    }

    pub fn evaluate(&self, ctx: &AuthorizationContext) -> GateDecision {
        if ctx.account().is_none() {
            return if ctx.is_loading() {
                GateDecision::Pending
            } else {
                GateDecision::Redirect(RedirectTarget::SignIn)
            };
        }

        if !self.requirement.needs_roles() {
            return GateDecision::Allow;
        }
        if ctx.is_loading() {
            return GateDecision::Pending;
        }

        if self.requirement.require_admin && !ctx.is_admin() {
            return GateDecision::Redirect(RedirectTarget::Home);
        }
        if self.requirement.require_volunteer && !(ctx.is_volunteer() || ctx.is_admin()) {
            return GateDecision::Redirect(RedirectTarget::Home);
        }

        GateDecision::Allow
    }

    /// Waits for the first decision that is not `Pending`.
    ///
    /// If the context stream closes while pending, the visitor is sent to
    /// sign in.
    pub async fn wait(&self, contexts: &mut watch::Receiver<AuthorizationContext>) -> GateDecision {
        match contexts
            .wait_for(|ctx| self.evaluate(ctx) != GateDecision::Pending)
            .await
        {
            Ok(ctx) => self.evaluate(&ctx),
            Err(_) => GateDecision::Redirect(RedirectTarget::SignIn),
        }
    }
}

/// Route classes and their requirements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteClass {
    AdminDashboard,
    VolunteerDashboard,
    /// Public; content depends on the invitation's validity.
    InvitationRedemption,
    Public,
}

impl RouteClass {
    /// `None` for routes open to everyone.
    pub fn requirement(&self) -> Option<AccessRequirement> {
        match self {
            Self::AdminDashboard => Some(AccessRequirement::admin()),
            Self::VolunteerDashboard => Some(AccessRequirement::volunteer()),
            Self::InvitationRedemption | Self::Public => None,
        }
    }

    pub fn gate(&self) -> Option<AccessGate> {
        self.requirement().map(AccessGate::new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::Account;
    use crate::roles::{RoleLabel, VolunteerTrack};

    fn account() -> Account {
        Account {
            id: 1,
            email: "a@example.org".to_owned(),
        }
    }

    #[test]
    fn test_admin_passes_volunteer_gate() {
        let ctx = AuthorizationContext::resolved(account(), &[RoleLabel::Admin]);
        let gate = AccessGate::new(AccessRequirement::volunteer());
        assert_eq!(gate.evaluate(&ctx), GateDecision::Allow);
    }

    #[test]
    fn test_volunteer_denied_admin_gate() {
        let ctx = AuthorizationContext::resolved(
            account(),
            &[RoleLabel::Volunteer(VolunteerTrack::Adlo)],
        );
        assert_eq!(
            AccessGate::new(AccessRequirement::admin()).evaluate(&ctx),
            GateDecision::Redirect(RedirectTarget::Home)
        );
        assert_eq!(
            AccessGate::new(AccessRequirement::volunteer()).evaluate(&ctx),
            GateDecision::Allow
        );
    }

    #[test]
    fn test_no_identity_redirects_to_sign_in() {
        for requirement in [
            AccessRequirement::authenticated(),
            AccessRequirement::admin(),
            AccessRequirement::volunteer(),
        ] {
            assert_eq!(
                AccessGate::new(requirement).evaluate(&AuthorizationContext::anonymous()),
                GateDecision::Redirect(RedirectTarget::SignIn)
            );
        }
    }

    #[test]
    fn test_loading_is_pending_not_denied() {
        let gate = AccessGate::new(AccessRequirement::admin());
        assert_eq!(
            gate.evaluate(&AuthorizationContext::initial()),
            GateDecision::Pending
        );
        assert_eq!(
            gate.evaluate(&AuthorizationContext::roles_pending(account())),
            GateDecision::Pending
        );
    }

    #[test]
    fn test_authenticated_only_does_not_wait_for_roles() {
        let gate = AccessGate::new(AccessRequirement::authenticated());
        assert_eq!(
            gate.evaluate(&AuthorizationContext::roles_pending(account())),
            GateDecision::Allow
        );
    }

    #[test]
    fn test_no_roles_sent_home() {
        let ctx = AuthorizationContext::resolved(account(), &[]);
        assert_eq!(
            RouteClass::AdminDashboard.gate().unwrap().evaluate(&ctx),
            GateDecision::Redirect(RedirectTarget::Home)
        );
    }

    #[test]
    fn test_route_table() {
        assert_eq!(
            RouteClass::AdminDashboard.requirement(),
            Some(AccessRequirement::admin())
        );
        assert_eq!(
            RouteClass::VolunteerDashboard.requirement(),
            Some(AccessRequirement::volunteer())
        );
        assert!(RouteClass::InvitationRedemption.gate().is_none());
        assert!(RouteClass::Public.gate().is_none());
    }

    #[tokio::test]
    async fn test_wait_skips_pending() {
        let (tx, mut rx) = watch::channel(AuthorizationContext::roles_pending(account()));
        let gate = AccessGate::new(AccessRequirement::admin());

        let waiter = tokio::spawn(async move { gate.wait(&mut rx).await });
        tx.send_replace(AuthorizationContext::resolved(account(), &[RoleLabel::Admin]));

        assert_eq!(waiter.await.unwrap(), GateDecision::Allow);
    }
}
