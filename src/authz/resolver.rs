use std::time::Duration;

use chrono::Utc;

use super::context::AuthorizationContext;
use crate::events::{dispatch, PorticoEvent};
use crate::identity::Account;
use crate::roles::RoleRepository;

/// Derives an [`AuthorizationContext`] from the role store.
///
/// Lookup failures and timeouts fail closed: the account is kept, every
/// role flag is false. The failure is logged and never returned.
pub struct AuthorizationResolver<R: RoleRepository> {
    role_repo: R,
    timeout: Duration,
}

impl<R: RoleRepository> AuthorizationResolver<R> {
    pub fn new(role_repo: R, timeout: Duration) -> Self {
        Self { role_repo, timeout }
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self)))]
    pub async fn resolve(&self, account: Option<Account>) -> AuthorizationContext {
        let Some(account) = account else {
            return AuthorizationContext::anonymous();
        };

        let reason = match tokio::time::timeout(self.timeout, self.role_repo.list_roles(account.id))
            .await
        {
            Ok(Ok(labels)) => return AuthorizationContext::resolved(account, &labels),
            Ok(Err(e)) => e.to_string(),
            Err(_) => format!("timed out after {}ms", self.timeout.as_millis()),
        };

        log::warn!(
            target: "portico",
            "msg=\"role lookup failed, no privileged role\", user_id={}, error=\"{reason}\"",
            account.id
        );

        dispatch(PorticoEvent::RoleLookupFailed {
            user_id: account.id,
            reason,
            at: Utc::now(),
        })
        .await;

        AuthorizationContext::fail_closed(account)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roles::{MockRoleRepository, RoleLabel};

    fn account() -> Account {
        Account {
            id: 4,
            email: "a@example.org".to_owned(),
        }
    }

    #[tokio::test]
    async fn test_no_identity() {
        let resolver = AuthorizationResolver::new(MockRoleRepository::new(), Duration::from_secs(1));
        let ctx = resolver.resolve(None).await;
        assert_eq!(ctx, AuthorizationContext::anonymous());
    }

    #[tokio::test]
    async fn test_store_error_fails_closed() {
        let repo = MockRoleRepository::new();
        repo.grant(4, RoleLabel::Admin);
        repo.fail_next(1);
        let resolver = AuthorizationResolver::new(repo, Duration::from_secs(1));

        let ctx = resolver.resolve(Some(account())).await;

        assert!(!ctx.is_loading());
        assert!(!ctx.is_admin());
        assert_eq!(ctx.account(), Some(&account()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_fails_closed() {
        let repo = MockRoleRepository::new();
        repo.grant(4, RoleLabel::Admin);
        repo.set_latency(Some(Duration::from_secs(30)));
        let resolver = AuthorizationResolver::new(repo, Duration::from_secs(5));

        let ctx = resolver.resolve(Some(account())).await;

        assert!(!ctx.is_admin());
        assert!(ctx.account().is_some());
    }
}
