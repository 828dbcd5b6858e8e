use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;

use super::context::AuthorizationContext;
use super::resolver::AuthorizationResolver;
use crate::identity::Session;
use crate::roles::RoleRepository;

/// Keeps an [`AuthorizationContext`] in step with a session stream.
///
/// For every session change it first publishes the identity with roles
/// pending, then the resolved context. A resolution that finishes after a
/// newer session arrived is discarded, so roles never leak from one account
/// to the next. Sign-out publishes the anonymous context without a lookup,
/// even while a lookup for the previous account is still outstanding.
///
/// The background task stops when the authorizer is dropped.
pub struct SessionAuthorizer {
    context: watch::Receiver<AuthorizationContext>,
    task: JoinHandle<()>,
}

impl SessionAuthorizer {
    pub fn spawn<R>(
        resolver: Arc<AuthorizationResolver<R>>,
        mut sessions: watch::Receiver<Option<Session>>,
    ) -> Self
    where
        R: RoleRepository + 'static,
    {
        let (tx, context) = watch::channel(AuthorizationContext::initial());

        let task = tokio::spawn(async move {
            loop {
                let account = sessions
                    .borrow_and_update()
                    .as_ref()
                    .map(|s| s.account.clone());

                match account {
                    None => {
                        tx.send_replace(AuthorizationContext::anonymous());
                    }
                    Some(account) => {
                        tx.send_replace(AuthorizationContext::roles_pending(account.clone()));

                        // a session change abandons the lookup
                        tokio::select! {
                            resolved = resolver.resolve(Some(account.clone())) => {
                                if !matches!(sessions.has_changed(), Ok(true)) {
                                    tx.send_replace(resolved);
                                }
                            }
                            changed = sessions.changed() => {
                                if changed.is_ok() {
                                    continue;
                                }
                                tx.send_replace(resolver.resolve(Some(account)).await);
                                break;
                            }
                        }
                    }
                }

                if sessions.changed().await.is_err() {
                    break;
                }
            }
        });

        Self { context, task }
    }

    pub fn current(&self) -> AuthorizationContext {
        self.context.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<AuthorizationContext> {
        self.context.clone()
    }

    /// Waits until the current identity's roles are known.
    pub async fn settled(&self) -> AuthorizationContext {
        let mut rx = self.context.clone();
        let settled = match rx.wait_for(|ctx| !ctx.is_loading()).await {
            Ok(ctx) => ctx.clone(),
            Err(_) => self.current(),
        };
        settled
    }
}

impl Drop for SessionAuthorizer {
    fn drop(&mut self) {
        self.task.abort();
    }
}
