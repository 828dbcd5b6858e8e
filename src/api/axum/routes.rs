use std::sync::Arc;

use axum::routing::{delete, get, post, put};
use axum::Router;

use super::handlers;
use crate::invitations::InvitationRepository;
use crate::roles::RoleRepository;
use crate::{PorticoConfig, TokenRepository, UserRepository};

/// Stores shared by every route, plus the configuration.
#[derive(Clone)]
pub struct AppState<U, T, R, I> {
    pub user_repo: U,
    pub token_repo: T,
    pub role_repo: R,
    pub invitation_repo: I,
    pub config: Arc<PorticoConfig>,
}

impl<U, T, R, I> AppState<U, T, R, I> {
    pub fn new(
        user_repo: U,
        token_repo: T,
        role_repo: R,
        invitation_repo: I,
        config: PorticoConfig,
    ) -> Self {
        Self {
            user_repo,
            token_repo,
            role_repo,
            invitation_repo,
            config: Arc::new(config),
        }
    }
}

/// Sign-in, sign-out and the caller's authorization context.
///
/// - `POST /auth/signin`
/// - `POST /auth/signout`
/// - `GET /auth/me`
pub fn session_routes<U, T, R, I>() -> Router<AppState<U, T, R, I>>
where
    U: UserRepository + Clone + Send + Sync + 'static,
    T: TokenRepository + Clone + Send + Sync + 'static,
    R: RoleRepository + Clone + Send + Sync + 'static,
    I: InvitationRepository + Clone + Send + Sync + 'static,
{
    Router::new()
        .route("/auth/signin", post(handlers::sign_in::<U, T, R, I>))
        .route("/auth/signout", post(handlers::sign_out::<U, T, R, I>))
        .route("/auth/me", get(handlers::me::<U, T, R, I>))
}

/// Public redemption page.
///
/// - `GET /invite/{code}`
/// - `POST /invite/{code}`
pub fn invitation_routes<U, T, R, I>() -> Router<AppState<U, T, R, I>>
where
    U: UserRepository + Clone + Send + Sync + 'static,
    T: TokenRepository + Clone + Send + Sync + 'static,
    R: RoleRepository + Clone + Send + Sync + 'static,
    I: InvitationRepository + Clone + Send + Sync + 'static,
{
    Router::new().route(
        "/invite/{code}",
        get(handlers::preview_invitation::<U, T, R, I>)
            .post(handlers::redeem_invitation::<U, T, R, I>),
    )
}

/// Administrator dashboard.
///
/// - `POST /admin/invitations`
/// - `GET /admin/invitations`
/// - `DELETE /admin/invitations/expired`
/// - `GET /admin/users`
/// - `PUT /admin/users/{id}/role`
pub fn admin_routes<U, T, R, I>() -> Router<AppState<U, T, R, I>>
where
    U: UserRepository + Clone + Send + Sync + 'static,
    T: TokenRepository + Clone + Send + Sync + 'static,
    R: RoleRepository + Clone + Send + Sync + 'static,
    I: InvitationRepository + Clone + Send + Sync + 'static,
{
    Router::new()
        .route(
            "/admin/invitations",
            post(handlers::issue_invitation::<U, T, R, I>)
                .get(handlers::list_invitations::<U, T, R, I>),
        )
        .route(
            "/admin/invitations/expired",
            delete(handlers::prune_invitations::<U, T, R, I>),
        )
        .route("/admin/users", get(handlers::list_users::<U, T, R, I>))
        .route(
            "/admin/users/{id}/role",
            put(handlers::replace_user_role::<U, T, R, I>),
        )
}

/// - `GET /volunteer/dashboard`
pub fn volunteer_routes<U, T, R, I>() -> Router<AppState<U, T, R, I>>
where
    U: UserRepository + Clone + Send + Sync + 'static,
    T: TokenRepository + Clone + Send + Sync + 'static,
    R: RoleRepository + Clone + Send + Sync + 'static,
    I: InvitationRepository + Clone + Send + Sync + 'static,
{
    Router::new().route(
        "/volunteer/dashboard",
        get(handlers::volunteer_dashboard::<U, T, R, I>),
    )
}

/// All routes. Call `.with_state(AppState::new(...))` before serving.
///
/// ```rust,ignore
/// let app = portico_routes().with_state(AppState::new(
///     user_repo, token_repo, role_repo, invitation_repo, config,
/// ));
/// ```
pub fn portico_routes<U, T, R, I>() -> Router<AppState<U, T, R, I>>
where
    U: UserRepository + Clone + Send + Sync + 'static,
    T: TokenRepository + Clone + Send + Sync + 'static,
    R: RoleRepository + Clone + Send + Sync + 'static,
    I: InvitationRepository + Clone + Send + Sync + 'static,
{
    Router::new()
        .merge(session_routes())
        .merge(invitation_routes())
        .merge(admin_routes())
        .merge(volunteer_routes())
}
