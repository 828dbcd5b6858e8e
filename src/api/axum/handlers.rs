//! HTTP handlers for the access and invitation endpoints.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;

use super::error::AppError;
use super::middleware::{AdminOnly, Authorized, SignedIn, VolunteerOnly};
use super::routes::AppState;
use crate::api::{
    AuthorizationResponse, InvitationResponse, IssueInvitationRequest, IssuedInvitationResponse,
    PruneResponse, RedeemInvitationRequest, RedemptionResponse, ReplaceRoleRequest,
    SessionResponse, SignInRequest, UserSummaryResponse, VolunteerDashboardResponse,
};
use crate::identity::{IdentityProvider, LocalIdentityProvider, ProfileAttributes};
use crate::invitations::{
    InvitationRepository, IssueInvitationAction, PreviewInvitationAction, RedeemInvitationAction,
};
use crate::roles::{ReplaceRolesAction, RoleEdit, RoleRepository};
use crate::{AuthError, SecretString, TokenRepository, UserRepository};

fn provider<U, T, R, I>(state: &AppState<U, T, R, I>) -> LocalIdentityProvider<U, T>
where
    U: UserRepository + Clone,
    T: TokenRepository + Clone,
{
    LocalIdentityProvider::new(
        state.user_repo.clone(),
        state.token_repo.clone(),
        &state.config,
    )
}

/// POST /auth/signin
pub async fn sign_in<U, T, R, I>(
    State(state): State<AppState<U, T, R, I>>,
    Json(body): Json<SignInRequest>,
) -> Result<impl IntoResponse, AppError>
where
    U: UserRepository + Clone + Send + Sync + 'static,
    T: TokenRepository + Clone + Send + Sync + 'static,
    R: Clone + Send + Sync + 'static,
    I: Clone + Send + Sync + 'static,
{
    let session = provider(&state)
        .sign_in(&body.email, &body.password)
        .await?;

    Ok((StatusCode::OK, Json(SessionResponse::from(session))))
}

/// POST /auth/signout
pub async fn sign_out<U, T, R, I>(
    State(state): State<AppState<U, T, R, I>>,
    auth: Authorized<SignedIn>,
) -> Result<impl IntoResponse, AppError>
where
    U: UserRepository + Clone + Send + Sync + 'static,
    T: TokenRepository + Clone + Send + Sync + 'static,
    R: RoleRepository + Clone + Send + Sync + 'static,
    I: InvitationRepository + Clone + Send + Sync + 'static,
{
    let provider = provider(&state);
    provider.resume(auth.token()).await?;
    provider.sign_out().await?;

    Ok(StatusCode::NO_CONTENT)
}

/// GET /auth/me
pub async fn me<U, T, R, I>(auth: Authorized<SignedIn>) -> Result<impl IntoResponse, AppError>
where
    U: UserRepository + Clone + Send + Sync + 'static,
    T: TokenRepository + Clone + Send + Sync + 'static,
    R: RoleRepository + Clone + Send + Sync + 'static,
    I: InvitationRepository + Clone + Send + Sync + 'static,
{
    let response = AuthorizationResponse::from_context(auth.context())
        .ok_or(AppError(AuthError::TokenInvalid))?;
    Ok(Json(response))
}

/// GET /invite/{code}
pub async fn preview_invitation<U, T, R, I>(
    State(state): State<AppState<U, T, R, I>>,
    Path(code): Path<String>,
) -> Result<impl IntoResponse, AppError>
where
    U: Clone + Send + Sync + 'static,
    T: Clone + Send + Sync + 'static,
    R: Clone + Send + Sync + 'static,
    I: InvitationRepository + Clone + Send + Sync + 'static,
{
    let action = PreviewInvitationAction::new(state.invitation_repo);
    let preview = action.execute(&SecretString::new(code)).await?;
    Ok(Json(preview))
}

/// POST /invite/{code}
pub async fn redeem_invitation<U, T, R, I>(
    State(state): State<AppState<U, T, R, I>>,
    Path(code): Path<String>,
    Json(body): Json<RedeemInvitationRequest>,
) -> Result<impl IntoResponse, AppError>
where
    U: UserRepository + Clone + Send + Sync + 'static,
    T: TokenRepository + Clone + Send + Sync + 'static,
    R: Clone + Send + Sync + 'static,
    I: InvitationRepository + Clone + Send + Sync + 'static,
{
    let action = RedeemInvitationAction::new(state.invitation_repo.clone(), provider(&state));
    let profile = ProfileAttributes::new(body.first_name, body.last_name);

    let redemption = action
        .execute(&SecretString::new(code), &body.password, &profile)
        .await?;

    Ok((StatusCode::CREATED, Json(RedemptionResponse::from(redemption))))
}

/// POST /admin/invitations
pub async fn issue_invitation<U, T, R, I>(
    State(state): State<AppState<U, T, R, I>>,
    auth: Authorized<AdminOnly>,
    Json(body): Json<IssueInvitationRequest>,
) -> Result<impl IntoResponse, AppError>
where
    U: UserRepository + Clone + Send + Sync + 'static,
    T: TokenRepository + Clone + Send + Sync + 'static,
    R: RoleRepository + Clone + Send + Sync + 'static,
    I: InvitationRepository + Clone + Send + Sync + 'static,
{
    let action = IssueInvitationAction::new(
        state.role_repo,
        state.invitation_repo,
        (*state.config).clone(),
    );
    let issued = action
        .execute(auth.account().id, &body.email, body.role)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(IssuedInvitationResponse::from(issued)),
    ))
}

/// GET /admin/invitations
pub async fn list_invitations<U, T, R, I>(
    State(state): State<AppState<U, T, R, I>>,
    _auth: Authorized<AdminOnly>,
) -> Result<impl IntoResponse, AppError>
where
    U: UserRepository + Clone + Send + Sync + 'static,
    T: TokenRepository + Clone + Send + Sync + 'static,
    R: RoleRepository + Clone + Send + Sync + 'static,
    I: InvitationRepository + Clone + Send + Sync + 'static,
{
    let now = Utc::now();
    let invitations: Vec<InvitationResponse> = state
        .invitation_repo
        .list()
        .await?
        .into_iter()
        .map(|i| InvitationResponse::at(i, now))
        .collect();

    Ok(Json(invitations))
}

/// DELETE /admin/invitations/expired
pub async fn prune_invitations<U, T, R, I>(
    State(state): State<AppState<U, T, R, I>>,
    auth: Authorized<AdminOnly>,
) -> Result<impl IntoResponse, AppError>
where
    U: UserRepository + Clone + Send + Sync + 'static,
    T: TokenRepository + Clone + Send + Sync + 'static,
    R: RoleRepository + Clone + Send + Sync + 'static,
    I: InvitationRepository + Clone + Send + Sync + 'static,
{
    let deleted = state.invitation_repo.delete_expired(Utc::now()).await?;

    log::info!(
        target: "portico",
        "msg=\"expired invitations pruned\", actor_id={}, deleted={deleted}",
        auth.account().id
    );

    Ok(Json(PruneResponse { deleted }))
}

/// GET /admin/users
pub async fn list_users<U, T, R, I>(
    State(state): State<AppState<U, T, R, I>>,
    _auth: Authorized<AdminOnly>,
) -> Result<impl IntoResponse, AppError>
where
    U: UserRepository + Clone + Send + Sync + 'static,
    T: TokenRepository + Clone + Send + Sync + 'static,
    R: RoleRepository + Clone + Send + Sync + 'static,
    I: InvitationRepository + Clone + Send + Sync + 'static,
{
    let users = state.user_repo.list_users().await?;

    let mut summaries = Vec::with_capacity(users.len());
    for user in users {
        let assignments = state.role_repo.list_assignments(user.id).await?;
        summaries.push(UserSummaryResponse::new(user, assignments));
    }

    Ok(Json(summaries))
}

/// PUT /admin/users/{id}/role
pub async fn replace_user_role<U, T, R, I>(
    State(state): State<AppState<U, T, R, I>>,
    auth: Authorized<AdminOnly>,
    Path(user_id): Path<i64>,
    Json(body): Json<ReplaceRoleRequest>,
) -> Result<impl IntoResponse, AppError>
where
    U: UserRepository + Clone + Send + Sync + 'static,
    T: TokenRepository + Clone + Send + Sync + 'static,
    R: RoleRepository + Clone + Send + Sync + 'static,
    I: InvitationRepository + Clone + Send + Sync + 'static,
{
    let user = state
        .user_repo
        .find_user_by_id(user_id)
        .await?
        .ok_or(AppError(AuthError::UserNotFound))?;

    let action = ReplaceRolesAction::new(state.role_repo.clone());
    let mut edit = RoleEdit::propose(user.id, body.role);
    edit.commit(&action, auth.account().id).await?;
    let assignments = state.role_repo.list_assignments(user.id).await?;

    Ok(Json(UserSummaryResponse::new(user, assignments)))
}

/// GET /volunteer/dashboard
pub async fn volunteer_dashboard<U, T, R, I>(
    auth: Authorized<VolunteerOnly>,
) -> Result<impl IntoResponse, AppError>
where
    U: UserRepository + Clone + Send + Sync + 'static,
    T: TokenRepository + Clone + Send + Sync + 'static,
    R: RoleRepository + Clone + Send + Sync + 'static,
    I: InvitationRepository + Clone + Send + Sync + 'static,
{
    let ctx = auth.context();
    Ok(Json(VolunteerDashboardResponse {
        user_id: auth.account().id,
        email: auth.account().email.clone(),
        volunteer_track: ctx.volunteer_track(),
        is_admin: ctx.is_admin(),
    }))
}
