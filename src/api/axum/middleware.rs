use std::marker::PhantomData;

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Redirect, Response};

use super::error::AppError;
use super::routes::AppState;
use crate::authz::{
    AccessGate, AccessRequirement, AuthorizationContext, AuthorizationResolver, GateDecision,
    RedirectTarget,
};
use crate::identity::{Account, LocalIdentityProvider};
use crate::invitations::InvitationRepository;
use crate::roles::RoleRepository;
use crate::{AuthError, SecretString, TokenRepository, UserRepository};

pub fn extract_bearer_token(headers: &HeaderMap) -> Option<SecretString> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()
        .and_then(|auth| auth.strip_prefix("Bearer "))
        .filter(|token| !token.is_empty())
        .map(SecretString::from)
}

/// Requirement attached to an [`Authorized`] extractor.
pub trait GatePolicy: Send + Sync + 'static {
    fn requirement() -> AccessRequirement;
}

/// Any signed-in account.
pub struct SignedIn;

pub struct AdminOnly;

/// Any volunteer track, or `admin`.
pub struct VolunteerOnly;

impl GatePolicy for SignedIn {
    fn requirement() -> AccessRequirement {
        AccessRequirement::authenticated()
    }
}

impl GatePolicy for AdminOnly {
    fn requirement() -> AccessRequirement {
        AccessRequirement::admin()
    }
}

impl GatePolicy for VolunteerOnly {
    fn requirement() -> AccessRequirement {
        AccessRequirement::volunteer()
    }
}

/// Rejection of a gated route.
///
/// Denials are a bare `303 See Other` to the sign-in page or home, with no
/// body naming the missing role.
#[derive(Debug)]
pub enum GateRejection {
    Redirect(RedirectTarget),
    Error(AppError),
}

impl IntoResponse for GateRejection {
    fn into_response(self) -> Response {
        match self {
            Self::Redirect(target) => Redirect::to(target.path()).into_response(),
            Self::Error(err) => err.into_response(),
        }
    }
}

/// Resolves the bearer token to an account and its authorization context,
/// then applies the gate for `P`.
pub struct Authorized<P: GatePolicy> {
    account: Account,
    context: AuthorizationContext,
    token: SecretString,
    _policy: PhantomData<P>,
}

impl<P: GatePolicy> Authorized<P> {
    pub fn account(&self) -> &Account {
        &self.account
    }

    pub fn context(&self) -> &AuthorizationContext {
        &self.context
    }

    pub fn token(&self) -> &SecretString {
        &self.token
    }
}

impl<P, U, T, R, I> FromRequestParts<AppState<U, T, R, I>> for Authorized<P>
where
    P: GatePolicy,
    U: UserRepository + Clone + Send + Sync + 'static,
    T: TokenRepository + Clone + Send + Sync + 'static,
    R: RoleRepository + Clone + Send + Sync + 'static,
    I: InvitationRepository + Clone + Send + Sync + 'static,
{
    type Rejection = GateRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState<U, T, R, I>,
    ) -> Result<Self, Self::Rejection> {
        let sign_in = GateRejection::Redirect(RedirectTarget::SignIn);

        let Some(token) = extract_bearer_token(&parts.headers) else {
            return Err(sign_in);
        };

        let provider = LocalIdentityProvider::new(
            state.user_repo.clone(),
            state.token_repo.clone(),
            &state.config,
        );
        let session = match provider.resume(&token).await {
            Ok(session) => session,
            Err(AuthError::TokenInvalid | AuthError::TokenExpired) => return Err(sign_in),
            Err(e) => return Err(GateRejection::Error(AppError(e))),
        };

        let resolver =
            AuthorizationResolver::new(state.role_repo.clone(), state.config.role_lookup_timeout);
        let context = resolver.resolve(Some(session.account.clone())).await;

        match AccessGate::new(P::requirement()).evaluate(&context) {
            GateDecision::Allow => Ok(Self {
                account: session.account,
                context,
                token,
                _policy: PhantomData,
            }),
            GateDecision::Redirect(target) => Err(GateRejection::Redirect(target)),
            GateDecision::Pending => Err(GateRejection::Error(AppError(
                AuthError::AuthorizationUnresolved,
            ))),
        }
    }
}
