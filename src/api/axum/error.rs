use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::api::ErrorResponse;
use crate::AuthError;

/// converts `AuthError` into HTTP responses
#[derive(Debug)]
pub struct AppError(pub AuthError);

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        Self(err)
    }
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            AuthError::InvalidInvitation | AuthError::NotFound | AuthError::UserNotFound => {
                StatusCode::NOT_FOUND
            }
            AuthError::InvitationExpired => StatusCode::GONE,
            AuthError::InvitationAlreadyUsed
            | AuthError::UserAlreadyExists
            | AuthError::RequestInFlight => StatusCode::CONFLICT,
            AuthError::Validation(_) | AuthError::IdentityProvider(_) => StatusCode::BAD_REQUEST,
            AuthError::InvalidCredentials | AuthError::TokenInvalid | AuthError::TokenExpired => {
                StatusCode::UNAUTHORIZED
            }
            AuthError::Forbidden => StatusCode::FORBIDDEN,
            AuthError::AuthorizationUnresolved | AuthError::RoleStore(_) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            AuthError::InvitationNotCreated
            | AuthError::RoleGrantIncomplete { .. }
            | AuthError::PasswordHashError
            | AuthError::DatabaseError(_)
            | AuthError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        (status, Json(ErrorResponse::from(self.0))).into_response()
    }
}
