//! Axum integration.
//!
//! Gated routes take an [`Authorized`] extractor; a denied request gets a
//! `303 See Other` to the sign-in page or home.

mod error;
mod handlers;
mod middleware;
mod routes;

pub use error::AppError;
pub use middleware::{
    extract_bearer_token, AdminOnly, Authorized, GatePolicy, GateRejection, SignedIn,
    VolunteerOnly,
};
pub use routes::{
    admin_routes, invitation_routes, portico_routes, session_routes, volunteer_routes, AppState,
};
