//! HTTP DTOs and, with `axum_support`, the router.

mod types;

pub use types::*;

#[cfg(feature = "axum_support")]
pub mod axum;
