//! Identity provider contract and a store-backed implementation.

mod local;
mod provider;
mod types;

pub use local::LocalIdentityProvider;
pub use provider::IdentityProvider;
pub use types::{Account, ProfileAttributes, Session};
