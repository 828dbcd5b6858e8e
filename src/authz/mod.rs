//! Authorization context, its resolution from the role store, and the
//! access gate.

mod context;
mod gate;
mod resolver;
mod session;

pub use context::{AuthorizationContext, RoleFlags};
pub use gate::{AccessGate, AccessRequirement, GateDecision, RedirectTarget, RouteClass};
pub use resolver::AuthorizationResolver;
pub use session::SessionAuthorizer;
