use async_trait::async_trait;

use super::PorticoEvent;

/// Receives every dispatched event; filter by matching on the variant.
///
/// ```rust,ignore
/// use portico::events::{Listener, PorticoEvent};
/// use async_trait::async_trait;
///
/// struct InvitationAudit;
///
/// #[async_trait]
/// impl Listener for InvitationAudit {
///     async fn handle(&self, event: &PorticoEvent) {
///         if let PorticoEvent::InvitationRedeemed { invitation_id, user_id, .. } = event {
///             // append to an audit table
///         }
///     }
/// }
/// ```
#[async_trait]
pub trait Listener: Send + Sync + 'static {
    async fn handle(&self, event: &PorticoEvent);
}
