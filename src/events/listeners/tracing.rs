use async_trait::async_trait;

use crate::events::{Listener, PorticoEvent};

/// Emits each event as a `tracing` event under the `portico::events` target.
pub struct TracingListener;

#[async_trait]
impl Listener for TracingListener {
    async fn handle(&self, event: &PorticoEvent) {
        tracing::info!(
            target: "portico::events",
            event_name = event.name(),
            ?event,
            "access event"
        );
    }
}
