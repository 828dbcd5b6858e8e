use async_trait::async_trait;

use crate::events::{Listener, PorticoEvent};

/// Writes every event through the `log` facade.
pub struct LoggingListener {
    level: log::Level,
}

impl LoggingListener {
    pub fn new() -> Self {
        Self {
            level: log::Level::Info,
        }
    }

    pub fn with_level(level: log::Level) -> Self {
        Self { level }
    }
}

impl Default for LoggingListener {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Listener for LoggingListener {
    async fn handle(&self, event: &PorticoEvent) {
        log::log!(
            target: "portico::events",
            self.level,
            "event={} {:?}",
            event.name(),
            event
        );
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::roles::RoleLabel;

    #[test]
    fn test_logging_listener_levels() {
        assert_eq!(LoggingListener::default().level, log::Level::Info);
        assert_eq!(
            LoggingListener::with_level(log::Level::Debug).level,
            log::Level::Debug
        );
    }

    #[tokio::test]
    async fn test_logging_listener_handle() {
        let listener = LoggingListener::new();
        listener
            .handle(&PorticoEvent::InvitationRedeemed {
                invitation_id: 4,
                user_id: 9,
                role: RoleLabel::Admin,
                at: Utc::now(),
            })
            .await;
    }
}
