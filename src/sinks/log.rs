//! Notifier that only writes to the tracing log.

use super::{Notification, NotificationSink, SinkError};
use async_trait::async_trait;
use tracing::info;

/// Used when no delivery endpoint is configured.
#[derive(Debug, Clone, Default)]
pub struct LogNotifier;

#[async_trait]
impl NotificationSink for LogNotifier {
    async fn notify(&self, notification: Notification) -> Result<(), SinkError> {
        let payload = serde_json::to_string(&notification)
            .map_err(|e| SinkError::Other(e.to_string()))?;
        info!(event = notification.event_name(), %payload, "notification (not delivered)");
        Ok(())
    }
}
