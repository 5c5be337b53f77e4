//! HTTP webhook notifier (e.g. a WhatsApp or email relay).

use super::{Notification, NotificationSink, SinkError};
use async_trait::async_trait;
use backoff::future::retry;
use backoff::ExponentialBackoff;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, warn};

/// POSTs each notification as JSON to a fixed URL.
///
/// `notify` returns as soon as delivery is scheduled; retries happen on a
/// background task and a final failure is only logged.
#[derive(Debug, Clone)]
pub struct WebhookNotifier {
    client: Client,
    url: String,
    max_elapsed: Duration,
}

impl WebhookNotifier {
    pub fn new(url: String, max_elapsed: Duration) -> Self {
        Self {
            client: Client::new(),
            url,
            max_elapsed,
        }
    }

    /// Deliver one notification, retrying transient failures.
    pub async fn deliver(&self, notification: &Notification) -> Result<(), SinkError> {
        let backoff = ExponentialBackoff {
            max_elapsed_time: Some(self.max_elapsed),
            ..Default::default()
        };

        retry(backoff, || async {
            let response = self
                .client
                .post(&self.url)
                .json(notification)
                .send()
                .await
                .map_err(|e| backoff::Error::transient(SinkError::Network(e.to_string())))?;

            let status = response.status();
            if status.as_u16() == 429 || status.is_server_error() {
                return Err(backoff::Error::transient(SinkError::Http {
                    status: status.as_u16(),
                    message: "Server error".to_string(),
                }));
            }
            if !status.is_success() {
                return Err(backoff::Error::permanent(SinkError::Http {
                    status: status.as_u16(),
                    message: "Client error".to_string(),
                }));
            }
            Ok(())
        })
        .await
    }
}

#[async_trait]
impl NotificationSink for WebhookNotifier {
    async fn notify(&self, notification: Notification) -> Result<(), SinkError> {
        let notifier = self.clone();
        tokio::spawn(async move {
            match notifier.deliver(&notification).await {
                Ok(()) => debug!(event = notification.event_name(), "notification delivered"),
                Err(e) => warn!(
                    event = notification.event_name(),
                    error = %e,
                    "notification delivery failed"
                ),
            }
        });
        Ok(())
    }
}
