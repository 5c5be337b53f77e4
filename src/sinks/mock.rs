//! In-memory sink for tests.

use super::{ActivityEntry, ActivitySink, Notification, NotificationSink, SinkError};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

/// Records everything it receives; optionally fails every call.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    activities: Arc<Mutex<Vec<ActivityEntry>>>,
    notifications: Arc<Mutex<Vec<Notification>>>,
    fail: bool,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// A sink that records and then reports failure on every call.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn activities(&self) -> Vec<ActivityEntry> {
        self.activities
            .lock()
            .map(|g| g.clone())
            .unwrap_or_default()
    }

    pub fn actions(&self) -> Vec<&'static str> {
        self.activities().iter().map(|a| a.action).collect()
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.notifications
            .lock()
            .map(|g| g.clone())
            .unwrap_or_default()
    }

    fn outcome(&self) -> Result<(), SinkError> {
        if self.fail {
            Err(SinkError::Other("sink configured to fail".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl ActivitySink for RecordingSink {
    async fn record(&self, entry: ActivityEntry) -> Result<(), SinkError> {
        if let Ok(mut guard) = self.activities.lock() {
            guard.push(entry);
        }
        self.outcome()
    }
}

#[async_trait]
impl NotificationSink for RecordingSink {
    async fn notify(&self, notification: Notification) -> Result<(), SinkError> {
        if let Ok(mut guard) = self.notifications.lock() {
            guard.push(notification);
        }
        self.outcome()
    }
}
