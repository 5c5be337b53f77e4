//! Best-effort side-effect sinks invoked after successful mutations.
//!
//! Failures are reported to the caller of the sink, which logs them; they
//! never turn a committed ledger change into an error.

use crate::domain::{Decimal, InvestorId, TransactionId, UnitId};
use async_trait::async_trait;
use serde::Serialize;
use std::fmt;
use thiserror::Error;

pub mod activity;
pub mod log;
pub mod mock;
pub mod webhook;

pub use activity::SqliteActivityLog;
pub use log::LogNotifier;
pub use mock::RecordingSink;
pub use webhook::WebhookNotifier;

/// One activity log line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActivityEntry {
    /// Dotted action name such as `transaction.finalized`.
    pub action: &'static str,
    pub entity_type: &'static str,
    pub entity_id: String,
    pub details: serde_json::Value,
}

impl ActivityEntry {
    pub fn transaction(
        action: &'static str,
        id: &TransactionId,
        details: serde_json::Value,
    ) -> Self {
        ActivityEntry {
            action,
            entity_type: "transaction",
            entity_id: id.to_string(),
            details,
        }
    }
}

/// Events delivered to the investor notification channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum Notification {
    UnitSold {
        investor_id: InvestorId,
        transaction_id: TransactionId,
        unit_id: UnitId,
    },
    PaymentRecorded {
        investor_id: InvestorId,
        transaction_id: TransactionId,
        amount: Decimal,
        #[serde(skip_serializing_if = "Option::is_none")]
        proof_url: Option<String>,
    },
}

impl Notification {
    pub fn event_name(&self) -> &'static str {
        match self {
            Notification::UnitSold { .. } => "unit_sold",
            Notification::PaymentRecorded { .. } => "payment_recorded",
        }
    }
}

#[async_trait]
pub trait ActivitySink: Send + Sync + fmt::Debug {
    async fn record(&self, entry: ActivityEntry) -> Result<(), SinkError>;
}

#[async_trait]
pub trait NotificationSink: Send + Sync + fmt::Debug {
    /// Hand off a notification. Implementations may deliver asynchronously.
    async fn notify(&self, notification: Notification) -> Result<(), SinkError>;
}

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("storage error: {0}")]
    Storage(#[from] sqlx::Error),
    #[error("network error: {0}")]
    Network(String),
    #[error("HTTP error {status}: {message}")]
    Http { status: u16, message: String },
    #[error("{0}")]
    Other(String),
}
