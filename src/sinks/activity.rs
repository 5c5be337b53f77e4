//! Activity log persisted to the `activity_logs` table.

use super::{ActivityEntry, ActivitySink, SinkError};
use crate::db::repo::ledger;
use crate::db::Repository;
use async_trait::async_trait;
use std::sync::Arc;

#[derive(Clone)]
pub struct SqliteActivityLog {
    repo: Arc<Repository>,
}

impl SqliteActivityLog {
    pub fn new(repo: Arc<Repository>) -> Self {
        Self { repo }
    }
}

impl std::fmt::Debug for SqliteActivityLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteActivityLog").finish_non_exhaustive()
    }
}

#[async_trait]
impl ActivitySink for SqliteActivityLog {
    async fn record(&self, entry: ActivityEntry) -> Result<(), SinkError> {
        let mut conn = self.repo.pool().acquire().await?;
        ledger::insert_activity(
            &mut conn,
            entry.action,
            entry.entity_type,
            &entry.entity_id,
            &entry.details,
        )
        .await?;
        Ok(())
    }
}
