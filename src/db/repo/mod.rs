//! Repository layer for database operations.
//!
//! Record operations are free functions over `&mut SqliteConnection`, grouped
//! by table family:
//! - `parties.rs` - investors and units
//! - `transactions.rs` - transactions
//! - `ledger.rs` - costs, profit sharing, payment history and activity logs
//!
//! Taking a bare connection lets the orchestrator run several of them inside
//! one `sqlx::Transaction`. `Repository` owns the pool, opens transactions
//! and offers pooled shortcuts for single reads.

pub mod ledger;
pub mod parties;
pub mod transactions;

use crate::domain::{
    Cost, Investor, InvestorId, PaymentHistory, ProfitSharing, Transaction, TransactionId, Unit,
    UnitId,
};
use chrono::Utc;
use sqlx::sqlite::{Sqlite, SqlitePool, SqliteRow};
use sqlx::Row;
use std::str::FromStr;

/// Repository for database operations.
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Repository { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Begin a storage transaction. Dropping it without `commit` rolls back.
    pub async fn begin(&self) -> Result<sqlx::Transaction<'static, Sqlite>, sqlx::Error> {
        self.pool.begin().await
    }

    pub async fn get_investor(&self, id: &InvestorId) -> Result<Option<Investor>, sqlx::Error> {
        let mut conn = self.pool.acquire().await?;
        parties::fetch_investor(&mut conn, id).await
    }

    pub async fn get_unit(&self, id: &UnitId) -> Result<Option<Unit>, sqlx::Error> {
        let mut conn = self.pool.acquire().await?;
        parties::fetch_unit(&mut conn, id).await
    }

    pub async fn get_transaction(
        &self,
        id: &TransactionId,
    ) -> Result<Option<Transaction>, sqlx::Error> {
        let mut conn = self.pool.acquire().await?;
        transactions::fetch_transaction(&mut conn, id).await
    }

    pub async fn list_unit_transactions(
        &self,
        unit_id: &UnitId,
    ) -> Result<Vec<Transaction>, sqlx::Error> {
        let mut conn = self.pool.acquire().await?;
        transactions::fetch_unit_transactions(&mut conn, unit_id).await
    }

    pub async fn list_costs(&self, transaction_id: &TransactionId) -> Result<Vec<Cost>, sqlx::Error> {
        let mut conn = self.pool.acquire().await?;
        ledger::fetch_costs(&mut conn, transaction_id).await
    }

    pub async fn get_profit_sharing(
        &self,
        transaction_id: &TransactionId,
    ) -> Result<Option<ProfitSharing>, sqlx::Error> {
        let mut conn = self.pool.acquire().await?;
        ledger::fetch_profit_sharing(&mut conn, transaction_id).await
    }

    pub async fn list_payments(
        &self,
        transaction_id: &TransactionId,
    ) -> Result<Vec<PaymentHistory>, sqlx::Error> {
        let mut conn = self.pool.acquire().await?;
        ledger::fetch_payments(&mut conn, transaction_id).await
    }
}

// =========================================================================
// Column helpers
// =========================================================================

/// Decode a TEXT column through `FromStr`.
///
/// Unparseable stored values surface as `ColumnDecode` rather than being
/// replaced with a default.
pub(crate) fn parse_col<T>(row: &SqliteRow, col: &str) -> Result<T, sqlx::Error>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let raw: String = row.try_get(col)?;
    decode(col, &raw)
}

pub(crate) fn parse_opt_col<T>(row: &SqliteRow, col: &str) -> Result<Option<T>, sqlx::Error>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let raw: Option<String> = row.try_get(col)?;
    raw.map(|r| decode(col, &r)).transpose()
}

fn decode<T>(col: &str, raw: &str) -> Result<T, sqlx::Error>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    T::from_str(raw).map_err(|e| sqlx::Error::ColumnDecode {
        index: col.to_string(),
        source: Box::new(e),
    })
}

pub(crate) fn now_rfc3339() -> String {
    Utc::now().to_rfc3339()
}

/// True when the error is a UNIQUE constraint violation.
pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .map(|db| db.is_unique_violation())
        .unwrap_or(false)
}
