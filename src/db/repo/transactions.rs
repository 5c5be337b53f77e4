//! Transaction records.

use super::{now_rfc3339, parse_col, parse_opt_col};
use crate::domain::{PaymentStatus, Transaction, TransactionId, UnitId};
use sqlx::sqlite::{SqliteConnection, SqliteRow};
use sqlx::Row;

const TRANSACTION_COLUMNS: &str = "id, unit_id, buy_price, buy_date, sell_price, sell_date, status, \
     initial_investor_capital, initial_manager_capital, profit_status, payment_status, \
     loss_bearer, notes";

/// Insert a transaction.
///
/// # Errors
/// Fails with a unique violation if the unit already has an ON_PROCESS
/// transaction (see `idx_transactions_one_active_per_unit`).
pub async fn insert_transaction(
    conn: &mut SqliteConnection,
    tx: &Transaction,
) -> Result<(), sqlx::Error> {
    let now = now_rfc3339();
    sqlx::query(
        r#"
        INSERT INTO transactions (
            id, unit_id, buy_price, buy_date, sell_price, sell_date, status,
            initial_investor_capital, initial_manager_capital, profit_status,
            payment_status, loss_bearer, notes, created_at, updated_at
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(tx.id.to_string())
    .bind(tx.unit_id.to_string())
    .bind(tx.buy_price.to_canonical_string())
    .bind(tx.buy_date.to_string())
    .bind(tx.sell_price.map(|p| p.to_canonical_string()))
    .bind(tx.sell_date.map(|d| d.to_string()))
    .bind(tx.status.as_str())
    .bind(tx.initial_investor_capital.map(|c| c.to_canonical_string()))
    .bind(tx.initial_manager_capital.map(|c| c.to_canonical_string()))
    .bind(tx.profit_status.map(|s| s.as_str()))
    .bind(tx.payment_status.as_str())
    .bind(tx.loss_bearer.map(|b| b.as_str()))
    .bind(tx.notes.as_deref())
    .bind(&now)
    .bind(&now)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

pub async fn fetch_transaction(
    conn: &mut SqliteConnection,
    id: &TransactionId,
) -> Result<Option<Transaction>, sqlx::Error> {
    let sql = format!("SELECT {} FROM transactions WHERE id = ?", TRANSACTION_COLUMNS);
    let row = sqlx::query(&sql)
        .bind(id.to_string())
        .fetch_optional(&mut *conn)
        .await?;

    row.as_ref().map(transaction_from_row).transpose()
}

/// The unit's ON_PROCESS transaction, if any.
pub async fn fetch_active_transaction(
    conn: &mut SqliteConnection,
    unit_id: &UnitId,
) -> Result<Option<Transaction>, sqlx::Error> {
    let sql = format!(
        "SELECT {} FROM transactions WHERE unit_id = ? AND status = 'ON_PROCESS'",
        TRANSACTION_COLUMNS
    );
    let row = sqlx::query(&sql)
        .bind(unit_id.to_string())
        .fetch_optional(&mut *conn)
        .await?;

    row.as_ref().map(transaction_from_row).transpose()
}

/// All transactions of a unit, oldest purchase first.
pub async fn fetch_unit_transactions(
    conn: &mut SqliteConnection,
    unit_id: &UnitId,
) -> Result<Vec<Transaction>, sqlx::Error> {
    let sql = format!(
        "SELECT {} FROM transactions WHERE unit_id = ? ORDER BY buy_date ASC, created_at ASC",
        TRANSACTION_COLUMNS
    );
    let rows = sqlx::query(&sql)
        .bind(unit_id.to_string())
        .fetch_all(&mut *conn)
        .await?;

    rows.iter().map(transaction_from_row).collect()
}

/// Overwrite every mutable column with the values in `tx`.
pub async fn update_transaction(
    conn: &mut SqliteConnection,
    tx: &Transaction,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE transactions SET
            buy_price = ?, buy_date = ?, sell_price = ?, sell_date = ?, status = ?,
            initial_investor_capital = ?, initial_manager_capital = ?, profit_status = ?,
            payment_status = ?, loss_bearer = ?, notes = ?, updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(tx.buy_price.to_canonical_string())
    .bind(tx.buy_date.to_string())
    .bind(tx.sell_price.map(|p| p.to_canonical_string()))
    .bind(tx.sell_date.map(|d| d.to_string()))
    .bind(tx.status.as_str())
    .bind(tx.initial_investor_capital.map(|c| c.to_canonical_string()))
    .bind(tx.initial_manager_capital.map(|c| c.to_canonical_string()))
    .bind(tx.profit_status.map(|s| s.as_str()))
    .bind(tx.payment_status.as_str())
    .bind(tx.loss_bearer.map(|b| b.as_str()))
    .bind(tx.notes.as_deref())
    .bind(now_rfc3339())
    .bind(tx.id.to_string())
    .execute(&mut *conn)
    .await?;

    Ok(result.rows_affected() > 0)
}

pub async fn update_payment_status(
    conn: &mut SqliteConnection,
    id: &TransactionId,
    status: PaymentStatus,
) -> Result<bool, sqlx::Error> {
    let result =
        sqlx::query("UPDATE transactions SET payment_status = ?, updated_at = ? WHERE id = ?")
            .bind(status.as_str())
            .bind(now_rfc3339())
            .bind(id.to_string())
            .execute(&mut *conn)
            .await?;

    Ok(result.rows_affected() > 0)
}

/// Delete a transaction; costs, profit sharing and payments cascade.
pub async fn delete_transaction(
    conn: &mut SqliteConnection,
    id: &TransactionId,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM transactions WHERE id = ?")
        .bind(id.to_string())
        .execute(&mut *conn)
        .await?;

    Ok(result.rows_affected() > 0)
}

fn transaction_from_row(row: &SqliteRow) -> Result<Transaction, sqlx::Error> {
    Ok(Transaction {
        id: parse_col(row, "id")?,
        unit_id: parse_col(row, "unit_id")?,
        buy_price: parse_col(row, "buy_price")?,
        buy_date: parse_col(row, "buy_date")?,
        sell_price: parse_opt_col(row, "sell_price")?,
        sell_date: parse_opt_col(row, "sell_date")?,
        status: parse_col(row, "status")?,
        initial_investor_capital: parse_opt_col(row, "initial_investor_capital")?,
        initial_manager_capital: parse_opt_col(row, "initial_manager_capital")?,
        profit_status: parse_opt_col(row, "profit_status")?,
        payment_status: parse_col(row, "payment_status")?,
        loss_bearer: parse_opt_col(row, "loss_bearer")?,
        notes: row.try_get("notes")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repo::is_unique_violation;
    use crate::db::repo::test_support::{d, seed, setup_test_db, transaction};
    use crate::domain::{LossBearer, ProfitStatus, TransactionStatus};
    use chrono::NaiveDate;

    #[tokio::test]
    async fn test_transaction_roundtrip_with_optional_fields() {
        let (repo, _temp) = setup_test_db().await;
        let (_investor, _unit, tx) = seed(&repo).await;

        let mut conn = repo.pool().acquire().await.unwrap();
        let loaded = fetch_transaction(&mut conn, &tx.id).await.unwrap();
        assert_eq!(loaded, Some(tx.clone()));

        let mut updated = tx.clone();
        updated.sell_price = Some(d("180000000"));
        updated.sell_date = NaiveDate::from_ymd_opt(2024, 2, 1);
        updated.status = TransactionStatus::Completed;
        updated.profit_status = Some(ProfitStatus::Profit);
        updated.initial_manager_capital = Some(d("5000000.50"));
        updated.loss_bearer = Some(LossBearer::Manager);
        assert!(update_transaction(&mut conn, &updated).await.unwrap());

        let loaded = fetch_transaction(&mut conn, &tx.id).await.unwrap().unwrap();
        assert_eq!(loaded, updated);
    }

    #[tokio::test]
    async fn test_second_active_transaction_violates_unique_index() {
        let (repo, _temp) = setup_test_db().await;
        let (_investor, unit, _tx) = seed(&repo).await;

        let mut conn = repo.pool().acquire().await.unwrap();
        let err = insert_transaction(&mut conn, &transaction(unit.id))
            .await
            .unwrap_err();
        assert!(is_unique_violation(&err));
    }

    #[tokio::test]
    async fn test_completed_transactions_do_not_block_new_cycle() {
        let (repo, _temp) = setup_test_db().await;
        let (_investor, unit, mut tx) = seed(&repo).await;

        let mut conn = repo.pool().acquire().await.unwrap();
        tx.status = TransactionStatus::Completed;
        update_transaction(&mut conn, &tx).await.unwrap();

        let next = transaction(unit.id);
        insert_transaction(&mut conn, &next).await.unwrap();

        let active = fetch_active_transaction(&mut conn, &unit.id).await.unwrap();
        assert_eq!(active.map(|t| t.id), Some(next.id));
        assert_eq!(
            fetch_unit_transactions(&mut conn, &unit.id).await.unwrap().len(),
            2
        );
    }

    #[tokio::test]
    async fn test_corrupt_amount_surfaces_decode_error() {
        let (repo, _temp) = setup_test_db().await;
        let (_investor, _unit, tx) = seed(&repo).await;

        let mut conn = repo.pool().acquire().await.unwrap();
        sqlx::query("UPDATE transactions SET buy_price = 'abc' WHERE id = ?")
            .bind(tx.id.to_string())
            .execute(&mut *conn)
            .await
            .unwrap();

        let err = fetch_transaction(&mut conn, &tx.id).await.unwrap_err();
        assert!(matches!(err, sqlx::Error::ColumnDecode { .. }));
    }
}
