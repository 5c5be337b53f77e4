//! Costs, profit sharing, payment history and activity log records.

use super::{now_rfc3339, parse_col};
use crate::domain::{Cost, CostId, PaymentHistory, ProfitSharing, TransactionId};
use sqlx::sqlite::{SqliteConnection, SqliteRow};
use sqlx::Row;

// =========================================================================
// Costs
// =========================================================================

pub async fn insert_cost(conn: &mut SqliteConnection, cost: &Cost) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO costs (id, transaction_id, amount, payer, category, description, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(cost.id.to_string())
    .bind(cost.transaction_id.to_string())
    .bind(cost.amount.to_canonical_string())
    .bind(cost.payer.as_str())
    .bind(&cost.category)
    .bind(cost.description.as_deref())
    .bind(now_rfc3339())
    .execute(&mut *conn)
    .await?;

    Ok(())
}

pub async fn fetch_costs(
    conn: &mut SqliteConnection,
    transaction_id: &TransactionId,
) -> Result<Vec<Cost>, sqlx::Error> {
    let rows = sqlx::query(
        r#"
        SELECT id, transaction_id, amount, payer, category, description
        FROM costs
        WHERE transaction_id = ?
        ORDER BY created_at ASC, id ASC
        "#,
    )
    .bind(transaction_id.to_string())
    .fetch_all(&mut *conn)
    .await?;

    rows.iter().map(cost_from_row).collect()
}

/// Returns false when the cost does not exist or belongs to another transaction.
pub async fn delete_cost(
    conn: &mut SqliteConnection,
    transaction_id: &TransactionId,
    cost_id: &CostId,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM costs WHERE id = ? AND transaction_id = ?")
        .bind(cost_id.to_string())
        .bind(transaction_id.to_string())
        .execute(&mut *conn)
        .await?;

    Ok(result.rows_affected() > 0)
}

fn cost_from_row(row: &SqliteRow) -> Result<Cost, sqlx::Error> {
    Ok(Cost {
        id: parse_col(row, "id")?,
        transaction_id: parse_col(row, "transaction_id")?,
        amount: parse_col(row, "amount")?,
        payer: parse_col(row, "payer")?,
        category: row.try_get("category")?,
        description: row.try_get("description")?,
    })
}

// =========================================================================
// Profit sharing
// =========================================================================

/// Replace the transaction's profit sharing record with `record`.
pub async fn replace_profit_sharing(
    conn: &mut SqliteConnection,
    record: &ProfitSharing,
) -> Result<(), sqlx::Error> {
    delete_profit_sharing(conn, &record.transaction_id).await?;

    let now = now_rfc3339();
    sqlx::query(
        r#"
        INSERT INTO profit_sharings (
            id, transaction_id, total_capital_investor, total_capital_manager, total_capital,
            net_margin, investor_share_percentage, manager_share_percentage,
            investor_profit_amount, manager_profit_amount, created_at, updated_at
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(record.id.to_string())
    .bind(record.transaction_id.to_string())
    .bind(record.total_capital_investor.to_canonical_string())
    .bind(record.total_capital_manager.to_canonical_string())
    .bind(record.total_capital.to_canonical_string())
    .bind(record.net_margin.to_canonical_string())
    .bind(record.investor_share_percentage.to_canonical_string())
    .bind(record.manager_share_percentage.to_canonical_string())
    .bind(record.investor_profit_amount.to_canonical_string())
    .bind(record.manager_profit_amount.to_canonical_string())
    .bind(&now)
    .bind(&now)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// Persist new share percentages and profit amounts on an existing record.
pub async fn update_profit_shares(
    conn: &mut SqliteConnection,
    record: &ProfitSharing,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE profit_sharings SET
            investor_share_percentage = ?, manager_share_percentage = ?,
            investor_profit_amount = ?, manager_profit_amount = ?, updated_at = ?
        WHERE transaction_id = ?
        "#,
    )
    .bind(record.investor_share_percentage.to_canonical_string())
    .bind(record.manager_share_percentage.to_canonical_string())
    .bind(record.investor_profit_amount.to_canonical_string())
    .bind(record.manager_profit_amount.to_canonical_string())
    .bind(now_rfc3339())
    .bind(record.transaction_id.to_string())
    .execute(&mut *conn)
    .await?;

    Ok(result.rows_affected() > 0)
}

pub async fn fetch_profit_sharing(
    conn: &mut SqliteConnection,
    transaction_id: &TransactionId,
) -> Result<Option<ProfitSharing>, sqlx::Error> {
    let row = sqlx::query(
        r#"
        SELECT id, transaction_id, total_capital_investor, total_capital_manager, total_capital,
               net_margin, investor_share_percentage, manager_share_percentage,
               investor_profit_amount, manager_profit_amount
        FROM profit_sharings
        WHERE transaction_id = ?
        "#,
    )
    .bind(transaction_id.to_string())
    .fetch_optional(&mut *conn)
    .await?;

    row.as_ref().map(profit_sharing_from_row).transpose()
}

pub async fn delete_profit_sharing(
    conn: &mut SqliteConnection,
    transaction_id: &TransactionId,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM profit_sharings WHERE transaction_id = ?")
        .bind(transaction_id.to_string())
        .execute(&mut *conn)
        .await?;

    Ok(result.rows_affected() > 0)
}

fn profit_sharing_from_row(row: &SqliteRow) -> Result<ProfitSharing, sqlx::Error> {
    Ok(ProfitSharing {
        id: parse_col(row, "id")?,
        transaction_id: parse_col(row, "transaction_id")?,
        total_capital_investor: parse_col(row, "total_capital_investor")?,
        total_capital_manager: parse_col(row, "total_capital_manager")?,
        total_capital: parse_col(row, "total_capital")?,
        net_margin: parse_col(row, "net_margin")?,
        investor_share_percentage: parse_col(row, "investor_share_percentage")?,
        manager_share_percentage: parse_col(row, "manager_share_percentage")?,
        investor_profit_amount: parse_col(row, "investor_profit_amount")?,
        manager_profit_amount: parse_col(row, "manager_profit_amount")?,
    })
}

// =========================================================================
// Payment history
// =========================================================================

pub async fn insert_payment(
    conn: &mut SqliteConnection,
    payment: &PaymentHistory,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO payment_histories
            (id, transaction_id, amount, payment_date, method, proof_url, notes, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(payment.id.to_string())
    .bind(payment.transaction_id.to_string())
    .bind(payment.amount.to_canonical_string())
    .bind(payment.payment_date.to_string())
    .bind(payment.method.as_str())
    .bind(payment.proof_url.as_deref())
    .bind(payment.notes.as_deref())
    .bind(now_rfc3339())
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// Payments of a transaction, in payment date order.
///
/// Totals are summed in Rust by the caller; SQLite's SUM would go through REAL.
pub async fn fetch_payments(
    conn: &mut SqliteConnection,
    transaction_id: &TransactionId,
) -> Result<Vec<PaymentHistory>, sqlx::Error> {
    let rows = sqlx::query(
        r#"
        SELECT id, transaction_id, amount, payment_date, method, proof_url, notes
        FROM payment_histories
        WHERE transaction_id = ?
        ORDER BY payment_date ASC, created_at ASC
        "#,
    )
    .bind(transaction_id.to_string())
    .fetch_all(&mut *conn)
    .await?;

    rows.iter().map(payment_from_row).collect()
}

fn payment_from_row(row: &SqliteRow) -> Result<PaymentHistory, sqlx::Error> {
    Ok(PaymentHistory {
        id: parse_col(row, "id")?,
        transaction_id: parse_col(row, "transaction_id")?,
        amount: parse_col(row, "amount")?,
        payment_date: parse_col(row, "payment_date")?,
        method: parse_col(row, "method")?,
        proof_url: row.try_get("proof_url")?,
        notes: row.try_get("notes")?,
    })
}

// =========================================================================
// Activity log
// =========================================================================

pub async fn insert_activity(
    conn: &mut SqliteConnection,
    action: &str,
    entity_type: &str,
    entity_id: &str,
    details: &serde_json::Value,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO activity_logs (action, entity_type, entity_id, details, created_at)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(action)
    .bind(entity_type)
    .bind(entity_id)
    .bind(details.to_string())
    .bind(now_rfc3339())
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// Actions recorded for an entity, oldest first.
pub async fn fetch_activity_actions(
    conn: &mut SqliteConnection,
    entity_type: &str,
    entity_id: &str,
) -> Result<Vec<String>, sqlx::Error> {
    let rows = sqlx::query(
        "SELECT action FROM activity_logs WHERE entity_type = ? AND entity_id = ? ORDER BY id ASC",
    )
    .bind(entity_type)
    .bind(entity_id)
    .fetch_all(&mut *conn)
    .await?;

    rows.iter().map(|r| r.try_get("action")).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repo::test_support::{d, seed, setup_test_db};
    use crate::db::repo::transactions;
    use crate::domain::{Payer, PaymentId, PaymentMethod, ProfitSharingId};
    use chrono::NaiveDate;

    fn record(transaction_id: TransactionId, investor_amount: &str) -> ProfitSharing {
        ProfitSharing {
            id: ProfitSharingId::new(),
            transaction_id,
            total_capital_investor: d("152000000"),
            total_capital_manager: d("5000000"),
            total_capital: d("157000000"),
            net_margin: d("23000000"),
            investor_share_percentage: d("40"),
            manager_share_percentage: d("60"),
            investor_profit_amount: d(investor_amount),
            manager_profit_amount: d("23000000") - d(investor_amount),
        }
    }

    #[tokio::test]
    async fn test_replace_profit_sharing_keeps_one_row() {
        let (repo, _temp) = setup_test_db().await;
        let (_investor, _unit, tx) = seed(&repo).await;
        let mut conn = repo.pool().acquire().await.unwrap();

        replace_profit_sharing(&mut conn, &record(tx.id, "9200000"))
            .await
            .unwrap();
        let second = record(tx.id, "11500000");
        replace_profit_sharing(&mut conn, &second).await.unwrap();

        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM profit_sharings")
            .fetch_one(&mut *conn)
            .await
            .unwrap();
        assert_eq!(count.0, 1);
        assert_eq!(
            fetch_profit_sharing(&mut conn, &tx.id).await.unwrap(),
            Some(second)
        );
    }

    #[tokio::test]
    async fn test_delete_cost_scoped_to_transaction() {
        let (repo, _temp) = setup_test_db().await;
        let (_investor, _unit, tx) = seed(&repo).await;
        let mut conn = repo.pool().acquire().await.unwrap();

        let cost = Cost {
            id: CostId::new(),
            transaction_id: tx.id,
            amount: d("2000000"),
            payer: Payer::Investor,
            category: "repair".to_string(),
            description: Some("new tires".to_string()),
        };
        insert_cost(&mut conn, &cost).await.unwrap();
        assert_eq!(fetch_costs(&mut conn, &tx.id).await.unwrap(), vec![cost.clone()]);

        assert!(!delete_cost(&mut conn, &TransactionId::new(), &cost.id)
            .await
            .unwrap());
        assert!(delete_cost(&mut conn, &tx.id, &cost.id).await.unwrap());
        assert!(fetch_costs(&mut conn, &tx.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_deleting_transaction_cascades() {
        let (repo, _temp) = setup_test_db().await;
        let (_investor, _unit, tx) = seed(&repo).await;
        let mut conn = repo.pool().acquire().await.unwrap();

        insert_cost(
            &mut conn,
            &Cost {
                id: CostId::new(),
                transaction_id: tx.id,
                amount: d("100"),
                payer: Payer::Manager,
                category: "fuel".to_string(),
                description: None,
            },
        )
        .await
        .unwrap();
        replace_profit_sharing(&mut conn, &record(tx.id, "9200000"))
            .await
            .unwrap();
        insert_payment(
            &mut conn,
            &PaymentHistory {
                id: PaymentId::new(),
                transaction_id: tx.id,
                amount: d("1000"),
                payment_date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
                method: PaymentMethod::Cash,
                proof_url: None,
                notes: None,
            },
        )
        .await
        .unwrap();

        assert!(transactions::delete_transaction(&mut conn, &tx.id).await.unwrap());
        assert!(fetch_costs(&mut conn, &tx.id).await.unwrap().is_empty());
        assert!(fetch_profit_sharing(&mut conn, &tx.id).await.unwrap().is_none());
        assert!(fetch_payments(&mut conn, &tx.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_payments_ordered_by_date() {
        let (repo, _temp) = setup_test_db().await;
        let (_investor, _unit, tx) = seed(&repo).await;
        let mut conn = repo.pool().acquire().await.unwrap();

        for (day, amount) in [(20, "3000"), (5, "1000")] {
            insert_payment(
                &mut conn,
                &PaymentHistory {
                    id: PaymentId::new(),
                    transaction_id: tx.id,
                    amount: d(amount),
                    payment_date: NaiveDate::from_ymd_opt(2024, 3, day).unwrap(),
                    method: PaymentMethod::Transfer,
                    proof_url: Some("https://files.example/proof.jpg".to_string()),
                    notes: None,
                },
            )
            .await
            .unwrap();
        }

        let payments = fetch_payments(&mut conn, &tx.id).await.unwrap();
        let amounts: Vec<_> = payments.iter().map(|p| p.amount).collect();
        assert_eq!(amounts, vec![d("1000"), d("3000")]);
    }
}
