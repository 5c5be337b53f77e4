//! Read model for a single transaction.

use super::orchestrator::{LifecycleError, Orchestrator};
use crate::db::repo::{ledger, transactions};
use crate::domain::{Cost, Decimal, PaymentHistory, ProfitSharing, Transaction, TransactionId};
use crate::engine::{aggregate_costs, sum_payments, Capital, CostTotals};
use serde::Serialize;

/// Everything known about one transaction, with derived totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionDetail {
    pub transaction: Transaction,
    pub costs: Vec<Cost>,
    pub cost_totals: CostTotals,
    /// Capital as it stands now. For a completed transaction the stored
    /// snapshot lives in `profit_sharing`.
    pub capital: Capital,
    pub profit_sharing: Option<ProfitSharing>,
    pub payments: Vec<PaymentHistory>,
    pub total_paid: Decimal,
    /// Investor profit still owed; negative when overpaid.
    pub remaining: Decimal,
}

impl Orchestrator {
    pub async fn transaction_detail(
        &self,
        id: &TransactionId,
    ) -> Result<TransactionDetail, LifecycleError> {
        // Read everything from one snapshot; the transaction is dropped unchanged.
        let mut tx = self.repo().begin().await?;
        let transaction = transactions::fetch_transaction(&mut tx, id)
            .await?
            .ok_or_else(|| LifecycleError::not_found("transaction", id))?;
        let costs = ledger::fetch_costs(&mut tx, id).await?;
        let profit_sharing = ledger::fetch_profit_sharing(&mut tx, id).await?;
        let payments = ledger::fetch_payments(&mut tx, id).await?;

        let cost_totals = aggregate_costs(&costs);
        let capital = Capital::for_transaction(&transaction, &cost_totals);
        let total_paid = sum_payments(&payments);
        let should_receive = profit_sharing
            .as_ref()
            .map(|r| r.investor_profit_amount)
            .unwrap_or_else(Decimal::zero);

        Ok(TransactionDetail {
            transaction,
            costs,
            cost_totals,
            capital,
            profit_sharing,
            payments,
            total_paid,
            remaining: should_receive - total_paid,
        })
    }
}
