use crate::db::repo::{is_unique_violation, ledger, parties, transactions};
use crate::db::Repository;
use crate::domain::{
    Cost, CostId, Decimal, Investor, InvestorId, PaymentHistory, PaymentId, PaymentStatus,
    ProfitSharing, ProfitSharingId, Transaction, TransactionId, TransactionStatus, Unit, UnitId,
    UnitStatus,
};
use crate::engine::{reconcile_payment, reshare, sum_payments, Settlement, SharePercentages};
use crate::sinks::{ActivityEntry, ActivitySink, Notification, NotificationSink};
use crate::validation::{
    NewCost, NewInvestor, NewPayment, NewTransaction, NewUnit, SaleInput, TransactionPatch,
    ValidationError,
};
use serde::Serialize;
use serde_json::json;
use sqlx::SqliteConnection;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

/// Runs every ledger mutation.
///
/// Each operation checks its preconditions, then applies all writes inside one
/// storage transaction. Activity and notification sinks are called only after
/// the commit; their failures are logged and dropped.
#[derive(Clone)]
pub struct Orchestrator {
    repo: Arc<Repository>,
    activity: Arc<dyn ActivitySink>,
    notifier: Arc<dyn NotificationSink>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FinalizedSale {
    pub transaction: Transaction,
    pub profit_sharing: ProfitSharing,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordedPayment {
    pub payment: PaymentHistory,
    pub payment_status: PaymentStatus,
}

impl Orchestrator {
    pub fn new(
        repo: Arc<Repository>,
        activity: Arc<dyn ActivitySink>,
        notifier: Arc<dyn NotificationSink>,
    ) -> Self {
        Self {
            repo,
            activity,
            notifier,
        }
    }

    pub fn repo(&self) -> &Arc<Repository> {
        &self.repo
    }

    // =====================================================================
    // Parties
    // =====================================================================

    pub async fn create_investor(&self, input: NewInvestor) -> Result<Investor, LifecycleError> {
        let investor = Investor {
            id: InvestorId::new(),
            name: input.name,
            phone: input.phone,
            email: input.email,
            profit_share_percentage: input.profit_share_percentage,
        };

        let mut tx = self.repo.begin().await?;
        parties::insert_investor(&mut tx, &investor).await?;
        tx.commit().await?;

        info!(investor_id = %investor.id, "investor created");
        self.record(ActivityEntry {
            action: "investor.created",
            entity_type: "investor",
            entity_id: investor.id.to_string(),
            details: json!({ "name": investor.name }),
        })
        .await;

        Ok(investor)
    }

    pub async fn create_unit(&self, input: NewUnit) -> Result<Unit, LifecycleError> {
        let mut tx = self.repo.begin().await?;
        load_investor(&mut tx, &input.investor_id).await?;

        let unit = Unit {
            id: UnitId::new(),
            investor_id: input.investor_id,
            name: input.name,
            plate_number: input.plate_number,
            status: UnitStatus::Available,
        };
        parties::insert_unit(&mut tx, &unit).await?;
        tx.commit().await?;

        info!(unit_id = %unit.id, investor_id = %unit.investor_id, "unit created");
        self.record(ActivityEntry {
            action: "unit.created",
            entity_type: "unit",
            entity_id: unit.id.to_string(),
            details: json!({ "name": unit.name, "plateNumber": unit.plate_number }),
        })
        .await;

        Ok(unit)
    }

    /// Manual AVAILABLE / MAINTENANCE toggle. SOLD is owned by the lifecycle.
    pub async fn set_unit_status(
        &self,
        unit_id: &UnitId,
        status: UnitStatus,
    ) -> Result<Unit, LifecycleError> {
        if status == UnitStatus::Sold {
            return Err(ValidationError::Invalid {
                field: "status",
                reason: "SOLD is set by finalizing a transaction".to_string(),
            }
            .into());
        }

        let mut tx = self.repo.begin().await?;
        let unit = load_unit(&mut tx, unit_id).await?;
        if unit.status == UnitStatus::Sold {
            return Err(LifecycleError::UnitSold(unit.id));
        }
        parties::update_unit_status(&mut tx, unit_id, status).await?;
        tx.commit().await?;

        info!(unit_id = %unit_id, from = %unit.status, to = %status, "unit status changed");
        self.record(ActivityEntry {
            action: "unit.status_changed",
            entity_type: "unit",
            entity_id: unit_id.to_string(),
            details: json!({ "from": unit.status, "to": status }),
        })
        .await;

        Ok(Unit { status, ..unit })
    }

    // =====================================================================
    // Transactions
    // =====================================================================

    /// Open a buy cycle for a unit. Only one ON_PROCESS transaction per unit.
    ///
    /// A unit left SOLD by an earlier completed cycle goes back to AVAILABLE.
    pub async fn create_transaction(
        &self,
        input: NewTransaction,
    ) -> Result<Transaction, LifecycleError> {
        let mut tx = self.repo.begin().await?;
        let unit = load_unit(&mut tx, &input.unit_id).await?;
        if transactions::fetch_active_transaction(&mut tx, &input.unit_id)
            .await?
            .is_some()
        {
            return Err(LifecycleError::ActiveTransactionExists(input.unit_id));
        }

        let transaction = Transaction {
            id: TransactionId::new(),
            unit_id: input.unit_id,
            buy_price: input.buy_price,
            buy_date: input.buy_date,
            sell_price: None,
            sell_date: None,
            status: TransactionStatus::OnProcess,
            initial_investor_capital: input.initial_investor_capital,
            initial_manager_capital: input.initial_manager_capital,
            profit_status: None,
            payment_status: PaymentStatus::Unpaid,
            loss_bearer: input.loss_bearer,
            notes: input.notes,
        };
        transactions::insert_transaction(&mut tx, &transaction)
            .await
            .map_err(|e| active_conflict(e, transaction.unit_id))?;
        if unit.status == UnitStatus::Sold {
            parties::update_unit_status(&mut tx, &unit.id, UnitStatus::Available).await?;
        }
        tx.commit().await?;

        info!(
            transaction_id = %transaction.id,
            unit_id = %transaction.unit_id,
            buy_price = %transaction.buy_price,
            "transaction created"
        );
        self.record(ActivityEntry::transaction(
            "transaction.created",
            &transaction.id,
            json!({ "unitId": transaction.unit_id, "buyPrice": transaction.buy_price }),
        ))
        .await;

        Ok(transaction)
    }

    /// Edit a transaction. A completed transaction is re-priced with its
    /// stored share percentages.
    pub async fn update_transaction(
        &self,
        id: &TransactionId,
        patch: TransactionPatch,
    ) -> Result<Transaction, LifecycleError> {
        let mut tx = self.repo.begin().await?;
        let current = load_transaction(&mut tx, id).await?;
        let mut updated = patch.apply(&current)?;
        let repriced = reprice(&mut tx, &mut updated).await?;
        transactions::update_transaction(&mut tx, &updated).await?;
        tx.commit().await?;

        info!(transaction_id = %id, repriced = repriced.is_some(), "transaction updated");
        self.record(ActivityEntry::transaction(
            "transaction.updated",
            id,
            json!({
                "repriced": repriced.is_some(),
                "netMargin": repriced.map(|r| r.net_margin),
            }),
        ))
        .await;

        Ok(updated)
    }

    /// Delete a transaction with its costs, profit sharing and payments.
    /// The unit returns to AVAILABLE whatever the prior status.
    pub async fn delete_transaction(&self, id: &TransactionId) -> Result<(), LifecycleError> {
        let mut tx = self.repo.begin().await?;
        let transaction = load_transaction(&mut tx, id).await?;
        transactions::delete_transaction(&mut tx, id).await?;
        parties::update_unit_status(&mut tx, &transaction.unit_id, UnitStatus::Available).await?;
        tx.commit().await?;

        info!(transaction_id = %id, unit_id = %transaction.unit_id, "transaction deleted");
        self.record(ActivityEntry::transaction(
            "transaction.deleted",
            id,
            json!({ "unitId": transaction.unit_id, "status": transaction.status }),
        ))
        .await;

        Ok(())
    }

    /// ON_PROCESS to COMPLETED.
    ///
    /// Sell price and date come from `input` or from the values already on
    /// the transaction. Shares come from `input` or the investor default.
    pub async fn finalize_transaction(
        &self,
        id: &TransactionId,
        input: SaleInput,
    ) -> Result<FinalizedSale, LifecycleError> {
        let mut tx = self.repo.begin().await?;
        let current = load_transaction(&mut tx, id).await?;
        if current.is_completed() {
            return Err(LifecycleError::AlreadyCompleted(*id));
        }
        let (sell_price, sell_date) = input.resolve_sale(&current)?;
        let unit = load_unit(&mut tx, &current.unit_id).await?;
        let shares = match input.shares {
            Some(shares) => shares,
            None => default_shares(&mut tx, &unit.investor_id).await?,
        };

        let costs = ledger::fetch_costs(&mut tx, id).await?;
        let settlement = Settlement::compute(&current, &costs, sell_price, shares);
        let profit_sharing = settlement.to_profit_sharing(ProfitSharingId::new(), &current);
        let payment_status =
            reconciled_status(&mut tx, id, profit_sharing.investor_profit_amount).await?;

        let transaction = Transaction {
            sell_price: Some(sell_price),
            sell_date: Some(sell_date),
            status: TransactionStatus::Completed,
            profit_status: Some(settlement.split.profit_status),
            payment_status,
            ..current
        };

        ledger::replace_profit_sharing(&mut tx, &profit_sharing).await?;
        parties::update_unit_status(&mut tx, &unit.id, UnitStatus::Sold).await?;
        transactions::update_transaction(&mut tx, &transaction).await?;
        tx.commit().await?;

        info!(
            transaction_id = %id,
            unit_id = %unit.id,
            net_margin = %profit_sharing.net_margin,
            profit_status = %settlement.split.profit_status,
            "transaction finalized"
        );
        self.record(ActivityEntry::transaction(
            "transaction.finalized",
            id,
            json!({
                "sellPrice": sell_price,
                "netMargin": profit_sharing.net_margin,
                "profitStatus": settlement.split.profit_status,
                "investorProfitAmount": profit_sharing.investor_profit_amount,
            }),
        ))
        .await;
        self.notify(Notification::UnitSold {
            investor_id: unit.investor_id,
            transaction_id: *id,
            unit_id: unit.id,
        })
        .await;

        Ok(FinalizedSale {
            transaction,
            profit_sharing,
        })
    }

    /// COMPLETED to ON_PROCESS. Drops the profit snapshot and frees the unit.
    /// Sell data stays on the transaction for a later finalize. Payment status
    /// is reconciled the same way `record_payment` does without a snapshot.
    pub async fn revert_transaction(
        &self,
        id: &TransactionId,
    ) -> Result<Transaction, LifecycleError> {
        let mut tx = self.repo.begin().await?;
        let current = load_transaction(&mut tx, id).await?;
        if !current.is_completed() {
            return Err(LifecycleError::NotCompleted(*id));
        }
        if transactions::fetch_active_transaction(&mut tx, &current.unit_id)
            .await?
            .is_some()
        {
            return Err(LifecycleError::ActiveTransactionExists(current.unit_id));
        }

        // With the snapshot gone nothing is owed.
        let payment_status = reconciled_status(&mut tx, id, Decimal::zero()).await?;
        let transaction = Transaction {
            status: TransactionStatus::OnProcess,
            profit_status: None,
            payment_status,
            ..current
        };

        ledger::delete_profit_sharing(&mut tx, id).await?;
        parties::update_unit_status(&mut tx, &transaction.unit_id, UnitStatus::Available).await?;
        transactions::update_transaction(&mut tx, &transaction)
            .await
            .map_err(|e| active_conflict(e, transaction.unit_id))?;
        tx.commit().await?;

        info!(transaction_id = %id, unit_id = %transaction.unit_id, "transaction reverted");
        self.record(ActivityEntry::transaction(
            "transaction.reverted",
            id,
            json!({ "unitId": transaction.unit_id }),
        ))
        .await;

        Ok(transaction)
    }

    /// Re-split the stored net margin with new percentages.
    pub async fn update_shares(
        &self,
        id: &TransactionId,
        shares: SharePercentages,
    ) -> Result<ProfitSharing, LifecycleError> {
        let mut tx = self.repo.begin().await?;
        load_transaction(&mut tx, id).await?;
        let existing = ledger::fetch_profit_sharing(&mut tx, id)
            .await?
            .ok_or(LifecycleError::NoProfitSharingRecord(*id))?;

        let record = reshare(&existing, shares);
        ledger::update_profit_shares(&mut tx, &record).await?;
        let payment_status = reconciled_status(&mut tx, id, record.investor_profit_amount).await?;
        transactions::update_payment_status(&mut tx, id, payment_status).await?;
        tx.commit().await?;

        info!(
            transaction_id = %id,
            investor_share = %shares.investor,
            manager_share = %shares.manager,
            payment_status = %payment_status,
            "profit shares updated"
        );
        self.record(ActivityEntry::transaction(
            "profit_sharing.updated",
            id,
            json!({
                "investorSharePercentage": shares.investor,
                "managerSharePercentage": shares.manager,
                "investorProfitAmount": record.investor_profit_amount,
            }),
        ))
        .await;

        Ok(record)
    }

    // =====================================================================
    // Costs
    // =====================================================================

    pub async fn add_cost(&self, id: &TransactionId, input: NewCost) -> Result<Cost, LifecycleError> {
        let mut tx = self.repo.begin().await?;
        let mut transaction = load_transaction(&mut tx, id).await?;

        let cost = Cost {
            id: CostId::new(),
            transaction_id: *id,
            amount: input.amount,
            payer: input.payer,
            category: input.category,
            description: input.description,
        };
        ledger::insert_cost(&mut tx, &cost).await?;
        if reprice(&mut tx, &mut transaction).await?.is_some() {
            transactions::update_transaction(&mut tx, &transaction).await?;
        }
        tx.commit().await?;

        info!(
            transaction_id = %id,
            cost_id = %cost.id,
            amount = %cost.amount,
            payer = %cost.payer,
            "cost added"
        );
        self.record(ActivityEntry::transaction(
            "cost.added",
            id,
            json!({ "costId": cost.id, "amount": cost.amount, "payer": cost.payer }),
        ))
        .await;

        Ok(cost)
    }

    pub async fn delete_cost(
        &self,
        id: &TransactionId,
        cost_id: &CostId,
    ) -> Result<(), LifecycleError> {
        let mut tx = self.repo.begin().await?;
        let mut transaction = load_transaction(&mut tx, id).await?;
        if !ledger::delete_cost(&mut tx, id, cost_id).await? {
            return Err(LifecycleError::not_found("cost", cost_id));
        }
        if reprice(&mut tx, &mut transaction).await?.is_some() {
            transactions::update_transaction(&mut tx, &transaction).await?;
        }
        tx.commit().await?;

        info!(transaction_id = %id, cost_id = %cost_id, "cost deleted");
        self.record(ActivityEntry::transaction(
            "cost.deleted",
            id,
            json!({ "costId": cost_id }),
        ))
        .await;

        Ok(())
    }

    // =====================================================================
    // Payments
    // =====================================================================

    /// Append a payout and reconcile the payment status.
    pub async fn record_payment(
        &self,
        id: &TransactionId,
        input: NewPayment,
    ) -> Result<RecordedPayment, LifecycleError> {
        let mut tx = self.repo.begin().await?;
        let transaction = load_transaction(&mut tx, id).await?;
        let unit = load_unit(&mut tx, &transaction.unit_id).await?;

        let payment = PaymentHistory {
            id: PaymentId::new(),
            transaction_id: *id,
            amount: input.amount,
            payment_date: input.payment_date,
            method: input.method,
            proof_url: input.proof_url,
            notes: input.notes,
        };
        ledger::insert_payment(&mut tx, &payment).await?;

        let should_receive = ledger::fetch_profit_sharing(&mut tx, id)
            .await?
            .map(|r| r.investor_profit_amount)
            .unwrap_or_else(Decimal::zero);
        let payment_status = reconciled_status(&mut tx, id, should_receive).await?;
        transactions::update_payment_status(&mut tx, id, payment_status).await?;
        tx.commit().await?;

        info!(
            transaction_id = %id,
            payment_id = %payment.id,
            amount = %payment.amount,
            payment_status = %payment_status,
            "payment recorded"
        );
        self.record(ActivityEntry::transaction(
            "payment.recorded",
            id,
            json!({
                "paymentId": payment.id,
                "amount": payment.amount,
                "method": payment.method,
                "paymentStatus": payment_status,
            }),
        ))
        .await;
        self.notify(Notification::PaymentRecorded {
            investor_id: unit.investor_id,
            transaction_id: *id,
            amount: payment.amount,
            proof_url: payment.proof_url.clone(),
        })
        .await;

        Ok(RecordedPayment {
            payment,
            payment_status,
        })
    }

    // =====================================================================
    // Side effects
    // =====================================================================

    async fn record(&self, entry: ActivityEntry) {
        let action = entry.action;
        if let Err(e) = self.activity.record(entry).await {
            warn!(action, error = %e, "failed to write activity log");
        }
    }

    async fn notify(&self, notification: Notification) {
        let event = notification.event_name();
        if let Err(e) = self.notifier.notify(notification).await {
            warn!(event, error = %e, "failed to send notification");
        }
    }
}

impl fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Orchestrator")
            .field("activity", &self.activity)
            .field("notifier", &self.notifier)
            .finish_non_exhaustive()
    }
}

// =========================================================================
// Helpers shared by the operations above
// =========================================================================

async fn load_transaction(
    conn: &mut SqliteConnection,
    id: &TransactionId,
) -> Result<Transaction, LifecycleError> {
    transactions::fetch_transaction(conn, id)
        .await?
        .ok_or_else(|| LifecycleError::not_found("transaction", id))
}

async fn load_unit(conn: &mut SqliteConnection, id: &UnitId) -> Result<Unit, LifecycleError> {
    parties::fetch_unit(conn, id)
        .await?
        .ok_or_else(|| LifecycleError::not_found("unit", id))
}

async fn load_investor(
    conn: &mut SqliteConnection,
    id: &InvestorId,
) -> Result<Investor, LifecycleError> {
    parties::fetch_investor(conn, id)
        .await?
        .ok_or_else(|| LifecycleError::not_found("investor", id))
}

async fn default_shares(
    conn: &mut SqliteConnection,
    investor_id: &InvestorId,
) -> Result<SharePercentages, LifecycleError> {
    let investor = load_investor(conn, investor_id).await?;
    Ok(SharePercentages::from_investor(
        investor.profit_share_percentage,
    ))
}

async fn reconciled_status(
    conn: &mut SqliteConnection,
    id: &TransactionId,
    should_receive: Decimal,
) -> Result<PaymentStatus, sqlx::Error> {
    let payments = ledger::fetch_payments(conn, id).await?;
    Ok(reconcile_payment(should_receive, sum_payments(&payments)))
}

/// Recompute the profit snapshot of a completed transaction from scratch.
///
/// Keeps the stored share percentages (investor default if the record is
/// missing) and updates `transaction`'s profit and payment status in place.
/// Returns `None` and writes nothing for an ON_PROCESS transaction.
async fn reprice(
    conn: &mut SqliteConnection,
    transaction: &mut Transaction,
) -> Result<Option<ProfitSharing>, LifecycleError> {
    let sell_price = match transaction.sell_price {
        Some(price) if transaction.is_completed() => price,
        _ => return Ok(None),
    };

    let (record_id, shares) = match ledger::fetch_profit_sharing(conn, &transaction.id).await? {
        Some(existing) => (
            existing.id,
            SharePercentages::new(
                existing.investor_share_percentage,
                existing.manager_share_percentage,
            ),
        ),
        None => {
            let unit = load_unit(conn, &transaction.unit_id).await?;
            (
                ProfitSharingId::new(),
                default_shares(conn, &unit.investor_id).await?,
            )
        }
    };

    let costs = ledger::fetch_costs(conn, &transaction.id).await?;
    let settlement = Settlement::compute(transaction, &costs, sell_price, shares);
    let record = settlement.to_profit_sharing(record_id, transaction);
    ledger::replace_profit_sharing(conn, &record).await?;

    transaction.profit_status = Some(settlement.split.profit_status);
    transaction.payment_status =
        reconciled_status(conn, &transaction.id, record.investor_profit_amount).await?;

    Ok(Some(record))
}

fn active_conflict(err: sqlx::Error, unit_id: UnitId) -> LifecycleError {
    if is_unique_violation(&err) {
        LifecycleError::ActiveTransactionExists(unit_id)
    } else {
        LifecycleError::Db(err)
    }
}

// =========================================================================
// Errors
// =========================================================================

/// Coarse classification used by callers to pick a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Conflict,
    NotFound,
    Internal,
}

#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: String },
    #[error("transaction {0} is already completed")]
    AlreadyCompleted(TransactionId),
    #[error("transaction {0} is not completed")]
    NotCompleted(TransactionId),
    #[error("unit {0} already has a transaction in process")]
    ActiveTransactionExists(UnitId),
    #[error("unit {0} is sold and can only change status through its transaction")]
    UnitSold(UnitId),
    #[error("transaction {0} has no profit sharing record")]
    NoProfitSharingRecord(TransactionId),
    #[error(transparent)]
    Db(#[from] sqlx::Error),
}

impl LifecycleError {
    pub fn not_found(entity: &'static str, id: impl fmt::Display) -> Self {
        LifecycleError::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            LifecycleError::Validation(_) => ErrorKind::Validation,
            LifecycleError::NotFound { .. } | LifecycleError::NoProfitSharingRecord(_) => {
                ErrorKind::NotFound
            }
            LifecycleError::AlreadyCompleted(_)
            | LifecycleError::NotCompleted(_)
            | LifecycleError::ActiveTransactionExists(_)
            | LifecycleError::UnitSold(_) => ErrorKind::Conflict,
            LifecycleError::Db(_) => ErrorKind::Internal,
        }
    }
}
