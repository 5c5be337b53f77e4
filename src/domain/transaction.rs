//! One buy-then-sell cycle of a unit.

use crate::domain::primitives::text_enum;
use crate::domain::{Decimal, TransactionId, UnitId};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

text_enum!(
    /// Lifecycle state of a transaction.
    TransactionStatus, "transaction status" {
        /// Bought, not yet sold.
        OnProcess => "ON_PROCESS",
        /// Sold; a profit sharing record exists.
        Completed => "COMPLETED",
    }
);

text_enum!(
    /// Sign of the net margin at finalization.
    ProfitStatus, "profit status" {
        Profit => "PROFIT",
        Loss => "LOSS",
        BreakEven => "BREAK_EVEN",
    }
);

text_enum!(
    /// How much of the investor's owed profit has been paid out.
    PaymentStatus, "payment status" {
        Unpaid => "UNPAID",
        Partial => "PARTIAL",
        Paid => "PAID",
    }
);

text_enum!(
    /// Who absorbs a loss. Informational only; no calculation reads it.
    LossBearer, "loss bearer" {
        Investor => "INVESTOR",
        Manager => "MANAGER",
        Shared => "SHARED",
    }
);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: TransactionId,
    pub unit_id: UnitId,
    pub buy_price: Decimal,
    pub buy_date: NaiveDate,
    pub sell_price: Option<Decimal>,
    pub sell_date: Option<NaiveDate>,
    pub status: TransactionStatus,
    /// Overrides the investor's base capital, which otherwise equals `buy_price`.
    pub initial_investor_capital: Option<Decimal>,
    /// Overrides the manager's base capital, which otherwise is zero.
    pub initial_manager_capital: Option<Decimal>,
    pub profit_status: Option<ProfitStatus>,
    pub payment_status: PaymentStatus,
    pub loss_bearer: Option<LossBearer>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Transaction {
    pub fn is_completed(&self) -> bool {
        self.status == TransactionStatus::Completed
    }
}
