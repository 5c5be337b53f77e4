//! Profit split snapshot taken when a transaction completes.

use crate::domain::{Decimal, ProfitSharingId, TransactionId};
use serde::{Deserialize, Serialize};

/// At most one per transaction. Replaced on re-finalization or re-pricing,
/// deleted on revert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfitSharing {
    pub id: ProfitSharingId,
    pub transaction_id: TransactionId,
    pub total_capital_investor: Decimal,
    pub total_capital_manager: Decimal,
    pub total_capital: Decimal,
    pub net_margin: Decimal,
    pub investor_share_percentage: Decimal,
    pub manager_share_percentage: Decimal,
    pub investor_profit_amount: Decimal,
    pub manager_profit_amount: Decimal,
}
