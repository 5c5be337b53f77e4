//! Pure computation engine for the profit-sharing ledger.
//!
//! Every function here is deterministic and free of I/O; the orchestrator
//! feeds it stored records and persists the results.

use crate::domain::{Cost, Decimal, ProfitSharing, ProfitSharingId, Transaction};

pub mod capital;
pub mod costs;
pub mod reconcile;
pub mod split;

pub use capital::{resolve_capital, Capital};
pub use costs::{aggregate_costs, CostTotals};
pub use reconcile::{reconcile_payment, sum_payments, PAYMENT_TOLERANCE};
pub use split::{calculate_margin_and_split, split_margin, ProfitSplit, SharePercentages};

/// Full calculation for one transaction at a given sell price.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settlement {
    pub cost_totals: CostTotals,
    pub capital: Capital,
    pub shares: SharePercentages,
    pub split: ProfitSplit,
}

impl Settlement {
    /// Aggregate costs, resolve capital and split the margin.
    pub fn compute(
        transaction: &Transaction,
        costs: &[Cost],
        sell_price: Decimal,
        shares: SharePercentages,
    ) -> Self {
        let cost_totals = aggregate_costs(costs);
        let capital = Capital::for_transaction(transaction, &cost_totals);
        let split = calculate_margin_and_split(sell_price, capital.total_capital, shares);
        Settlement {
            cost_totals,
            capital,
            shares,
            split,
        }
    }

    pub fn to_profit_sharing(&self, id: ProfitSharingId, transaction: &Transaction) -> ProfitSharing {
        ProfitSharing {
            id,
            transaction_id: transaction.id,
            total_capital_investor: self.capital.total_capital_investor,
            total_capital_manager: self.capital.total_capital_manager,
            total_capital: self.capital.total_capital,
            net_margin: self.split.net_margin,
            investor_share_percentage: self.shares.investor,
            manager_share_percentage: self.shares.manager,
            investor_profit_amount: self.split.investor_profit_amount,
            manager_profit_amount: self.split.manager_profit_amount,
        }
    }
}

/// Recompute profit amounts of an existing record from its stored margin.
///
/// Capital and net margin stay frozen.
pub fn reshare(record: &ProfitSharing, shares: SharePercentages) -> ProfitSharing {
    let split = split_margin(record.net_margin, shares);
    ProfitSharing {
        investor_share_percentage: shares.investor,
        manager_share_percentage: shares.manager,
        investor_profit_amount: split.investor_profit_amount,
        manager_profit_amount: split.manager_profit_amount,
        ..record.clone()
    }
}
