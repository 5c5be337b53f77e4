//! Capital base resolution for investor and manager.

use crate::domain::{Decimal, Transaction};
use crate::engine::CostTotals;
use serde::Serialize;

/// Capital committed by each party, costs included.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Capital {
    pub total_capital_investor: Decimal,
    pub total_capital_manager: Decimal,
    pub total_capital: Decimal,
}

impl Capital {
    pub fn for_transaction(transaction: &Transaction, costs: &CostTotals) -> Self {
        resolve_capital(
            transaction.buy_price,
            transaction.initial_investor_capital,
            transaction.initial_manager_capital,
            costs,
        )
    }
}

/// The investor's base defaults to the buy price and the manager's to zero
/// unless overridden; each party's costs add to its own base.
pub fn resolve_capital(
    buy_price: Decimal,
    initial_investor_capital: Option<Decimal>,
    initial_manager_capital: Option<Decimal>,
    costs: &CostTotals,
) -> Capital {
    let base_investor = initial_investor_capital.unwrap_or(buy_price);
    let base_manager = initial_manager_capital.unwrap_or_else(Decimal::zero);

    let total_capital_investor = base_investor + costs.investor_costs;
    let total_capital_manager = base_manager + costs.manager_costs;

    Capital {
        total_capital_investor,
        total_capital_manager,
        total_capital: total_capital_investor + total_capital_manager,
    }
}
