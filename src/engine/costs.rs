//! Cost aggregation by payer.

use crate::domain::{Cost, Decimal, Payer};
use serde::Serialize;

/// Per-payer cost sums for one transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CostTotals {
    pub investor_costs: Decimal,
    pub manager_costs: Decimal,
    pub total_costs: Decimal,
}

/// Partition costs by payer and sum each bucket. An empty slice yields zeros.
pub fn aggregate_costs(costs: &[Cost]) -> CostTotals {
    let mut investor_costs = Decimal::zero();
    let mut manager_costs = Decimal::zero();

    for cost in costs {
        match cost.payer {
            Payer::Investor => investor_costs = investor_costs + cost.amount,
            Payer::Manager => manager_costs = manager_costs + cost.amount,
        }
    }

    CostTotals {
        investor_costs,
        manager_costs,
        total_costs: investor_costs + manager_costs,
    }
}
