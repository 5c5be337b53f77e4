//! Net margin and profit split.

use crate::domain::{Decimal, ProfitStatus};
use serde::{Deserialize, Serialize};

/// Investor and manager shares of a positive margin, in percent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SharePercentages {
    pub investor: Decimal,
    pub manager: Decimal,
}

impl SharePercentages {
    pub fn new(investor: Decimal, manager: Decimal) -> Self {
        Self { investor, manager }
    }

    /// Investor share with the manager taking the complement.
    pub fn from_investor(investor: Decimal) -> Self {
        Self {
            investor,
            manager: Decimal::hundred() - investor,
        }
    }

    pub fn sum(&self) -> Decimal {
        self.investor + self.manager
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfitSplit {
    pub net_margin: Decimal,
    pub profit_status: ProfitStatus,
    pub investor_profit_amount: Decimal,
    pub manager_profit_amount: Decimal,
}

pub fn calculate_margin_and_split(
    sell_price: Decimal,
    total_capital: Decimal,
    shares: SharePercentages,
) -> ProfitSplit {
    split_margin(sell_price - total_capital, shares)
}

/// Split an already known net margin.
///
/// Only a positive margin is shared. The investor amount is rounded to
/// [`MONEY_SCALE`](crate::domain::MONEY_SCALE) digits and the manager receives
/// the residual, so the two amounts always add up to the margin exactly.
/// Losses and break-even produce zero for both parties.
pub fn split_margin(net_margin: Decimal, shares: SharePercentages) -> ProfitSplit {
    if net_margin.is_positive() {
        let investor_profit_amount = (net_margin * shares.investor / Decimal::hundred()).round_money();
        ProfitSplit {
            net_margin,
            profit_status: ProfitStatus::Profit,
            investor_profit_amount,
            manager_profit_amount: net_margin - investor_profit_amount,
        }
    } else {
        let profit_status = if net_margin.is_negative() {
            ProfitStatus::Loss
        } else {
            ProfitStatus::BreakEven
        };
        ProfitSplit {
            net_margin,
            profit_status,
            investor_profit_amount: Decimal::zero(),
            manager_profit_amount: Decimal::zero(),
        }
    }
}
