//! Itemized operational costs.

use crate::domain::primitives::text_enum;
use crate::domain::{CostId, Decimal, TransactionId};
use serde::{Deserialize, Serialize};

text_enum!(
    /// The party that paid a cost; the amount adds to that party's capital.
    Payer, "payer" {
        Investor => "INVESTOR",
        Manager => "MANAGER",
    }
);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cost {
    pub id: CostId,
    pub transaction_id: TransactionId,
    pub amount: Decimal,
    pub payer: Payer,
    /// Free-form category such as "repair" or "paperwork".
    pub category: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}
