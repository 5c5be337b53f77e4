//! Payouts made to the investor.

use crate::domain::primitives::text_enum;
use crate::domain::{Decimal, PaymentId, TransactionId};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

text_enum!(
    PaymentMethod, "payment method" {
        Transfer => "TRANSFER",
        Cash => "CASH",
    }
);

/// Append-only payout record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentHistory {
    pub id: PaymentId,
    pub transaction_id: TransactionId,
    pub amount: Decimal,
    pub payment_date: NaiveDate,
    pub method: PaymentMethod,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proof_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}
