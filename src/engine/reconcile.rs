//! Payment status reconciliation.

use crate::domain::{Decimal, PaymentHistory, PaymentStatus};

/// Remaining balance at or below this many currency units counts as paid.
pub const PAYMENT_TOLERANCE: i64 = 100;

/// Classify payouts against the amount owed to the investor.
///
/// Overpayment yields `Paid` as well.
pub fn reconcile_payment(should_receive: Decimal, total_paid: Decimal) -> PaymentStatus {
    let remaining = should_receive - total_paid;
    if remaining <= Decimal::from(PAYMENT_TOLERANCE) {
        PaymentStatus::Paid
    } else if total_paid.is_positive() {
        PaymentStatus::Partial
    } else {
        PaymentStatus::Unpaid
    }
}

pub fn sum_payments(payments: &[PaymentHistory]) -> Decimal {
    payments.iter().map(|p| p.amount).sum()
}
