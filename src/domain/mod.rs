//! Domain types for the profit-sharing ledger.
//!
//! This module provides:
//! - Lossless money handling via the Decimal wrapper
//! - Typed identifiers and text-backed status enums
//! - Investors, units, transactions, costs, profit sharing and payouts

pub mod cost;
pub mod decimal;
pub mod party;
pub mod payment;
pub mod primitives;
pub mod profit_sharing;
pub mod transaction;

pub use cost::{Cost, Payer};
pub use decimal::{Decimal, MONEY_SCALE};
pub use party::{Investor, Unit, UnitStatus};
pub use payment::{PaymentHistory, PaymentMethod};
pub use primitives::{
    CostId, InvestorId, ParseEnumError, PaymentId, ProfitSharingId, TransactionId, UnitId,
};
pub use profit_sharing::ProfitSharing;
pub use transaction::{LossBearer, PaymentStatus, ProfitStatus, Transaction, TransactionStatus};
