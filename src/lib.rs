pub mod api;
pub mod config;
pub mod db;
pub mod domain;
pub mod engine;
pub mod error;
pub mod orchestration;
pub mod sinks;
pub mod validation;

pub use config::Config;
pub use db::{init_db, Repository};
pub use domain::{
    Cost, Decimal, Investor, LossBearer, Payer, PaymentHistory, PaymentMethod, PaymentStatus,
    ProfitSharing, ProfitStatus, Transaction, TransactionStatus, Unit, UnitStatus,
};
pub use engine::{
    aggregate_costs, calculate_margin_and_split, reconcile_payment, resolve_capital, split_margin,
    Capital, CostTotals, ProfitSplit, SharePercentages, PAYMENT_TOLERANCE,
};
pub use error::AppError;
pub use orchestration::{LifecycleError, Orchestrator};
pub use sinks::{ActivitySink, NotificationSink};
pub use validation::ValidationError;
