//! Transaction lifecycle: every mutation of the ledger goes through here.

pub mod detail;
pub mod orchestrator;

pub use detail::TransactionDetail;
pub use orchestrator::{
    ErrorKind, FinalizedSale, LifecycleError, Orchestrator, RecordedPayment,
};
