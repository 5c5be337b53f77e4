//! Request validation shared by every lifecycle operation.
//!
//! Raw request payloads (`*Request`) are deserialized by the API layer and
//! turned into typed inputs here. The orchestrator only accepts the typed
//! inputs, so each rule lives in exactly one place.

use crate::domain::{
    Decimal, InvestorId, LossBearer, Payer, PaymentMethod, Transaction, UnitId, UnitStatus,
};
use crate::engine::SharePercentages;
use chrono::NaiveDate;
use serde::Deserialize;
use thiserror::Error;

const MAX_NAME_LEN: usize = 200;
const MAX_TEXT_LEN: usize = 2000;

/// Upper bound for any money field. Keeps every sum and product the engine
/// derives from stored amounts inside `Decimal`'s range.
pub const MAX_AMOUNT: i64 = 1_000_000_000_000_000_000;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field} is required")]
    Required { field: &'static str },
    #[error("{field} must not be negative")]
    Negative { field: &'static str },
    #[error("{field} must be greater than zero")]
    NotPositive { field: &'static str },
    #[error("{field} must not exceed {max}")]
    TooLarge { field: &'static str, max: i64 },
    #[error("{field} must be between 0 and 100")]
    PercentageOutOfRange { field: &'static str },
    #[error("share percentages must sum to 100, got {investor} + {manager}")]
    SharesDoNotSumTo100 { investor: Decimal, manager: Decimal },
    #[error("{field} is too long (max {max} characters)")]
    TooLong { field: &'static str, max: usize },
    #[error("{field}: {reason}")]
    Invalid { field: &'static str, reason: String },
    #[error("sell price and sell date are required to finalize a sale")]
    MissingSaleData,
}

pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Field validators
// =============================================================================

fn required_text(field: &'static str, value: String, max: usize) -> ValidationResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Required { field });
    }
    if trimmed.chars().count() > max {
        return Err(ValidationError::TooLong { field, max });
    }
    Ok(trimmed.to_string())
}

/// Blank optional text collapses to `None`.
fn optional_text(
    field: &'static str,
    value: Option<String>,
    max: usize,
) -> ValidationResult<Option<String>> {
    match value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty()) {
        Some(v) if v.chars().count() > max => Err(ValidationError::TooLong { field, max }),
        other => Ok(other),
    }
}

fn bounded(field: &'static str, value: Decimal) -> ValidationResult<Decimal> {
    if value > Decimal::from(MAX_AMOUNT) {
        return Err(ValidationError::TooLarge {
            field,
            max: MAX_AMOUNT,
        });
    }
    Ok(value)
}

pub fn non_negative(field: &'static str, value: Decimal) -> ValidationResult<Decimal> {
    if value.is_negative() {
        return Err(ValidationError::Negative { field });
    }
    bounded(field, value)
}

pub fn positive(field: &'static str, value: Decimal) -> ValidationResult<Decimal> {
    if !value.is_positive() {
        return Err(ValidationError::NotPositive { field });
    }
    bounded(field, value)
}

pub fn percentage(field: &'static str, value: Decimal) -> ValidationResult<Decimal> {
    if value.is_negative() || value > Decimal::hundred() {
        return Err(ValidationError::PercentageOutOfRange { field });
    }
    Ok(value)
}

/// Both shares in range and summing to exactly 100.
pub fn share_percentages(investor: Decimal, manager: Decimal) -> ValidationResult<SharePercentages> {
    let investor = percentage("investorSharePercentage", investor)?;
    let manager = percentage("managerSharePercentage", manager)?;
    let shares = SharePercentages::new(investor, manager);
    if shares.sum() != Decimal::hundred() {
        return Err(ValidationError::SharesDoNotSumTo100 { investor, manager });
    }
    Ok(shares)
}

/// Either share may be omitted, in which case it is the complement of the other.
fn optional_share_percentages(
    investor: Option<Decimal>,
    manager: Option<Decimal>,
) -> ValidationResult<Option<SharePercentages>> {
    match (investor, manager) {
        (None, None) => Ok(None),
        (Some(investor), Some(manager)) => share_percentages(investor, manager).map(Some),
        (Some(investor), None) => {
            let investor = percentage("investorSharePercentage", investor)?;
            Ok(Some(SharePercentages::from_investor(investor)))
        }
        (None, Some(manager)) => {
            let manager = percentage("managerSharePercentage", manager)?;
            Ok(Some(SharePercentages::new(
                Decimal::hundred() - manager,
                manager,
            )))
        }
    }
}

fn not_before_buy_date(buy_date: NaiveDate, sell_date: NaiveDate) -> ValidationResult<NaiveDate> {
    if sell_date < buy_date {
        return Err(ValidationError::Invalid {
            field: "sellDate",
            reason: format!("{} is before buy date {}", sell_date, buy_date),
        });
    }
    Ok(sell_date)
}

// =============================================================================
// Parties
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateInvestorRequest {
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub profit_share_percentage: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewInvestor {
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub profit_share_percentage: Decimal,
}

impl CreateInvestorRequest {
    pub fn validate(self) -> ValidationResult<NewInvestor> {
        Ok(NewInvestor {
            name: required_text("name", self.name, MAX_NAME_LEN)?,
            phone: optional_text("phone", self.phone, 50)?,
            email: optional_text("email", self.email, MAX_NAME_LEN)?,
            profit_share_percentage: percentage(
                "profitSharePercentage",
                self.profit_share_percentage,
            )?,
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUnitRequest {
    pub investor_id: InvestorId,
    pub name: String,
    pub plate_number: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUnit {
    pub investor_id: InvestorId,
    pub name: String,
    pub plate_number: Option<String>,
}

impl CreateUnitRequest {
    pub fn validate(self) -> ValidationResult<NewUnit> {
        Ok(NewUnit {
            investor_id: self.investor_id,
            name: required_text("name", self.name, MAX_NAME_LEN)?,
            plate_number: optional_text("plateNumber", self.plate_number, 20)?,
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitStatusRequest {
    pub status: UnitStatus,
}

impl UnitStatusRequest {
    /// SOLD is set only by finalizing a transaction.
    pub fn validate(self) -> ValidationResult<UnitStatus> {
        if self.status == UnitStatus::Sold {
            return Err(ValidationError::Invalid {
                field: "status",
                reason: "SOLD is set by finalizing a transaction".to_string(),
            });
        }
        Ok(self.status)
    }
}

// =============================================================================
// Transactions
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTransactionRequest {
    pub unit_id: UnitId,
    pub buy_price: Decimal,
    pub buy_date: NaiveDate,
    pub initial_investor_capital: Option<Decimal>,
    pub initial_manager_capital: Option<Decimal>,
    pub loss_bearer: Option<LossBearer>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTransaction {
    pub unit_id: UnitId,
    pub buy_price: Decimal,
    pub buy_date: NaiveDate,
    pub initial_investor_capital: Option<Decimal>,
    pub initial_manager_capital: Option<Decimal>,
    pub loss_bearer: Option<LossBearer>,
    pub notes: Option<String>,
}

impl CreateTransactionRequest {
    pub fn validate(self) -> ValidationResult<NewTransaction> {
        Ok(NewTransaction {
            unit_id: self.unit_id,
            buy_price: positive("buyPrice", self.buy_price)?,
            buy_date: self.buy_date,
            initial_investor_capital: self
                .initial_investor_capital
                .map(|v| non_negative("initialInvestorCapital", v))
                .transpose()?,
            initial_manager_capital: self
                .initial_manager_capital
                .map(|v| non_negative("initialManagerCapital", v))
                .transpose()?,
            loss_bearer: self.loss_bearer,
            notes: optional_text("notes", self.notes, MAX_TEXT_LEN)?,
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTransactionRequest {
    pub buy_price: Option<Decimal>,
    pub buy_date: Option<NaiveDate>,
    pub sell_price: Option<Decimal>,
    pub sell_date: Option<NaiveDate>,
    pub initial_investor_capital: Option<Decimal>,
    pub initial_manager_capital: Option<Decimal>,
    pub loss_bearer: Option<LossBearer>,
    pub notes: Option<String>,
}

/// Fields to overwrite on a transaction; `None` leaves the stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransactionPatch {
    pub buy_price: Option<Decimal>,
    pub buy_date: Option<NaiveDate>,
    pub sell_price: Option<Decimal>,
    pub sell_date: Option<NaiveDate>,
    pub initial_investor_capital: Option<Decimal>,
    pub initial_manager_capital: Option<Decimal>,
    pub loss_bearer: Option<LossBearer>,
    pub notes: Option<String>,
}

impl UpdateTransactionRequest {
    pub fn validate(self) -> ValidationResult<TransactionPatch> {
        Ok(TransactionPatch {
            buy_price: self.buy_price.map(|v| positive("buyPrice", v)).transpose()?,
            buy_date: self.buy_date,
            sell_price: self.sell_price.map(|v| positive("sellPrice", v)).transpose()?,
            sell_date: self.sell_date,
            initial_investor_capital: self
                .initial_investor_capital
                .map(|v| non_negative("initialInvestorCapital", v))
                .transpose()?,
            initial_manager_capital: self
                .initial_manager_capital
                .map(|v| non_negative("initialManagerCapital", v))
                .transpose()?,
            loss_bearer: self.loss_bearer,
            notes: optional_text("notes", self.notes, MAX_TEXT_LEN)?,
        })
    }
}

impl TransactionPatch {
    /// Produce the patched transaction, checking that dates stay ordered.
    pub fn apply(&self, current: &Transaction) -> ValidationResult<Transaction> {
        let buy_date = self.buy_date.unwrap_or(current.buy_date);
        let sell_date = self
            .sell_date
            .or(current.sell_date)
            .map(|sell| not_before_buy_date(buy_date, sell))
            .transpose()?;

        Ok(Transaction {
            buy_price: self.buy_price.unwrap_or(current.buy_price),
            buy_date,
            sell_price: self.sell_price.or(current.sell_price),
            sell_date,
            initial_investor_capital: self
                .initial_investor_capital
                .or(current.initial_investor_capital),
            initial_manager_capital: self
                .initial_manager_capital
                .or(current.initial_manager_capital),
            loss_bearer: self.loss_bearer.or(current.loss_bearer),
            notes: self.notes.clone().or_else(|| current.notes.clone()),
            ..current.clone()
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinalizeRequest {
    pub sell_price: Option<Decimal>,
    pub sell_date: Option<NaiveDate>,
    pub investor_share_percentage: Option<Decimal>,
    pub manager_share_percentage: Option<Decimal>,
}

/// Sale data for finalization. Missing sell fields fall back to values already
/// stored on the transaction; missing shares fall back to the investor default.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SaleInput {
    pub sell_price: Option<Decimal>,
    pub sell_date: Option<NaiveDate>,
    pub shares: Option<SharePercentages>,
}

impl FinalizeRequest {
    pub fn validate(self) -> ValidationResult<SaleInput> {
        Ok(SaleInput {
            sell_price: self.sell_price.map(|v| positive("sellPrice", v)).transpose()?,
            sell_date: self.sell_date,
            shares: optional_share_percentages(
                self.investor_share_percentage,
                self.manager_share_percentage,
            )?,
        })
    }
}

impl SaleInput {
    /// Resolve the sell price and date against the stored transaction.
    pub fn resolve_sale(&self, transaction: &Transaction) -> ValidationResult<(Decimal, NaiveDate)> {
        let sell_price = self.sell_price.or(transaction.sell_price);
        let sell_date = self.sell_date.or(transaction.sell_date);
        match (sell_price, sell_date) {
            (Some(price), Some(date)) => {
                let price = positive("sellPrice", price)?;
                let date = not_before_buy_date(transaction.buy_date, date)?;
                Ok((price, date))
            }
            _ => Err(ValidationError::MissingSaleData),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSharesRequest {
    pub investor_share_percentage: Decimal,
    pub manager_share_percentage: Decimal,
}

impl UpdateSharesRequest {
    pub fn validate(self) -> ValidationResult<SharePercentages> {
        share_percentages(self.investor_share_percentage, self.manager_share_percentage)
    }
}

// =============================================================================
// Costs and payments
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddCostRequest {
    pub amount: Decimal,
    pub payer: Payer,
    pub category: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCost {
    pub amount: Decimal,
    pub payer: Payer,
    pub category: String,
    pub description: Option<String>,
}

impl AddCostRequest {
    pub fn validate(self) -> ValidationResult<NewCost> {
        Ok(NewCost {
            amount: non_negative("amount", self.amount)?,
            payer: self.payer,
            category: required_text("category", self.category, MAX_NAME_LEN)?,
            description: optional_text("description", self.description, MAX_TEXT_LEN)?,
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordPaymentRequest {
    pub amount: Decimal,
    pub payment_date: NaiveDate,
    pub method: PaymentMethod,
    pub proof_url: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPayment {
    pub amount: Decimal,
    pub payment_date: NaiveDate,
    pub method: PaymentMethod,
    pub proof_url: Option<String>,
    pub notes: Option<String>,
}

impl RecordPaymentRequest {
    pub fn validate(self) -> ValidationResult<NewPayment> {
        Ok(NewPayment {
            amount: positive("amount", self.amount)?,
            payment_date: self.payment_date,
            method: self.method,
            proof_url: optional_text("proofUrl", self.proof_url, MAX_TEXT_LEN)?,
            notes: optional_text("notes", self.notes, MAX_TEXT_LEN)?,
        })
    }
}
