use axum::body::Bytes;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

use super::{json_body, parse_id, AppState};
use crate::domain::{Cost, CostId, ProfitSharing, Transaction, TransactionId};
use crate::error::AppError;
use crate::orchestration::{FinalizedSale, TransactionDetail};
use crate::validation::{
    AddCostRequest, CreateTransactionRequest, FinalizeRequest, UpdateSharesRequest,
    UpdateTransactionRequest,
};

fn transaction_id(raw: &str) -> Result<TransactionId, AppError> {
    parse_id("transaction", raw)
}

pub async fn create_transaction(
    State(state): State<AppState>,
    body: Result<Json<CreateTransactionRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Transaction>), AppError> {
    let input = json_body(body)?.validate()?;
    let transaction = state.orchestrator.create_transaction(input).await?;
    Ok((StatusCode::CREATED, Json(transaction)))
}

pub async fn get_transaction(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<TransactionDetail>, AppError> {
    let id = transaction_id(&id)?;
    let detail = state.orchestrator.transaction_detail(&id).await?;
    Ok(Json(detail))
}

pub async fn update_transaction(
    Path(id): Path<String>,
    State(state): State<AppState>,
    body: Result<Json<UpdateTransactionRequest>, JsonRejection>,
) -> Result<Json<Transaction>, AppError> {
    let id = transaction_id(&id)?;
    let patch = json_body(body)?.validate()?;
    let transaction = state.orchestrator.update_transaction(&id, patch).await?;
    Ok(Json(transaction))
}

pub async fn delete_transaction(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<StatusCode, AppError> {
    let id = transaction_id(&id)?;
    state.orchestrator.delete_transaction(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// An empty body finalizes with the stored sell data and default shares.
pub async fn finalize_transaction(
    Path(id): Path<String>,
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<FinalizedSale>, AppError> {
    let id = transaction_id(&id)?;
    let request: FinalizeRequest = if body.iter().all(u8::is_ascii_whitespace) {
        FinalizeRequest::default()
    } else {
        serde_json::from_slice(&body).map_err(|e| AppError::BadRequest(e.to_string()))?
    };
    let sale = state
        .orchestrator
        .finalize_transaction(&id, request.validate()?)
        .await?;
    Ok(Json(sale))
}

pub async fn revert_transaction(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<Transaction>, AppError> {
    let id = transaction_id(&id)?;
    let transaction = state.orchestrator.revert_transaction(&id).await?;
    Ok(Json(transaction))
}

pub async fn update_shares(
    Path(id): Path<String>,
    State(state): State<AppState>,
    body: Result<Json<UpdateSharesRequest>, JsonRejection>,
) -> Result<Json<ProfitSharing>, AppError> {
    let id = transaction_id(&id)?;
    let shares = json_body(body)?.validate()?;
    let record = state.orchestrator.update_shares(&id, shares).await?;
    Ok(Json(record))
}

pub async fn add_cost(
    Path(id): Path<String>,
    State(state): State<AppState>,
    body: Result<Json<AddCostRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Cost>), AppError> {
    let id = transaction_id(&id)?;
    let input = json_body(body)?.validate()?;
    let cost = state.orchestrator.add_cost(&id, input).await?;
    Ok((StatusCode::CREATED, Json(cost)))
}

pub async fn delete_cost(
    Path((id, cost_id)): Path<(String, String)>,
    State(state): State<AppState>,
) -> Result<StatusCode, AppError> {
    let id = transaction_id(&id)?;
    let cost_id: CostId = parse_id("cost", &cost_id)?;
    state.orchestrator.delete_cost(&id, &cost_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
