use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

use super::{json_body, parse_id, AppState};
use crate::domain::{Transaction, Unit, UnitId};
use crate::error::AppError;
use crate::validation::{CreateUnitRequest, UnitStatusRequest};

/// A unit with its buy/sell history.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitResponse {
    #[serde(flatten)]
    pub unit: Unit,
    pub transactions: Vec<Transaction>,
}

pub async fn create_unit(
    State(state): State<AppState>,
    body: Result<Json<CreateUnitRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Unit>), AppError> {
    let input = json_body(body)?.validate()?;
    let unit = state.orchestrator.create_unit(input).await?;
    Ok((StatusCode::CREATED, Json(unit)))
}

pub async fn get_unit(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<UnitResponse>, AppError> {
    let id: UnitId = parse_id("unit", &id)?;
    let unit = state
        .repo
        .get_unit(&id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("unit {} not found", id)))?;
    let transactions = state.repo.list_unit_transactions(&id).await?;

    Ok(Json(UnitResponse { unit, transactions }))
}

pub async fn set_unit_status(
    Path(id): Path<String>,
    State(state): State<AppState>,
    body: Result<Json<UnitStatusRequest>, JsonRejection>,
) -> Result<Json<Unit>, AppError> {
    let id: UnitId = parse_id("unit", &id)?;
    let status = json_body(body)?.validate()?;
    let unit = state.orchestrator.set_unit_status(&id, status).await?;
    Ok(Json(unit))
}
