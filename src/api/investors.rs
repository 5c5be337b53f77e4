use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

use super::{json_body, parse_id, AppState};
use crate::domain::{Investor, InvestorId};
use crate::error::AppError;
use crate::validation::CreateInvestorRequest;

pub async fn create_investor(
    State(state): State<AppState>,
    body: Result<Json<CreateInvestorRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Investor>), AppError> {
    let input = json_body(body)?.validate()?;
    let investor = state.orchestrator.create_investor(input).await?;
    Ok((StatusCode::CREATED, Json(investor)))
}

pub async fn get_investor(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<Investor>, AppError> {
    let id: InvestorId = parse_id("investor", &id)?;
    state
        .repo
        .get_investor(&id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("investor {} not found", id)))
}
