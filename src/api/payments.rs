use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

use super::{json_body, parse_id, AppState};
use crate::domain::TransactionId;
use crate::error::AppError;
use crate::orchestration::RecordedPayment;
use crate::validation::RecordPaymentRequest;

pub async fn record_payment(
    Path(id): Path<String>,
    State(state): State<AppState>,
    body: Result<Json<RecordPaymentRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<RecordedPayment>), AppError> {
    let id: TransactionId = parse_id("transaction", &id)?;
    let input = json_body(body)?.validate()?;
    let recorded = state.orchestrator.record_payment(&id, input).await?;
    Ok((StatusCode::CREATED, Json(recorded)))
}
