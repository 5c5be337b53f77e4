pub mod health;
pub mod investors;
pub mod payments;
pub mod transactions;
pub mod units;

use crate::db::Repository;
use crate::error::AppError;
use crate::orchestration::Orchestrator;
use axum::extract::rejection::JsonRejection;
use axum::{
    routing::{delete, get, post, put},
    Json, Router,
};
use std::str::FromStr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<Repository>,
    pub orchestrator: Arc<Orchestrator>,
}

impl AppState {
    pub fn new(orchestrator: Arc<Orchestrator>) -> Self {
        Self {
            repo: orchestrator.repo().clone(),
            orchestrator,
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health::health))
        .route("/ready", get(health::ready))
        .route("/v1/investors", post(investors::create_investor))
        .route("/v1/investors/:id", get(investors::get_investor))
        .route("/v1/units", post(units::create_unit))
        .route("/v1/units/:id", get(units::get_unit))
        .route("/v1/units/:id/status", put(units::set_unit_status))
        .route("/v1/transactions", post(transactions::create_transaction))
        .route(
            "/v1/transactions/:id",
            get(transactions::get_transaction)
                .patch(transactions::update_transaction)
                .delete(transactions::delete_transaction),
        )
        .route(
            "/v1/transactions/:id/finalize",
            post(transactions::finalize_transaction),
        )
        .route(
            "/v1/transactions/:id/revert",
            post(transactions::revert_transaction),
        )
        .route("/v1/transactions/:id/shares", put(transactions::update_shares))
        .route("/v1/transactions/:id/costs", post(transactions::add_cost))
        .route(
            "/v1/transactions/:id/costs/:cost_id",
            delete(transactions::delete_cost),
        )
        .route(
            "/v1/transactions/:id/payments",
            post(payments::record_payment),
        )
        .layer(cors)
        .with_state(state)
}

/// Parse an identifier from a path segment.
pub(crate) fn parse_id<T>(kind: &str, raw: &str) -> Result<T, AppError>
where
    T: FromStr,
{
    T::from_str(raw).map_err(|_| AppError::BadRequest(format!("invalid {} id: {}", kind, raw)))
}

/// Unwrap a JSON body, reporting malformed payloads as 400.
pub(crate) fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    body.map(|Json(value)| value)
        .map_err(|rejection| AppError::BadRequest(rejection.body_text()))
}
