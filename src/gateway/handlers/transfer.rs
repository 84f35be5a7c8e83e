//! Transfer handler

use std::sync::Arc;

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use validator::Validate;

use super::super::state::AppState;
use super::super::types::{ApiResponse, ApiResult, TransferData, TransferRequest, created};

/// Transfer money between two accounts
///
/// POST /api/v1/transactions
///
/// Not idempotent: resubmitting the same body moves the money again.
#[utoipa::path(
    post,
    path = "/api/v1/transactions",
    request_body = TransferRequest,
    responses(
        (status = 201, description = "Transfer committed", body = ApiResponse<TransferData>),
        (status = 400, description = "Invalid amount, account id or same account"),
        (status = 404, description = "Source or destination account not found"),
        (status = 422, description = "Insufficient balance"),
        (status = 500, description = "Storage or commit failure, nothing applied"),
        (status = 503, description = "Timed out, nothing applied")
    ),
    tag = "Transfers"
)]
pub async fn create_transfer(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<TransferRequest>, JsonRejection>,
) -> ApiResult<TransferData> {
    let Json(req) = payload?;
    req.validate()?;

    let record = state
        .bank
        .transfer(
            req.source_account_id,
            req.destination_account_id,
            &req.amount,
        )
        .await?;
    Ok(created(TransferData::from(&record)))
}
