//! Account handlers

use std::sync::Arc;

use axum::{
    Json,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
};
use validator::Validate;

use super::super::state::AppState;
use super::super::types::{
    AccountData, ApiResponse, ApiResult, CreateAccountRequest, TransferData, created, ok,
};

/// Create an account
///
/// POST /api/v1/accounts
#[utoipa::path(
    post,
    path = "/api/v1/accounts",
    request_body = CreateAccountRequest,
    responses(
        (status = 201, description = "Account created", body = ApiResponse<AccountData>),
        (status = 400, description = "Invalid account id or initial balance"),
        (status = 409, description = "Account already exists"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Accounts"
)]
pub async fn create_account(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CreateAccountRequest>, JsonRejection>,
) -> ApiResult<AccountData> {
    let Json(req) = payload?;
    req.validate()?;

    let account = state
        .bank
        .create_account(req.account_id, req.initial_balance.as_deref())
        .await?;
    Ok(created(AccountData::from(&account)))
}

/// Get an account snapshot
///
/// GET /api/v1/accounts/{account_id}
#[utoipa::path(
    get,
    path = "/api/v1/accounts/{account_id}",
    params(
        ("account_id" = i64, Path, description = "Account id")
    ),
    responses(
        (status = 200, description = "Account snapshot", body = ApiResponse<AccountData>),
        (status = 400, description = "Invalid account id"),
        (status = 404, description = "Account not found")
    ),
    tag = "Accounts"
)]
pub async fn get_account(
    State(state): State<Arc<AppState>>,
    account_id: Result<Path<i64>, PathRejection>,
) -> ApiResult<AccountData> {
    let Path(account_id) = account_id?;
    let account = state.bank.get_account(account_id).await?;
    Ok(ok(AccountData::from(&account)))
}

/// Ledger entries where the account is source or destination
///
/// GET /api/v1/accounts/{account_id}/transactions
#[utoipa::path(
    get,
    path = "/api/v1/accounts/{account_id}/transactions",
    params(
        ("account_id" = i64, Path, description = "Account id")
    ),
    responses(
        (status = 200, description = "Transfers, oldest first", body = ApiResponse<Vec<TransferData>>),
        (status = 400, description = "Invalid account id"),
        (status = 404, description = "Account not found")
    ),
    tag = "Accounts"
)]
pub async fn get_account_transactions(
    State(state): State<Arc<AppState>>,
    account_id: Result<Path<i64>, PathRejection>,
) -> ApiResult<Vec<TransferData>> {
    let Path(account_id) = account_id?;
    let records = state.bank.account_transfers(account_id).await?;
    Ok(ok(records.iter().map(TransferData::from).collect()))
}
