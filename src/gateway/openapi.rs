//! OpenAPI Documentation
//!
//! Auto-generated OpenAPI 3 document for the transfer API, served at
//! `GET /api-docs/openapi.json`.

use axum::Json;
use utoipa::OpenApi;

use crate::gateway::handlers::HealthResponse;
use crate::gateway::types::{AccountData, CreateAccountRequest, TransferData, TransferRequest};

/// Main API Documentation struct
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Internal Transfer API",
        version = "1.0.0",
        description = "Accounts and atomic balance transfers with an append-only ledger. Amounts are exact decimal strings.",
        license(
            name = "MIT"
        )
    ),
    servers(
        (url = "http://localhost:8080", description = "Development"),
    ),
    paths(
        crate::gateway::handlers::health::health_check,
        crate::gateway::handlers::account::create_account,
        crate::gateway::handlers::account::get_account,
        crate::gateway::handlers::account::get_account_transactions,
        crate::gateway::handlers::transfer::create_transfer,
    ),
    components(
        schemas(
            HealthResponse,
            CreateAccountRequest,
            AccountData,
            TransferRequest,
            TransferData,
        )
    ),
    tags(
        (name = "System", description = "Health"),
        (name = "Accounts", description = "Account lifecycle and history"),
        (name = "Transfers", description = "Atomic transfers between accounts"),
    )
)]
pub struct ApiDoc;

/// GET /api-docs/openapi.json
pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
