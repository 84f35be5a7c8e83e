//! API Response types and error codes
//!
//! - `ApiResponse<T>`: Unified response wrapper
//! - `ApiError`: Error response carrying its HTTP status
//! - `error_codes`: Standard error code constants

use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use utoipa::ToSchema;
use validator::ValidationErrors;

use crate::account::AccountError;
use crate::transfer::TransferError;

// ============================================================================
// Unified API Response Format
// ============================================================================

/// Unified API response wrapper
///
/// All API responses follow this structure:
/// - code: 0 = success, non-zero = error code
/// - msg: short message description
/// - data: actual data (success) or null (error)
#[derive(Debug, Serialize, ToSchema)]
pub struct ApiResponse<T> {
    /// Response code: 0 for success, non-zero for errors
    #[schema(example = 0)]
    pub code: i32,
    /// Response message
    #[schema(example = "ok")]
    pub msg: String,
    /// Response data (only present when code == 0)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    /// Create success response
    pub fn success(data: T) -> Self {
        Self {
            code: error_codes::SUCCESS,
            msg: "ok".to_string(),
            data: Some(data),
        }
    }

    /// Create error response
    pub fn error(code: i32, msg: impl Into<String>) -> ApiResponse<()> {
        ApiResponse {
            code,
            msg: msg.into(),
            data: None,
        }
    }
}

/// Handler return type
pub type ApiResult<T> = Result<(StatusCode, Json<ApiResponse<T>>), ApiError>;

/// 200 OK with data
pub fn ok<T>(data: T) -> (StatusCode, Json<ApiResponse<T>>) {
    (StatusCode::OK, Json(ApiResponse::success(data)))
}

/// 201 Created with data
pub fn created<T>(data: T) -> (StatusCode, Json<ApiResponse<T>>) {
    (StatusCode::CREATED, Json(ApiResponse::success(data)))
}

// ============================================================================
// Errors
// ============================================================================

/// Error response: HTTP status + envelope code + message
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    code: i32,
    msg: String,
}

impl ApiError {
    pub fn new(status: StatusCode, code: i32, msg: impl Into<String>) -> Self {
        Self {
            status,
            code,
            msg: msg.into(),
        }
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, error_codes::INVALID_PARAMETER, msg)
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn code(&self) -> i32 {
        self.code
    }

    pub fn msg(&self) -> &str {
        &self.msg
    }

    /// Map a domain error, hiding infrastructure details from clients
    fn from_domain(http_status: u16, code: i32, detail: String) -> Self {
        let status = StatusCode::from_u16(http_status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), "request failed: {}", detail);
            let msg = match status {
                StatusCode::SERVICE_UNAVAILABLE => "service unavailable, no changes were applied",
                _ => "internal error, no changes were applied",
            };
            return Self::new(status, code, msg);
        }
        Self::new(status, code, detail)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(ApiResponse::<()>::error(self.code, self.msg))).into_response()
    }
}

impl From<AccountError> for ApiError {
    fn from(e: AccountError) -> Self {
        let code = match &e {
            AccountError::InvalidAmount(_) => error_codes::INVALID_AMOUNT,
            AccountError::InvalidAccountId(_) => error_codes::INVALID_PARAMETER,
            AccountError::DuplicateAccount(_) => error_codes::DUPLICATE_ACCOUNT,
            AccountError::NotFound(_) => error_codes::ACCOUNT_NOT_FOUND,
            AccountError::Store(_) => error_codes::INTERNAL_ERROR,
        };
        Self::from_domain(e.http_status(), code, e.to_string())
    }
}

impl From<TransferError> for ApiError {
    fn from(e: TransferError) -> Self {
        let code = match &e {
            TransferError::InvalidAmount(_) => error_codes::INVALID_AMOUNT,
            TransferError::InvalidAccountId(_) => error_codes::INVALID_PARAMETER,
            TransferError::SameAccount => error_codes::SAME_ACCOUNT,
            TransferError::SourceAccountNotFound(_)
            | TransferError::DestinationAccountNotFound(_) => error_codes::ACCOUNT_NOT_FOUND,
            TransferError::InsufficientBalance { .. } => error_codes::INSUFFICIENT_BALANCE,
            TransferError::Overflow => error_codes::INVALID_AMOUNT,
            TransferError::Store(_) => error_codes::INTERNAL_ERROR,
            TransferError::CommitFailure(_) => error_codes::COMMIT_FAILURE,
            TransferError::Timeout => error_codes::SERVICE_UNAVAILABLE,
        };
        Self::from_domain(e.http_status(), code, e.to_string())
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(e: ValidationErrors) -> Self {
        Self::bad_request(e.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(e: JsonRejection) -> Self {
        Self::bad_request(e.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(e: PathRejection) -> Self {
        Self::bad_request(e.body_text())
    }
}

// ============================================================================
// Error Codes
// ============================================================================

/// Standard API error codes
pub mod error_codes {
    // Success
    pub const SUCCESS: i32 = 0;

    // Client errors (1xxx)
    pub const INVALID_PARAMETER: i32 = 1001;
    pub const INSUFFICIENT_BALANCE: i32 = 1002;
    pub const INVALID_AMOUNT: i32 = 1003;
    pub const SAME_ACCOUNT: i32 = 1004;

    // Resource errors (4xxx)
    pub const ACCOUNT_NOT_FOUND: i32 = 4001;
    pub const DUPLICATE_ACCOUNT: i32 = 4091;

    // Server errors (5xxx)
    pub const INTERNAL_ERROR: i32 = 5000;
    pub const SERVICE_UNAVAILABLE: i32 = 5001;
    pub const COMMIT_FAILURE: i32 = 5002;
}
