//! # API Errors
//!
//! Every failure leaves the server as a JSON body with a stable code:
//!
//! ```text
//! { "error": { "code": "mixed_currency", "message": "...", "order_id": null } }
//! ```
//!
//! ## Status Mapping
//! ```text
//! ValidationFailed                          → 400
//! NotFound                                  → 404
//! MixedCurrency                             → 422
//! InvalidTransition / OrderNotPending /
//! Conflict / NoPaymentSession               → 409
//! ProviderFailed                            → 502
//! Internal                                  → 500
//! ```

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use tracing::error;

use orderdesk_core::{CoreError, ValidationError};
use orderdesk_db::DbError;
use orderdesk_pay::PaymentError;

/// Machine-readable error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    ValidationFailed,
    NotFound,
    MixedCurrency,
    InvalidTransition,
    OrderNotPending,
    Conflict,
    NoPaymentSession,
    ProviderFailed,
    Internal,
}

impl ErrorCode {
    pub fn http_status(&self) -> StatusCode {
        match self {
            ErrorCode::ValidationFailed => StatusCode::BAD_REQUEST,
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::MixedCurrency => StatusCode::UNPROCESSABLE_ENTITY,
            ErrorCode::InvalidTransition
            | ErrorCode::OrderNotPending
            | ErrorCode::Conflict
            | ErrorCode::NoPaymentSession => StatusCode::CONFLICT,
            ErrorCode::ProviderFailed => StatusCode::BAD_GATEWAY,
            ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// An error on its way to the client.
#[derive(Debug, Clone, Serialize)]
pub struct ApiError {
    pub code: ErrorCode,
    pub message: String,
    /// Set when an order was created but a later step failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
}

/// Result type for handlers and services.
pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
            order_id: None,
        }
    }

    pub fn not_found(entity: &str, id: &str) -> Self {
        ApiError::new(ErrorCode::NotFound, format!("{entity} not found: {id}"))
    }

    fn internal() -> Self {
        ApiError::new(ErrorCode::Internal, "Internal server error")
    }

    /// Attaches the id of the order the failed request belongs to.
    pub fn for_order(mut self, order_id: impl Into<String>) -> Self {
        self.order_id = Some(order_id.into());
        self
    }
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a ApiError,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.code.http_status();
        (status, Json(ErrorBody { error: &self })).into_response()
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::new(ErrorCode::ValidationFailed, err.to_string())
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        let code = match &err {
            CoreError::Validation(_)
            | CoreError::EmptyOrder
            | CoreError::InvalidAmount { .. }
            | CoreError::AmountOutOfRange { .. } => ErrorCode::ValidationFailed,
            CoreError::UnknownReference { .. } => ErrorCode::NotFound,
            CoreError::MixedCurrency { .. } => ErrorCode::MixedCurrency,
            CoreError::InvalidTransition { .. } => ErrorCode::InvalidTransition,
            CoreError::InvalidOrderStatus { .. } => ErrorCode::OrderNotPending,
            CoreError::SessionAlreadyAttached { .. } => ErrorCode::Conflict,
        };
        ApiError::new(code, err.to_string())
    }
}

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::Domain(core) => core.into(),
            DbError::NotFound { .. } => ApiError::new(ErrorCode::NotFound, err.to_string()),
            DbError::Conflict { .. } | DbError::UniqueViolation { .. } => {
                ApiError::new(ErrorCode::Conflict, err.to_string())
            }
            DbError::ForeignKeyViolation { .. } => {
                ApiError::new(ErrorCode::ValidationFailed, err.to_string())
            }
            other => {
                error!(error = %other, "Database error");
                ApiError::internal()
            }
        }
    }
}

impl From<PaymentError> for ApiError {
    fn from(err: PaymentError) -> Self {
        match err {
            PaymentError::Request(core) => core.into(),
            PaymentError::Config(e) => {
                error!(error = %e, "Payment provider misconfigured");
                ApiError::internal()
            }
            other => {
                error!(error = %other, "Payment provider call failed");
                ApiError::new(ErrorCode::ProviderFailed, other.to_string())
            }
        }
    }
}
