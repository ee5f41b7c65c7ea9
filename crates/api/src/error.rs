//! API error types with HTTP response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use store::StoreError;
use workflow::WorkflowError;

/// API-level error type that maps to HTTP responses.
///
/// Every error renders as the `{sucesso: false, mensagem}` envelope the
/// clients expect.
#[derive(Debug)]
pub enum ApiError {
    /// Resource not found.
    NotFound(String),
    /// Bad request from the client.
    BadRequest(String),
    /// Workflow-level error.
    Workflow(WorkflowError),
    /// Internal server error.
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Workflow(err) => workflow_error_to_response(err),
            ApiError::Internal(msg) => {
                tracing::error!(error = %msg, "internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
        };

        let body = serde_json::json!({ "sucesso": false, "mensagem": message });
        (status, axum::Json(body)).into_response()
    }
}

fn workflow_error_to_response(err: WorkflowError) -> (StatusCode, String) {
    let message = err.to_string();
    let status = match &err {
        WorkflowError::Rejected(_)
        | WorkflowError::InvalidCpf(_)
        | WorkflowError::MissingField(_)
        | WorkflowError::CancelWindowClosed { .. } => StatusCode::BAD_REQUEST,
        WorkflowError::MemberNotFound(_)
        | WorkflowError::ReservationNotFound(_)
        | WorkflowError::FeeNotFound => StatusCode::NOT_FOUND,
        WorkflowError::FeeExpired => StatusCode::GONE,
        WorkflowError::EmailMismatch => StatusCode::FORBIDDEN,
        WorkflowError::InvalidState { .. } => StatusCode::CONFLICT,
        WorkflowError::Store(store_err) => match store_err {
            StoreError::SlotTaken { .. }
            | StoreError::DuplicateCpf(_)
            | StoreError::DuplicateEmail(_) => StatusCode::CONFLICT,
            StoreError::MemberNotFound(_)
            | StoreError::ReservationNotFound(_)
            | StoreError::FeeNotFound(_)
            | StoreError::BulletinNotFound(_) => StatusCode::NOT_FOUND,
            _ => {
                tracing::error!(error = %store_err, "store error");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        },
    };
    (status, message)
}

impl From<WorkflowError> for ApiError {
    fn from(err: WorkflowError) -> Self {
        ApiError::Workflow(err)
    }
}
