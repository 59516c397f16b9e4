use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;
use tracing::error;

use receiptdesk_auth::AccountError;
use receiptdesk_infra::store::StoreError;
use receiptdesk_intake::IntakeError;

use crate::app::services::ServiceError;

pub fn intake_error_to_response(err: IntakeError) -> axum::response::Response {
    let status = match &err {
        IntakeError::ReferenceNotFound { .. }
        | IntakeError::MissingRequiredField(_)
        | IntakeError::InvalidEnumValue { .. }
        | IntakeError::InvalidAmount(_) => StatusCode::BAD_REQUEST,
        IntakeError::TransientIo(_) => {
            error!(error = %err, "reference ledger unavailable");
            StatusCode::SERVICE_UNAVAILABLE
        }
    };
    json_error(status, err.code(), err.to_string())
}

pub fn store_error_to_response(err: StoreError) -> axum::response::Response {
    match err {
        StoreError::Conflict(msg) => json_error(StatusCode::CONFLICT, "conflict", msg),
        StoreError::Unavailable(msg) => {
            error!(error = %msg, "store unavailable");
            json_error(StatusCode::SERVICE_UNAVAILABLE, "store_unavailable", msg)
        }
        StoreError::Corrupt(msg) => {
            error!(error = %msg, "corrupt stored record");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "store_error", msg)
        }
    }
}

pub fn service_error_to_response(err: ServiceError) -> axum::response::Response {
    match err {
        ServiceError::Intake(e) => intake_error_to_response(e),
        ServiceError::Store(e) => store_error_to_response(e),
        ServiceError::Account(AccountError::Domain(e)) => {
            json_error(StatusCode::BAD_REQUEST, "validation_error", e.to_string())
        }
        ServiceError::Account(AccountError::Password(e)) | ServiceError::Password(e) => {
            error!(error = %e, "password hashing failed");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "password_error", "password check failed")
        }
        ServiceError::Token(e) => {
            error!(error = %e, "token signing failed");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "token_error", e.to_string())
        }
        ServiceError::Mail(e) => json_error(StatusCode::BAD_GATEWAY, "mail_error", e.to_string()),
        ServiceError::NotFound(msg) => json_error(StatusCode::NOT_FOUND, "not_found", msg),
        ServiceError::BadRequest(msg) => json_error(StatusCode::BAD_REQUEST, "bad_request", msg),
    }
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
