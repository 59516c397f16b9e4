//! Admin sign-in and requester email verification.

use std::sync::Arc;

use axum::{
    extract::{Extension, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
    routing::post,
    Json, Router,
};
use serde_json::json;

use crate::app::{dto, errors, services::AppServices};

pub fn router() -> Router {
    Router::new()
        .route("/admin/login", post(admin_login))
        .route("/admin/register", post(admin_register))
        .route("/otp/send", post(send_otp))
        .route("/otp/verify", post(verify_otp))
}

pub async fn admin_login(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<dto::CredentialsRequest>, JsonRejection>,
) -> axum::response::Response {
    let Json(body) = match body {
        Ok(body) => body,
        Err(e) => return errors::json_error(StatusCode::BAD_REQUEST, "invalid_body", e.body_text()),
    };

    match services.login(&body.email, &body.password).await {
        Ok((token, account)) => (
            StatusCode::OK,
            Json(dto::LoginResponse {
                token,
                user: dto::AdminView::from(&account),
            }),
        )
            .into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

/// Setup-only; answers 404 unless registration is enabled in config.
pub async fn admin_register(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<dto::CredentialsRequest>, JsonRejection>,
) -> axum::response::Response {
    let Json(body) = match body {
        Ok(body) => body,
        Err(e) => return errors::json_error(StatusCode::BAD_REQUEST, "invalid_body", e.body_text()),
    };

    match services.register_admin(&body.email, &body.password).await {
        Ok(account) => (StatusCode::CREATED, Json(dto::RegisteredAdmin::from(&account))).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn send_otp(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<dto::SendOtpRequest>, JsonRejection>,
) -> axum::response::Response {
    let Json(body) = match body {
        Ok(body) => body,
        Err(e) => return errors::json_error(StatusCode::BAD_REQUEST, "invalid_body", e.body_text()),
    };

    match services.send_otp(&body.email).await {
        Ok(()) => (StatusCode::OK, Json(json!({ "message": "OTP sent successfully" }))).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn verify_otp(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<dto::VerifyOtpRequest>, JsonRejection>,
) -> axum::response::Response {
    let Json(body) = match body {
        Ok(body) => body,
        Err(e) => return errors::json_error(StatusCode::BAD_REQUEST, "invalid_body", e.body_text()),
    };

    match services.verify_otp(&body.email, &body.otp).await {
        Ok(()) => (
            StatusCode::OK,
            Json(dto::OtpVerified {
                message: "Verification successful",
                verified: true,
            }),
        )
            .into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}
