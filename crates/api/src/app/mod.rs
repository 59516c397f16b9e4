//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: ledger/store/mailer wiring and the operations handlers call
//! - `routes/`: HTTP routes + handlers (one file per area)
//! - `dto.rs`: request/response DTOs
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{Extension, Router};
use tower::ServiceBuilder;

use receiptdesk_auth::JwtValidator;

use crate::config::AppConfig;
use crate::middleware::AuthState;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

pub use services::{AppServices, BuildError, build_services};

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub async fn build_app(config: &AppConfig) -> Result<Router, BuildError> {
    let services = Arc::new(build_services(config).await?);
    Ok(build_router(services))
}

/// Router over already-built services. Tokens are checked with the same
/// signer that issues them at login.
pub fn build_router(services: Arc<AppServices>) -> Router {
    let jwt: Arc<dyn JwtValidator> = Arc::new(services.jwt.clone());
    let auth_state = AuthState { jwt };

    routes::router(auth_state).layer(ServiceBuilder::new().layer(Extension(services)))
}
