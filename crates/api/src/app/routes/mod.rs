use axum::{
    middleware::from_fn_with_state,
    routing::{MethodRouter, get, patch, post},
    Router,
};

use crate::middleware::{AuthState, auth_middleware};

pub mod auth;
pub mod requests;
pub mod system;

/// Full route table. Admin-only handlers get the auth layer individually
/// because `/api/requests` is public for `POST` and protected for `GET`.
pub fn router(auth_state: AuthState) -> Router {
    let admin = |route: MethodRouter| route.route_layer(from_fn_with_state(auth_state.clone(), auth_middleware));

    Router::new()
        .route("/", get(system::root))
        .route("/health", get(system::health))
        .route(
            "/api/requests",
            post(requests::submit_request).merge(admin(get(requests::list_requests))),
        )
        .route("/api/requests/summary", admin(get(requests::requests_summary)))
        .route("/api/requests/:id/status", admin(patch(requests::update_status)))
        .nest("/api/auth", auth::router())
}
