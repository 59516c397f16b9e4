use axum::http::StatusCode;

pub async fn root() -> &'static str {
    "Receipt request API is running"
}

pub async fn health() -> StatusCode {
    StatusCode::OK
}
