use anyhow::Context;

use receiptdesk_api::config::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env().context("invalid configuration")?;
    receiptdesk_observability::init(config.log_format);

    if config.jwt_secret.is_none() {
        tracing::warn!("JWT_SECRET not set; using insecure dev default");
    }

    let app = receiptdesk_api::app::build_app(&config)
        .await
        .context("failed to build application services")?;

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
