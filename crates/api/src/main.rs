use anyhow::Context;

use cashbook_api::config::ApiConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ApiConfig::from_env().context("invalid configuration")?;
    cashbook_observability::init_with(&config.log);

    let app = cashbook_api::app::build_app(&config);

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    tracing::info!(
        addr = %listener.local_addr()?,
        log_format = %config.log.format,
        "listening"
    );

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
