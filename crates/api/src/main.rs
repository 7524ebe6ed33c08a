use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;

use jobboard_api::app::{build_app, build_services};
use jobboard_infra::matching::LogNotificationSink;
use jobboard_infra::AppConfig;
use jobboard_observability::LogSettings;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env()?;
    jobboard_observability::init(&LogSettings::new(config.log_level.clone()).with_env_format());

    let services = Arc::new(build_services(&config, Arc::new(LogNotificationSink))?);
    let app = build_app(services.clone());

    let listener = TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("binding {}", config.bind_addr))?;
    tracing::info!(addr = %listener.local_addr()?, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tokio::task::spawn_blocking(move || services.shutdown()).await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown requested");
}
