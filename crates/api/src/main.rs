use std::sync::Arc;

use anyhow::Context;

use stockrecon_api::app::{self, services};
use stockrecon_api::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;
    stockrecon_observability::init(config.log_format);

    tracing::info!(
        bind_addr = %config.bind_addr,
        persistent = config.database_url.is_some(),
        max_cas_attempts = config.reconciler.max_cas_attempts,
        "starting stock reconciliation service"
    );

    let services = services::build_services(&config)
        .await
        .context("failed to initialise item store")?;

    let app = app::build_app(Arc::new(services));

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
