use anyhow::Result;
use api::{config::Config, state::AppState};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    api::telemetry::init_tracing(&config);

    info!(
        addr = %config.listen_addr,
        solver_time_limit_secs = config.solver_time_limit.as_secs(),
        "configuration loaded"
    );

    let app = api::router(AppState::from_config(&config), &config);

    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    info!(addr = %config.listen_addr, "listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "cannot listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}
