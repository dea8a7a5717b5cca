mod configuration;
mod error;
mod routes;
mod state;

use configuration::Settings;
use relay::providers::ollama::OllamaProvider;
use state::AppState;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("relayd=info".parse()?)
                .add_directive("relay=info".parse()?)
                .add_directive("tower_http=info".parse()?),
        )
        .init();

    let settings = Settings::new()?;
    let addr = settings.server.socket_addr()?;

    let provider = OllamaProvider::new(settings.provider.into_config())?;
    info!(
        host = %provider.config().host,
        model = %provider.config().model,
        timeout_secs = provider.config().timeout.as_secs(),
        "using ollama backend"
    );

    let app = routes::configure(AppState::new(provider));

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        // Without a signal handler, keep serving until the process is killed
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}
