use anyhow::Context;
use tokio::net::TcpListener;

use docqa_backend::core::config::AppConfig;
use docqa_backend::core::logging;
use docqa_backend::server;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    let config = AppConfig::load().context("Failed to load configuration")?;
    logging::init(&config.logging, "math_api");

    let bind_addr = config.bind_addr();
    let listener = TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", bind_addr))?;
    tracing::info!("Math API listening on {}", listener.local_addr()?);

    let app = server::router::math_router(&config.server);
    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
