use anyhow::Context;
use axum::Router;
use tokio::net::TcpListener;

use docqa_backend::core::config::{AppConfig, Credentials};
use docqa_backend::core::logging;
use docqa_backend::server;
use docqa_backend::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env is optional; real environment variables win
    let _ = dotenvy::dotenv();

    let config = AppConfig::load().context("Failed to load configuration")?;
    logging::init(&config.logging, "docqa");

    let credentials = match Credentials::from_env() {
        Ok(credentials) => credentials,
        Err(err) => {
            tracing::error!("{}; set them in the environment or a .env file", err);
            return Err(err.into());
        }
    };

    let bind_addr = config.bind_addr();
    let state = AppState::initialize(config, credentials)?;

    let listener = TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", bind_addr))?;
    let addr = listener.local_addr()?;
    tracing::info!("Listening on {}", addr);

    let app: Router = server::router::router(state);
    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
