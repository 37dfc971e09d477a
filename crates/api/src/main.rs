use anyhow::{Context, Result};
use api::{AppConfig, AppState, build_assemblers, init_tracing, router};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let config = AppConfig::from_env()?;
    config.validate()?;

    let (standalone, hosted) = build_assemblers(&config)?;
    let state = Arc::new(AppState::new(standalone, hosted));

    tracing::info!(
        mode = ?config.mode,
        provider = ?config.generator.provider,
        model = %config.generator.model,
        hosting = config.hosting_enabled(),
        "Survey service configured"
    );

    let app = router(state).layer(CorsLayer::permissive());

    let listener = tokio::net::TcpListener::bind(&config.server_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.server_addr))?;

    tracing::info!("Server listening on http://{}", config.server_addr);

    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}
