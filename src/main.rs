use anyhow::Context;
use axum::Router;
use tokio::net::TcpListener;

use f1gpt_backend::core::logging;
use f1gpt_backend::server;
use f1gpt_backend::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let state = AppState::initialize().await?;
    logging::init(&state.paths, "server.log");

    if state.rag.is_some() {
        tracing::info!(
            "RAG mode: embedding model {} via {}",
            state.settings.embedding.model,
            state.settings.embedding.base_url.as_deref().unwrap_or_default()
        );
    } else {
        tracing::warn!("Demo mode active: set embedding.base_url to enable retrieval");
    }

    let server_settings = &state.settings.server;
    let bind_addr = format!("{}:{}", server_settings.host, server_settings.port);

    let listener = TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", bind_addr))?;
    let addr = listener.local_addr()?;

    println!("F1GPT_PORT={}", addr.port());
    tracing::info!("Listening on {}", addr);

    let app: Router = server::router::router(state.clone());

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
