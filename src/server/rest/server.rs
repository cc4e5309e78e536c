use anyhow::Result;
use std::future::Future;
use std::sync::Arc;
use tracing::info;

use crate::server::rest::create_router;
use crate::shared::config::AgentConfig;
use crate::shared::models::AppState;

/// Serves the agent API until `shutdown` resolves.
pub async fn run_rest_server<F>(state: Arc<AppState>, config: &AgentConfig, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    info!("Building REST API routes...");
    let app = create_router(state, &config.allowed_origins);

    let bind_addr = config.bind_addr();
    info!("Binding to: {}", bind_addr);
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;

    info!("REST API Endpoint: http://{}", bind_addr);
    info!("Swagger UI: http://{}/swagger-ui/", bind_addr);
    info!("OpenAPI JSON: http://{}/api-docs/openapi.json", bind_addr);
    info!("Ready to accept requests...");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    info!("REST API stopped");
    Ok(())
}
