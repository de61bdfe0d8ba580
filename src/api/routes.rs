//! HTTP server assembly and route table.

use std::sync::Arc;

use axum::{
    response::Json,
    routing::{get, patch, post, put},
    Router,
};
use serde::Serialize;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::store::TaskStore;

use super::{ai, tasks};

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub store: TaskStore,
    /// HTTP client reused for upstream AI calls.
    pub http: reqwest::Client,
}

/// Build the application router.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/tasks", get(tasks::list_tasks).post(tasks::create_task))
        .route("/api/tasks/bulk-update", patch(tasks::bulk_update_tasks))
        .route(
            "/api/tasks/:id",
            put(tasks::update_task).delete(tasks::delete_task),
        )
        .route("/api/ai/generate", post(ai::generate))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the HTTP server and run until shutdown.
pub async fn serve(config: Config) -> anyhow::Result<()> {
    let store = TaskStore::open(&config.database_path)?;
    tracing::info!(path = %config.database_path.display(), "Task store opened");

    let state = Arc::new(AppState {
        config: config.clone(),
        store,
        http: reqwest::Client::new(),
    });

    let app = router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shut down");
    Ok(())
}

/// Wait for SIGINT or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => tracing::error!("Failed to install SIGTERM handler: {}", e),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

/// Health check endpoint.
async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// State over an in-memory store, with the upstream AI URL pointed at
/// a dead address so any accidental forwarding fails loudly.
#[cfg(test)]
pub(crate) fn test_state() -> Arc<AppState> {
    let config = Config {
        ai_api_url: "http://127.0.0.1:1/unreachable".to_string(),
        ..Config::default()
    };
    Arc::new(AppState {
        config,
        store: TaskStore::open_in_memory().expect("in-memory store"),
        http: reqwest::Client::new(),
    })
}
