//! HTTP route handlers.

use std::sync::Arc;

use axum::{
    extract::State,
    http::Uri,
    response::Json,
    routing::get,
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::task::{create_task_store, TaskService, TaskStore, TracingEventSink};

use super::tasks::{self, ApiError};
use super::types::*;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    /// Task creation service (owns the store)
    pub service: TaskService,
}

impl AppState {
    /// Wire a service around `store` using the schema and policy from `config`.
    pub fn new(config: Config, store: Arc<dyn TaskStore>) -> Self {
        let service = TaskService::new(
            store,
            config.schema.clone(),
            config.duplicate_policy,
            Arc::new(TracingEventSink),
        );
        Self { config, service }
    }
}

/// Build the router with all task routes.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/tasks", get(tasks::list_tasks).post(tasks::create_task))
        .fallback(not_found)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the HTTP server.
pub async fn serve(config: Config) -> anyhow::Result<()> {
    let store: Arc<dyn TaskStore> = Arc::from(
        create_task_store(config.store.store_type, config.store.path.clone()).await?,
    );
    if store.is_persistent() {
        tracing::info!(
            "Task store: {} ({})",
            config.store.store_type.as_str(),
            config.store.path.display()
        );
    } else {
        tracing::info!("Task store: {}", config.store.store_type.as_str());
    }

    let addr = format!("{}:{}", config.host, config.port);
    let state = Arc::new(AppState::new(config, store));
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

/// Wait for Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}

/// Health check endpoint.
async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        store: state.config.store.store_type.as_str().to_string(),
        persistent: state.service.store().is_persistent(),
    })
}

async fn not_found(uri: Uri) -> ApiError {
    ApiError::not_found(uri.path())
}
