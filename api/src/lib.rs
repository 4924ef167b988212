//! HTTP surface of the tutor backend.
//!
//! Routes:
//! - `POST /ask-ai` — tutor answer (CORS restricted to `CORS_ORIGINS`)
//! - `GET /health`  — liveness

pub mod core;
pub mod error_handler;
mod middleware_layer;
mod routes;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
};
use tokio::signal;
use tracing::{error, info};

use crate::{
    core::{
        api_config::{ApiConfig, CorsOrigins},
        app_state::AppState,
    },
    error_handler::AppError,
    middleware_layer::request_context::request_context,
    routes::{ask_ai::ask_ai_route::ask_ai, health_route::health},
};

/// Request body cap for `/ask-ai`. Large enough that an oversized `code`
/// field is still parsed and answered by the field check; anything past it is
/// reported the same way.
pub const MAX_BODY_BYTES: usize = 8 * 1024 * 1024;

/// Builds the application router around an already constructed state.
pub fn create_router(state: AppState, cors_origins: &CorsOrigins) -> Router {
    let tutor = Router::new()
        .route("/ask-ai", post(ask_ai))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(cors_origins.layer());

    Router::new()
        .route("/health", get(health))
        .merge(tutor)
        .layer(middleware::from_fn(request_context))
        .with_state(state)
}

/// Loads config from the environment, binds, and serves until Ctrl+C.
pub async fn start() -> Result<(), AppError> {
    let cfg = ApiConfig::from_env()?;
    let state = AppState::from_env()?;
    let app = create_router(state, &cfg.cors_origins);

    let listener = tokio::net::TcpListener::bind(&cfg.address)
        .await
        .map_err(AppError::Bind)?;

    info!(address = %cfg.address, cors = ?cfg.cors_origins, "tutor api listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(AppError::Server)
}

/// Resolves when Ctrl+C is pressed.
async fn shutdown_signal() {
    if let Err(e) = signal::ctrl_c().await {
        error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
