// SPDX-FileCopyrightText: 2026 Ideabox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gateway HTTP server built on axum.

use std::sync::Arc;
use std::time::Instant;

use axum::{
    Router, middleware as axum_middleware,
    routing::{get, patch},
};
use ideabox_config::model::GatewayConfig;
use ideabox_core::{IdeaboxError, StorageAdapter};
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;

use crate::auth::{BasicAuth, basic_auth_middleware};
use crate::handlers;

/// Shared state for axum request handlers.
#[derive(Clone)]
pub struct GatewayState {
    pub storage: Arc<dyn StorageAdapter>,
    /// Process start time for uptime reporting.
    pub started: Instant,
}

impl GatewayState {
    pub fn new(storage: Arc<dyn StorageAdapter>) -> Self {
        Self {
            storage,
            started: Instant::now(),
        }
    }
}

/// Bind address and credentials, resolved from [`GatewayConfig`].
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub auth: BasicAuth,
}

impl ServerConfig {
    /// Fails when credentials are missing; the API never runs open.
    pub fn from_config(config: &GatewayConfig) -> Result<Self, IdeaboxError> {
        let (Some(username), Some(password)) =
            (config.username.as_deref(), config.password.as_deref())
        else {
            return Err(IdeaboxError::Config(
                "gateway.username and gateway.password are required when the gateway is enabled"
                    .into(),
            ));
        };
        Ok(Self {
            host: config.host.clone(),
            port: config.port,
            auth: BasicAuth::new(username, password),
        })
    }
}

/// Routes:
/// - GET /health (public)
/// - GET /api/ideas
/// - GET, DELETE /api/ideas/{id}
/// - PATCH /api/ideas/{id}/status
/// - PATCH /api/ideas/{id}/notes
/// - GET /api/meta
pub fn build_router(state: GatewayState, auth: BasicAuth) -> Router {
    let public_routes = Router::new()
        .route("/health", get(handlers::get_health))
        .with_state(state.clone());

    let api_routes = Router::new()
        .route("/api/ideas", get(handlers::list_ideas))
        .route(
            "/api/ideas/{id}",
            get(handlers::get_idea).delete(handlers::delete_idea),
        )
        .route("/api/ideas/{id}/status", patch(handlers::update_status))
        .route("/api/ideas/{id}/notes", patch(handlers::update_notes))
        .route("/api/meta", get(handlers::get_meta))
        .route_layer(axum_middleware::from_fn_with_state(
            auth,
            basic_auth_middleware,
        ))
        .with_state(state);

    Router::new()
        .merge(public_routes)
        .merge(api_routes)
        .layer(TraceLayer::new_for_http())
}

/// Serves the API until `shutdown` is cancelled.
pub async fn start_server(
    config: &ServerConfig,
    state: GatewayState,
    shutdown: CancellationToken,
) -> Result<(), IdeaboxError> {
    let app = build_router(state, config.auth.clone());

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| IdeaboxError::Channel {
            message: format!("failed to bind gateway to {addr}: {e}"),
            source: Some(Box::new(e)),
        })?;

    tracing::info!("gateway listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
        .map_err(|e| IdeaboxError::Channel {
            message: format!("gateway server error: {e}"),
            source: Some(Box::new(e)),
        })?;

    tracing::info!("gateway stopped");
    Ok(())
}
