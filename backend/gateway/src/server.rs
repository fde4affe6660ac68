//! Main HTTP Gateway Server.
//!
//! Routes are an explicit table mapping exact paths to handlers; anything
//! else falls through to 404.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::{
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tracing::info;

use edgegate_auth::{Authorizer, Provisioner};
use edgegate_config::GateConfig;
use edgegate_core::CompletionProvider;
use edgegate_keystore::KeyCache;

use crate::{ask_api, health_api, provision_api};

/// Application state shared across routes.
#[derive(Clone)]
pub struct GatewayState {
    pub provisioner: Arc<Provisioner>,
    pub authorizer: Arc<Authorizer>,
    pub cache: Arc<KeyCache>,
    pub completion: Arc<dyn CompletionProvider>,
    pub config: Arc<GateConfig>,
}

impl GatewayState {
    pub fn new(
        cache: Arc<KeyCache>,
        completion: Arc<dyn CompletionProvider>,
        config: Arc<GateConfig>,
    ) -> Self {
        Self {
            provisioner: Arc::new(Provisioner::new(cache.clone(), config.replay_window_secs)),
            authorizer: Arc::new(Authorizer::new(cache.clone())),
            cache,
            completion,
            config,
        }
    }
}

/// The gateway route table.
pub fn build_router(state: GatewayState) -> Router {
    Router::new()
        .route("/provision", post(provision_api::provision))
        .route("/ask", post(ask_api::ask))
        .route("/api/health", get(health_api::get_health))
        .fallback(|| async { (axum::http::StatusCode::NOT_FOUND, "NOT FOUND") })
        .with_state(state)
}

/// Starts the main Axum HTTP server for the gateway.
pub async fn start_server(addr: SocketAddr, state: GatewayState) -> Result<()> {
    let app = build_router(state);

    info!("Gateway HTTP server listening on {}", addr);
    let listener = TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
