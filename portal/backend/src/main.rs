//! Console Portal Backend
//!
//! Rust/Axum service exposing access decisions and the realtime
//! records-changed feed to the admin console.

use axum::{
    extract::{State, WebSocketUpgrade},
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use console_access::DecisionEngine;
use console_realtime::RealtimeChannel;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod handlers;
mod models;
mod ws;

use config::{ConfigError, PortalConfig};
use handlers::*;

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<DecisionEngine>,
    pub realtime: RealtimeChannel,
    pub config: Arc<PortalConfig>,
}

impl AppState {
    fn new(config: &PortalConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            engine: Arc::new(config.build_engine()?),
            realtime: RealtimeChannel::new(),
            config: Arc::new(config.clone()),
        })
    }
}

fn router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health))

        // Access
        .route("/api/access/decide", post(decide_access))

        // Realtime
        .route("/api/records/changed", post(records_changed))
        .route("/api/realtime/stats", get(realtime_stats))

        // WebSocket
        .route("/ws", get(ws_handler))

        .layer(CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = PortalConfig::from_env()?;
    let state = AppState::new(&config)?;
    tracing::info!(
        policy = state.engine.policy_name(),
        pages = state.engine.pages().len(),
        "access engine ready"
    );

    let app = router(state);

    let listener = tokio::net::TcpListener::bind(&config.listen_addr).await?;
    tracing::info!("Console portal listening on {}", config.listen_addr);
    axum::serve(listener, app).await?;
    Ok(())
}

async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| ws::handle_socket(socket, state))
}
