//! Entry point: loads configuration, wires persistence/session/manager
//! layers, recovers in-flight games, and serves the combined HTTP +
//! websocket router (§4.G/§4.H) until `ctrl_c`, mirroring the teacher's
//! `main.rs` shape (config -> state -> router -> serve with graceful
//! shutdown).

mod config;
mod errors;
mod http;
mod ws;

use axum::routing::get;
use axum::Router;
use config::ServerConfig;
use http::AppState;
use manager::GameManager;
use persistence::{Database, SqliteDatabase};
use session::SessionStore;
use std::sync::Arc;
use std::time::Duration;

const DISCONNECT_GRACE_PERIOD: Duration = Duration::from_secs(120);
const AI_TURN_TIMEOUT: Duration = Duration::from_secs(10);
const SESSION_SWEEP_INTERVAL: Duration = Duration::from_secs(300);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_env_filter(tracing_subscriber::EnvFilter::from_default_env()).init();

    let config = ServerConfig::load()?;
    tracing::info!(port = config.port, env = ?config.env, "starting jarl-server");

    let db: Arc<dyn Database> = Arc::new(SqliteDatabase::connect(&config.database_url).await?);
    let sessions = SessionStore::new();
    session::spawn_sweeper(sessions.clone(), SESSION_SWEEP_INTERVAL);

    let manager = GameManager::new(db, DISCONNECT_GRACE_PERIOD, AI_TURN_TIMEOUT);
    let recovered = manager.recover().await?;
    tracing::info!(recovered, "recovery complete");

    let state = AppState { manager, sessions };
    let ws_router = Router::new().route("/ws", get(ws::ws_handler)).with_state(state.clone());
    let app = Router::new().route("/healthz", get(|| async { "ok" })).merge(ws_router).merge(http::router(state));

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.port)).await?;
    tracing::info!(addr = %listener.local_addr()?, "listening");

    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;
    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    tracing::info!("shutdown signal received");
}
