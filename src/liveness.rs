use axum::{routing::get, Router};
use std::net::SocketAddr;
use tokio::net::TcpListener;

pub const LIVENESS_TEXT: &str = "Bot is running";

pub fn router() -> Router {
    Router::new().route("/", get(|| async { LIVENESS_TEXT }))
}

/// Serve the uptime-monitor endpoint until the task is aborted.
pub async fn serve(addr: SocketAddr) -> std::io::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(addr = %listener.local_addr()?, "liveness endpoint listening");
    axum::serve(listener, router()).await
}
