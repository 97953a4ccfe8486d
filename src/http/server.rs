//! Demo HTTP service.
//!
//! # Responsibilities
//! - Create the Axum Router with the demo handlers
//! - Wire up middleware (tracing, traffic capture)
//! - Bind server to listener with graceful shutdown

use axum::{
    body::Bytes,
    http::{header, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::client::UbtClient;
use crate::config::UbtConfig;
use crate::http::traffic::with_traffic_capture;

/// Demo service with traffic capture installed.
pub struct HttpServer {
    router: Router,
    config: UbtConfig,
}

impl HttpServer {
    pub fn new(config: UbtConfig, client: UbtClient) -> Self {
        let router = Self::build_router(client);
        Self { router, config }
    }

    /// Build the router with all middleware layers.
    pub fn build_router(client: UbtClient) -> Router {
        let routes = Router::new()
            .route("/ping", get(ping).post(post_ping))
            .route("/echo", post(echo))
            .route("/fail", get(fail));

        with_traffic_capture(routes, client).layer(TraceLayer::new_for_http())
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(self, listener: TcpListener) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    pub fn config(&self) -> &UbtConfig {
        &self.config
    }
}

async fn ping() -> &'static str {
    "pong"
}

async fn post_ping() -> &'static str {
    "post pong"
}

async fn echo(body: Bytes) -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "application/json")], body)
}

async fn fail() -> impl IntoResponse {
    (StatusCode::INTERNAL_SERVER_ERROR, "internal error")
}

/// Wait for shutdown signal (Ctrl+C).
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to install Ctrl+C handler");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
