//! Shared utilities for integration testing.

use axum::{extract::State, http::StatusCode, routing::post, Router};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;

use ubt_telemetry::config::{ClientConfig, DispatchMode};
use ubt_telemetry::UbtClient;

/// Bodies received by a mock collector, in arrival order.
#[derive(Clone, Default)]
pub struct Received(Arc<Mutex<Vec<String>>>);

#[allow(dead_code)]
impl Received {
    pub fn bodies(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    pub fn len(&self) -> usize {
        self.0.lock().unwrap().len()
    }
}

async fn collect(State(received): State<Received>, body: String) -> &'static str {
    received.0.lock().unwrap().push(body);
    r#"{"code":0}"#
}

/// Start a mock collector on an ephemeral port answering `{"code":0}`.
pub async fn start_mock_collector() -> (SocketAddr, Received) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let received = Received::default();

    let app = Router::new()
        .route("/logging/v2", post(collect))
        .with_state(received.clone());
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    (addr, received)
}

/// Start a collector that answers every post with `status` and `body`.
#[allow(dead_code)]
pub async fn start_failing_collector(status: StatusCode, body: &'static str) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let app = Router::new().route("/logging/v2", post(move || async move { (status, body) }));
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    addr
}

/// Client config pointing at `addr`.
pub fn client_config(addr: SocketAddr, mode: DispatchMode) -> ClientConfig {
    ClientConfig {
        server_url: format!("http://{}", addr),
        app_name: "taishan-dev".into(),
        app_version: "0.1.0".into(),
        mode,
        ..Default::default()
    }
}

/// Inline client talking to a fresh mock collector.
#[allow(dead_code)]
pub async fn inline_client() -> (UbtClient, Received) {
    let (addr, received) = start_mock_collector().await;
    let client = UbtClient::new(client_config(addr, DispatchMode::Inline)).unwrap();
    (client, received)
}
