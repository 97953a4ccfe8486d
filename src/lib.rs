//! Request/response telemetry capture for axum services.
//!
//! Installs as middleware, records every request and the response bytes
//! actually sent, and ships structured messages to a remote collector
//! without blocking the request path.

pub mod client;
pub mod config;
pub mod http;
pub mod message;
pub mod observability;
pub mod report;

pub use client::UbtClient;
pub use config::UbtConfig;
pub use http::{traffic_middleware, with_traffic_capture, HttpServer};
pub use message::{ExtraMessage, LogLevel, Message};
pub use report::TracedError;
