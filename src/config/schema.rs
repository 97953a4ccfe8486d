//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct UbtConfig {
    /// Listener for the demo service.
    pub listener: ListenerConfig,

    /// Telemetry client settings.
    pub client: ClientConfig,

    /// Local logging and metrics.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// How the client hands messages to the transport.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DispatchMode {
    /// Fire and forget on a spawned task.
    #[default]
    Background,
    /// Send inline and record the outcome (tests, CI).
    Inline,
}

/// Telemetry client configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Collector base URL; messages are posted to `{server_url}/logging/v2`.
    pub server_url: String,

    pub app_name: String,

    pub app_version: String,

    /// Header names left out of the request snapshot, canonical form
    /// (`X-Secret`), matched case-sensitively.
    pub ignore_headers: Vec<String>,

    /// Trace every collector call at debug level.
    pub debug: bool,

    pub mode: DispatchMode,

    /// Stamp hostname and IPv4 addresses onto messages.
    pub report_host: bool,

    /// Header carrying a caller supplied request id.
    pub request_id_header: String,

    /// Header carrying the caller declared api name.
    pub api_header: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_url: "http://127.0.0.1:9200".to_string(),
            app_name: "ubt-app".to_string(),
            app_version: "0.1.0".to_string(),
            ignore_headers: Vec::new(),
            debug: false,
            mode: DispatchMode::Background,
            report_host: true,
            request_id_header: "requestid".to_string(),
            api_header: "method".to_string(),
        }
    }
}

impl ClientConfig {
    /// Full collector endpoint.
    pub fn endpoint(&self) -> String {
        format!("{}/logging/v2", self.server_url.trim_end_matches('/'))
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
