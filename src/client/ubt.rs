//! The telemetry client.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};
use thiserror::Error;

use crate::client::dispatch::{Background, Dispatch, Inline};
use crate::client::host::HostIdentity;
use crate::client::recorder::Recorder;
use crate::client::transport::{HttpTransport, Transport, TransportError};
use crate::config::{validate_server_url, ClientConfig, DispatchMode, ValidationError};
use crate::message::{ExtraMessage, LogLevel, Message, SDK_VERSION};
use crate::observability::metrics;
use crate::report;

/// Errors constructing a client.
#[derive(Debug, Error)]
pub enum UbtError {
    #[error("invalid client configuration: {0}")]
    Config(#[from] ValidationError),

    #[error("failed to build collector transport: {0}")]
    TransportSetup(#[from] TransportError),
}

struct Inner {
    config: ClientConfig,
    endpoint: Arc<str>,
    transport: Arc<dyn Transport>,
    dispatcher: Arc<dyn Dispatch>,
    recorder: Option<Arc<Recorder>>,
    host: Arc<OnceLock<HostIdentity>>,
    host_lookup_started: AtomicBool,
}

/// Central sink for every telemetry message.
///
/// Cheap to clone; clones share configuration, transport and (in inline
/// mode) the recorder.
#[derive(Clone)]
pub struct UbtClient {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for UbtClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UbtClient")
            .field("endpoint", &self.inner.endpoint)
            .field("mode", &self.inner.config.mode)
            .finish_non_exhaustive()
    }
}

impl UbtClient {
    /// Create a client posting over HTTP to `config.server_url`.
    ///
    /// Fails when the server URL is not an http(s) URL.
    pub fn new(config: ClientConfig) -> Result<Self, UbtError> {
        validate_server_url(&config.server_url)?;
        let transport = HttpTransport::new(config.debug)?;
        Ok(Self::with_transport(config, Arc::new(transport)))
    }

    /// Create a client with a custom transport.
    pub fn with_transport(config: ClientConfig, transport: Arc<dyn Transport>) -> Self {
        let (dispatcher, recorder) = match config.mode {
            DispatchMode::Background => (Arc::new(Background) as Arc<dyn Dispatch>, None),
            DispatchMode::Inline => {
                let recorder = Arc::new(Recorder::new());
                let inline = Arc::new(Inline::new(recorder.clone())) as Arc<dyn Dispatch>;
                (inline, Some(recorder))
            }
        };

        tracing::debug!(
            endpoint = %config.endpoint(),
            app_name = %config.app_name,
            mode = ?config.mode,
            "Telemetry client created"
        );

        let host = Arc::new(OnceLock::new());
        if config.mode == DispatchMode::Inline {
            let _ = host.set(HostIdentity::sentinel());
        }

        Self {
            inner: Arc::new(Inner {
                endpoint: config.endpoint().into(),
                config,
                transport,
                dispatcher,
                recorder,
                host,
                host_lookup_started: AtomicBool::new(false),
            }),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    /// Send history; only inline clients have one.
    pub fn recorder(&self) -> Option<&Arc<Recorder>> {
        self.inner.recorder.as_ref()
    }

    /// Enrich, serialize and send `message`.
    ///
    /// Never fails: serialization and transport errors are logged locally.
    pub async fn dispatch(&self, mut message: Message, extra: Option<ExtraMessage>) {
        self.enrich(&mut message, extra);

        let text = match serde_json::to_string(&message) {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(error = %e, level = %message.log_level, "Failed to serialize telemetry message");
                metrics::record_serialization_failure();
                return;
            }
        };

        metrics::record_dispatch(message.log_level);
        self.inner
            .dispatcher
            .send(self.inner.transport.clone(), self.inner.endpoint.clone(), text)
            .await;
    }

    fn enrich(&self, message: &mut Message, extra: Option<ExtraMessage>) {
        if let Some(extra) = extra {
            message.extra.merge(extra);
        }

        let config = &self.inner.config;
        message.app_name = config.app_name.clone();
        message.app_version = config.app_version.clone();
        message.sdk_version = SDK_VERSION.to_string();

        if config.report_host {
            if let Some(host) = self.host() {
                message.server_hostname = host.hostname.clone();
                message.server_addr = host.addr.clone();
            }
        }
    }

    /// Cached host identity. The first call starts the lookup on its own
    /// task; messages sent before it completes carry no host fields.
    fn host(&self) -> Option<&HostIdentity> {
        if let Some(host) = self.inner.host.get() {
            return Some(host);
        }
        if !self.inner.host_lookup_started.swap(true, Ordering::AcqRel) {
            let cell = self.inner.host.clone();
            tokio::spawn(async move {
                let _ = cell.set(HostIdentity::lookup().await);
            });
        }
        None
    }

    /// Dispatch a free-text message at `level`.
    pub async fn log(&self, level: LogLevel, msg: impl Into<String>, extra: Option<ExtraMessage>) {
        self.dispatch(Message::new(level, msg), extra).await;
    }

    pub async fn debug(&self, msg: impl Into<String>, extra: Option<ExtraMessage>) {
        self.log(LogLevel::Debug, msg, extra).await;
    }

    pub async fn info(&self, msg: impl Into<String>, extra: Option<ExtraMessage>) {
        self.log(LogLevel::Info, msg, extra).await;
    }

    pub async fn warn(&self, msg: impl Into<String>, extra: Option<ExtraMessage>) {
        self.log(LogLevel::Warn, msg, extra).await;
    }

    pub async fn error(&self, msg: impl Into<String>, extra: Option<ExtraMessage>) {
        self.log(LogLevel::Error, msg, extra).await;
    }

    pub async fn critical(&self, msg: impl Into<String>, extra: Option<ExtraMessage>) {
        self.log(LogLevel::Critical, msg, extra).await;
    }

    pub async fn alert(&self, msg: impl Into<String>, extra: Option<ExtraMessage>) {
        self.log(LogLevel::Alert, msg, extra).await;
    }

    pub async fn fatal(&self, msg: impl Into<String>, extra: Option<ExtraMessage>) {
        self.log(LogLevel::Fatal, msg, extra).await;
    }

    /// Report `err` at error level, with call frames when it carries them.
    ///
    /// The error is converted before the returned future is created, so the
    /// future does not borrow `err`.
    pub fn send_error(
        &self,
        err: &(dyn std::error::Error + 'static),
        extra: Option<ExtraMessage>,
    ) -> impl Future<Output = ()> + Send + '_ {
        let error = report::error_message(err);
        let message = Message::new(LogLevel::Error, error.message.clone()).with_error(error);
        self.dispatch(message, extra)
    }
}
