//! Dispatch strategies.
//!
//! Enrichment and serialization are shared; only the final send differs:
//! - [`Background`]: spawn a task per message and return immediately
//! - [`Inline`]: await the collector and record the outcome
//!
//! Background sends are unbounded: every message gets its own task and
//! connection, with no queue or backpressure.

use async_trait::async_trait;
use std::sync::Arc;

use crate::client::recorder::Recorder;
use crate::client::transport::Transport;
use crate::observability::metrics;

/// Final step of the dispatch pipeline.
#[async_trait]
pub trait Dispatch: Send + Sync + 'static {
    async fn send(&self, transport: Arc<dyn Transport>, url: Arc<str>, text: String);
}

/// Fire and forget. Transport errors are logged and dropped.
#[derive(Debug, Default, Clone, Copy)]
pub struct Background;

#[async_trait]
impl Dispatch for Background {
    async fn send(&self, transport: Arc<dyn Transport>, url: Arc<str>, text: String) {
        tokio::spawn(async move {
            if let Err(e) = transport.post_json(&url, text).await {
                tracing::warn!(url = %url, error = %e, "Failed to deliver telemetry message");
                metrics::record_transport_failure("background");
            }
        });
    }
}

/// Send on the caller's task and record the outcome.
#[derive(Debug, Clone)]
pub struct Inline {
    recorder: Arc<Recorder>,
}

impl Inline {
    pub fn new(recorder: Arc<Recorder>) -> Self {
        Self { recorder }
    }

    pub fn recorder(&self) -> &Arc<Recorder> {
        &self.recorder
    }
}

#[async_trait]
impl Dispatch for Inline {
    async fn send(&self, transport: Arc<dyn Transport>, url: Arc<str>, text: String) {
        self.recorder.begin(&text);
        let outcome = transport.post_json(&url, text).await;
        if let Err(e) = &outcome {
            tracing::warn!(url = %url, error = %e, "Failed to deliver telemetry message");
            metrics::record_transport_failure("inline");
        }
        self.recorder.finish(&outcome);
    }
}
