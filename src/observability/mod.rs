//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! client / middleware produce:
//!     → logging.rs (structured local diagnostics via tracing)
//!     → metrics.rs (dispatch and failure counters)
//!
//! Consumers:
//!     → stdout (fmt layer)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Local diagnostics never go through the telemetry pipeline itself
//! - Metrics are cheap (atomic increments)

pub mod logging;
pub mod metrics;
