//! Telemetry message model.
//!
//! # Data Flow
//! ```text
//! middleware (request / response phase)  ─┐
//! leveled log calls (debug..fatal)       ─┼─→ Message
//! error reports                          ─┘      → client enrichment
//!                                                → serde_json
//!                                                → collector
//! ```
//!
//! # Design Decisions
//! - Empty fields are omitted from the wire form
//! - `logLevel` and `sdkVersion` are always emitted
//! - Wire names follow the collector's camelCase schema

pub mod level;
pub mod types;

pub use level::LogLevel;
pub use types::{ErrorMsg, ExtraMessage, Message, ReqMessage, ResMessage, SDK_VERSION};
