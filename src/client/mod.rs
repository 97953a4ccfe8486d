//! Dispatch client subsystem.
//!
//! # Data Flow
//! ```text
//! Message (+ ExtraMessage)
//!     → ubt.rs (merge extra, stamp app identity, sdk version, host)
//!     → serde_json
//!     → dispatch.rs
//!         Background: tokio::spawn → transport.rs → collector
//!         Inline:     transport.rs → collector → recorder.rs
//! ```
//!
//! # Design Decisions
//! - The dispatch strategy is chosen once at construction
//! - Production and inline clients never share mutable state
//! - Delivery failures never reach the caller

pub mod dispatch;
pub mod host;
pub mod recorder;
pub mod transport;
pub mod ubt;

pub use dispatch::{Background, Dispatch, Inline};
pub use host::HostIdentity;
pub use recorder::{Recorder, RecorderState};
pub use transport::{HttpTransport, Transport, TransportError};
pub use ubt::{UbtClient, UbtError};
