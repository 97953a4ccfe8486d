//! HTTP capture subsystem.
//!
//! # Data Flow
//! ```text
//! inbound request
//!     → traffic.rs (middleware entry point)
//!     → extract.rs (request id, headers, body read-and-restore, client ip)
//!     → [downstream handlers]
//!     → capture.rs (tee response body while it streams to the client)
//!     → UbtClient (request and response phase messages)
//! ```

pub mod capture;
pub mod extract;
pub mod server;
pub mod traffic;

pub use capture::CaptureBody;
pub use extract::RequestId;
pub use server::HttpServer;
pub use traffic::{traffic_middleware, with_traffic_capture};
