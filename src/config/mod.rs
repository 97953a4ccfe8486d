//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → UbtConfig (validated, immutable)
//!     → ClientConfig handed to UbtClient, shared read-only via Arc
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; the client never re-reads it
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{ClientConfig, DispatchMode, ListenerConfig, ObservabilityConfig, UbtConfig};
pub use validation::{validate_config, validate_server_url, ValidationError};
