//! Configuration validation.
//!
//! Returns all validation errors, not just the first. Runs before the
//! config is accepted into the system.

use axum::http::HeaderName;
use thiserror::Error;
use url::Url;

use crate::config::schema::UbtConfig;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("client.server_url '{0}' is not a valid http(s) URL")]
    InvalidServerUrl(String),

    #[error("client.app_name must not be empty")]
    EmptyAppName,

    #[error("{field} '{value}' is not a valid header name")]
    InvalidHeaderName { field: &'static str, value: String },

    #[error("listener.bind_address '{0}' is not a socket address")]
    InvalidBindAddress(String),
}

/// The collector URL must parse and use http or https.
pub fn validate_server_url(server_url: &str) -> Result<(), ValidationError> {
    match Url::parse(server_url) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => Ok(()),
        _ => Err(ValidationError::InvalidServerUrl(server_url.to_string())),
    }
}

/// Validate `config`, collecting every problem found.
pub fn validate_config(config: &UbtConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    let client = &config.client;

    if let Err(e) = validate_server_url(&client.server_url) {
        errors.push(e);
    }

    if client.app_name.trim().is_empty() {
        errors.push(ValidationError::EmptyAppName);
    }

    let headers = [
        ("client.request_id_header", &client.request_id_header),
        ("client.api_header", &client.api_header),
    ];
    for (field, value) in headers {
        if HeaderName::from_bytes(value.as_bytes()).is_err() {
            errors.push(ValidationError::InvalidHeaderName {
                field,
                value: value.clone(),
            });
        }
    }
    for value in &client.ignore_headers {
        if HeaderName::from_bytes(value.as_bytes()).is_err() {
            errors.push(ValidationError::InvalidHeaderName {
                field: "client.ignore_headers",
                value: value.clone(),
            });
        }
    }

    if config.listener.bind_address.parse::<std::net::SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidBindAddress(
            config.listener.bind_address.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
