//! Request extraction.
//!
//! # Responsibilities
//! - Resolve or generate the request identifier (UUID v4)
//! - Snapshot headers minus the ignore-list
//! - Read the request body and put it back for downstream handlers
//! - Resolve the client IP

use axum::{
    body::{Body, Bytes},
    extract::{ConnectInfo, MatchedPath},
    http::{header, HeaderMap, Request},
};
use std::collections::BTreeMap;
use std::net::SocketAddr;
use uuid::Uuid;

use crate::config::ClientConfig;
use crate::message::ReqMessage;

/// Request identifier, stored as a request extension for downstream handlers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestId(pub String);

impl RequestId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Header value as text, lossy for non UTF-8 bytes. Empty when absent.
pub fn header_value(headers: &HeaderMap, name: &str) -> String {
    headers
        .get(name)
        .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned())
        .unwrap_or_default()
}

/// Use the caller supplied id from `header_name`, or generate a fresh one.
pub fn resolve_request_id(headers: &HeaderMap, header_name: &str) -> String {
    let supplied = header_value(headers, header_name);
    if supplied.is_empty() {
        Uuid::new_v4().to_string()
    } else {
        supplied
    }
}

/// Canonical MIME form of a header name: `x-request-id` → `X-Request-Id`.
pub fn canonical_header_name(name: &str) -> String {
    name.split('-')
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => {
                    first.to_ascii_uppercase().to_string() + &chars.as_str().to_ascii_lowercase()
                }
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join("-")
}

/// Every header not on `ignore`, keyed by canonical name, with all its values.
pub fn filter_headers(headers: &HeaderMap, ignore: &[String]) -> BTreeMap<String, Vec<String>> {
    let mut filtered = BTreeMap::new();
    for name in headers.keys() {
        let canonical = canonical_header_name(name.as_str());
        if ignore.iter().any(|i| *i == canonical) {
            continue;
        }
        let values = headers
            .get_all(name)
            .iter()
            .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned())
            .collect();
        filtered.insert(canonical, values);
    }
    filtered
}

/// Compact JSON of [`filter_headers`]; empty on serialization failure.
pub fn headers_snapshot(headers: &HeaderMap, ignore: &[String]) -> String {
    serde_json::to_string(&filter_headers(headers, ignore)).unwrap_or_default()
}

/// `X-Forwarded-For` (first hop), then `X-Real-IP`, then the peer address.
pub fn client_ip<B>(request: &Request<B>) -> String {
    let headers = request.headers();
    let forwarded = header_value(headers, "x-forwarded-for");
    if let Some(first) = forwarded.split(',').map(str::trim).find(|ip| !ip.is_empty()) {
        return first.to_string();
    }

    let real_ip = header_value(headers, "x-real-ip");
    if !real_ip.trim().is_empty() {
        return real_ip.trim().to_string();
    }

    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_default()
}

/// Read the whole body, returning the request with an identical body restored.
///
/// A failed read yields an empty body for both the capture and downstream.
pub async fn read_body(request: Request<Body>) -> (Request<Body>, Bytes) {
    let (parts, body) = request.into_parts();
    let bytes = match axum::body::to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::debug!(error = %e, "Failed to read request body for capture");
            Bytes::new()
        }
    };
    (Request::from_parts(parts, Body::from(bytes.clone())), bytes)
}

/// Build the request phase record and hand back the (restored) request.
///
/// The request id is stored as a [`RequestId`] extension; an id already
/// present there is reused.
pub async fn capture_request(
    request: Request<Body>,
    config: &ClientConfig,
) -> (Request<Body>, ReqMessage) {
    let id = match request.extensions().get::<RequestId>() {
        Some(existing) => existing.0.clone(),
        None => resolve_request_id(request.headers(), &config.request_id_header),
    };

    let headers = request.headers();
    let mut message = ReqMessage {
        ip: client_ip(&request),
        method: request.method().to_string(),
        path: request.uri().path().to_string(),
        query: request.uri().query().unwrap_or_default().to_string(),
        url: request
            .extensions()
            .get::<MatchedPath>()
            .map(|p| p.as_str().to_string())
            .unwrap_or_else(|| request.uri().to_string()),
        id: id.clone(),
        api: header_value(headers, &config.api_header),
        ua: header_value(headers, header::USER_AGENT.as_str()),
        headers: headers_snapshot(headers, &config.ignore_headers),
        ..Default::default()
    };

    let (mut request, body) = read_body(request).await;
    message.post_data = String::from_utf8_lossy(&body).into_owned();
    request.extensions_mut().insert(RequestId(id));

    (request, message)
}
