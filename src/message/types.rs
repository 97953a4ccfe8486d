//! Message schema shipped to the collector.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::message::LogLevel;

/// Schema version stamped onto every message.
pub const SDK_VERSION: &str = concat!("rust-", env!("CARGO_PKG_VERSION"));

/// The unit shipped to the collector.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub app_name: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub app_version: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub server_hostname: String,

    /// Space separated IPv4 addresses of the host.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub server_addr: String,

    pub log_level: LogLevel,

    #[serde(rename = "req", default, skip_serializing_if = "Option::is_none")]
    pub request: Option<ReqMessage>,

    #[serde(rename = "res", default, skip_serializing_if = "Option::is_none")]
    pub response: Option<ResMessage>,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub msg: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorMsg>,

    #[serde(flatten)]
    pub extra: ExtraMessage,

    #[serde(default)]
    pub sdk_version: String,
}

impl Message {
    /// Create a message at `level` with a free-text description.
    pub fn new(level: LogLevel, msg: impl Into<String>) -> Self {
        Self {
            log_level: level,
            msg: msg.into(),
            sdk_version: SDK_VERSION.to_string(),
            ..Default::default()
        }
    }

    pub fn with_request(mut self, request: ReqMessage) -> Self {
        self.request = Some(request);
        self
    }

    pub fn with_response(mut self, response: ResMessage) -> Self {
        self.response = Some(response);
        self
    }

    pub fn with_error(mut self, error: ErrorMsg) -> Self {
        self.error = Some(error);
        self
    }
}

/// Caller supplied metadata merged onto a message before dispatch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtraMessage {
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub business_info: BTreeMap<String, String>,

    /// Dotted feature namespace, e.g. `booking.payment`.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub module: String,

    /// `request` / `response` for middleware phases, free otherwise.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub log_type: String,
}

impl ExtraMessage {
    pub fn module(module: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            ..Default::default()
        }
    }

    pub fn log_type(log_type: impl Into<String>) -> Self {
        Self {
            log_type: log_type.into(),
            ..Default::default()
        }
    }

    pub fn with_business_info(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.business_info.insert(key.into(), value.into());
        self
    }

    /// Merge `other` into `self`. Empty values in `other` never blank existing ones.
    pub fn merge(&mut self, other: ExtraMessage) {
        self.business_info.extend(other.business_info);
        if !other.module.is_empty() {
            self.module = other.module;
        }
        if !other.log_type.is_empty() {
            self.log_type = other.log_type;
        }
    }
}

/// Request phase record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReqMessage {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub ip: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub method: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub path: String,

    /// Raw request body.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub post_data: String,

    /// Raw query string.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub query: String,

    /// Matched route template, or the request URI when no route matched.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub url: String,

    /// Request identifier.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,

    /// Caller declared logical api name (not the HTTP method).
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub api: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub ua: String,

    /// JSON snapshot of the captured headers.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub headers: String,
}

/// Response phase record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResMessage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub content_type: String,

    /// Handler time in whole milliseconds, base 10.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub response_time: String,

    /// Response body as sent to the client.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub data: String,
}

/// Error report record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorMsg {
    #[serde(default, skip_serializing_if = "is_zero")]
    pub code: i32,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub message: String,

    /// One `file:line` per frame, newline joined.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub stacks: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub file: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub line: String,
}

fn is_zero(code: &i32) -> bool {
    *code == 0
}
