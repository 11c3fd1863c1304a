//! Error types for the Zabbix API client.
//!
//! # Design
//! Failures fall into four kinds: bad configuration, a transport that could
//! not deliver a body, a body that is not a JSON-RPC payload, and an error
//! object returned by the server. `ErrorKind` exposes that taxonomy so
//! callers can branch without matching on every variant.
//!
//! Authentication failures are ordinary `Api` errors on the wire. They are
//! recognized by `is_auth_failure` instead of getting a variant of their own.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Messages Zabbix puts in `error.data` when credentials are missing,
/// expired or rejected.
const AUTH_FAILURE_MARKERS: &[&str] = &[
    "Not authorised",
    "Not authorized",
    "Session terminated",
    "re-login",
    "Login name or password is incorrect",
    "Incorrect user name or password",
];

/// The `error` member of a JSON-RPC response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcError {
    pub code: i64,
    #[serde(default)]
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl RpcError {
    /// Human readable detail: `data` when the server sent it, `message` otherwise.
    pub fn detail(&self) -> String {
        match &self.data {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Null) | None => self.message.clone(),
            Some(other) => other.to_string(),
        }
    }
}

impl fmt::Display for RpcError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "API error {}: {}", self.code, self.detail())
    }
}

/// Coarse classification of a `ZabbixError`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Config,
    Connection,
    Protocol,
    Api,
}

/// Errors returned by `ZabbixApi` operations.
#[derive(Debug, thiserror::Error)]
pub enum ZabbixError {
    /// The client was given configuration it cannot use.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// The endpoint could not be reached or refused to answer.
    #[error("could not connect to {url}: {reason}")]
    Connection { url: String, reason: String },

    /// A connection was made but no body could be read.
    #[error("could not read data from {url}")]
    NoData { url: String },

    /// The body is not a JSON object or array.
    #[error("could not decode JSON response: {0}")]
    Protocol(String),

    /// The server answered with a JSON-RPC error object.
    #[error("{0}")]
    Api(RpcError),
}

impl ZabbixError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ZabbixError::Config(_) => ErrorKind::Config,
            ZabbixError::Connection { .. } | ZabbixError::NoData { .. } => ErrorKind::Connection,
            ZabbixError::Protocol(_) => ErrorKind::Protocol,
            ZabbixError::Api(_) => ErrorKind::Api,
        }
    }

    /// The server-side error code, for `Api` errors.
    pub fn code(&self) -> Option<i64> {
        match self {
            ZabbixError::Api(e) => Some(e.code),
            _ => None,
        }
    }

    /// True for `Api` errors caused by a missing, stale or rejected session.
    pub fn is_auth_failure(&self) -> bool {
        match self {
            ZabbixError::Api(e) => {
                let detail = e.detail();
                AUTH_FAILURE_MARKERS.iter().any(|m| detail.contains(m))
            }
            _ => false,
        }
    }
}

impl From<RpcError> for ZabbixError {
    fn from(e: RpcError) -> Self {
        ZabbixError::Api(e)
    }
}

pub type Result<T> = std::result::Result<T, ZabbixError>;
