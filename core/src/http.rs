//! HTTP transport types for the host-does-IO pattern.
//!
//! # Design
//! These types describe HTTP requests and responses as plain data. The
//! client builds an `HttpRequest` for every JSON-RPC call and parses the
//! `HttpResponse` that comes back; whatever executes the round-trip in
//! between only has to honour the `Transport` contract.
//!
//! TLS settings travel with each request as an opaque option bag so the
//! transport can apply them to the connection it opens for that call.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// TLS parameters handed through to the transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TlsOptions {
    /// Verify the server certificate chain and host name.
    pub verify_peer: bool,
    /// PEM file with the certificate authority to trust instead of the
    /// platform roots.
    pub ca_file: Option<PathBuf>,
}

impl Default for TlsOptions {
    fn default() -> Self {
        Self {
            verify_peer: true,
            ca_file: None,
        }
    }
}

/// A JSON-RPC POST described as plain data.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
    pub tls: Option<TlsOptions>,
}

impl HttpRequest {
    /// First header value matching `name`, compared case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// An HTTP response described as plain data.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}
