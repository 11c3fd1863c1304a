//! Pluggable execution of `HttpRequest` values.
//!
//! `UreqTransport` is the default. It opens a fresh agent for every call:
//! there is no pooling and no retry, and HTTP error statuses come back as
//! data so the client decides what they mean.

use std::fs;

use ureq::tls::{Certificate, RootCerts, TlsConfig};

use crate::http::{HttpRequest, HttpResponse, TlsOptions};

/// Failure to complete an HTTP round-trip.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The connection could not be established or the request not sent.
    #[error("{0}")]
    Connect(String),

    /// The response body could not be read to completion.
    #[error("{0}")]
    Read(String),
}

/// Performs one blocking POST and returns the response as data.
pub trait Transport: Send {
    fn post(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError>;
}

/// Blocking transport backed by `ureq`.
#[derive(Debug, Clone, Default)]
pub struct UreqTransport;

impl UreqTransport {
    pub fn new() -> Self {
        Self
    }

    fn agent(tls: Option<&TlsOptions>) -> Result<ureq::Agent, TransportError> {
        let mut config = ureq::Agent::config_builder().http_status_as_error(false);
        if let Some(tls) = tls {
            let mut builder = TlsConfig::builder().disable_verification(!tls.verify_peer);
            if let Some(path) = &tls.ca_file {
                let pem = fs::read(path).map_err(|e| {
                    TransportError::Connect(format!("could not read CA file {}: {e}", path.display()))
                })?;
                let cert = Certificate::from_pem(&pem).map_err(|e| {
                    TransportError::Connect(format!("invalid CA file {}: {e}", path.display()))
                })?;
                builder = builder.root_certs(RootCerts::new_with_certs(&[cert]));
            }
            config = config.tls_config(builder.build());
        }
        Ok(config.build().new_agent())
    }
}

impl Transport for UreqTransport {
    fn post(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        let agent = Self::agent(request.tls.as_ref())?;

        let mut builder = agent.post(&request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        let mut response = builder
            .send(request.body.as_bytes())
            .map_err(|e| TransportError::Connect(e.to_string()))?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(k, v)| v.to_str().ok().map(|v| (k.as_str().to_string(), v.to_string())))
            .collect();
        let body = response
            .body_mut()
            .with_config()
            .limit(u64::MAX)
            .read_to_string()
            .map_err(|e| TransportError::Read(e.to_string()))?;

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}
