//! Synchronous client for the Zabbix JSON-RPC API.
//!
//! # Overview
//! `ZabbixApi` builds JSON-RPC 2.0 envelopes, posts them through a
//! pluggable `Transport`, validates the response and returns its `result`.
//! It keeps the session token, can cache that token on disk between runs,
//! and exposes one wrapper per remote method generated from a static table.
//!
//! # Design
//! - Request building (`build_request`) and response parsing
//!   (`parse_response`) are plain functions over `HttpRequest` /
//!   `HttpResponse` data; `call` glues them through the transport.
//! - `serde_json::Value` models parameters and results, since Zabbix
//!   results are arbitrarily shaped.
//! - One client serves one caller at a time. There is no retry, pooling or
//!   batching.
//!
//! ```no_run
//! use serde_json::json;
//! use zabbix_api::{ClientConfig, ZabbixApi};
//!
//! let config = ClientConfig::new("https://zabbix.example.com/api_jsonrpc.php");
//! let mut api = ZabbixApi::connect(config, "Admin", "zabbix")?;
//! let hosts = api.host_get(json!({"output": ["host"]}), Some("hostid"))?;
//! println!("{hosts:#}");
//! # Ok::<(), zabbix_api::ZabbixError>(())
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod methods;
pub mod params;
pub mod rpc;
pub mod token_cache;
pub mod transport;

pub use client::ZabbixApi;
pub use config::{BasicAuth, ClientConfig};
pub use error::{ErrorKind, Result, RpcError, ZabbixError};
pub use http::{HttpRequest, HttpResponse, TlsOptions};
pub use methods::{ApiMethod, METHODS};
pub use params::normalize_params;
pub use rpc::{RpcRequest, RpcResponse};
pub use token_cache::{TokenCache, TokenCacheEntry};
pub use transport::{Transport, TransportError, UreqTransport};
