//! The Zabbix API client.
//!
//! # Design
//! `ZabbixApi` owns the configuration, the session token, the default
//! parameters and the text of the last request and response. Every remote
//! call goes through `call`, which is split the same way as the rest of the
//! crate: `build_request` produces an `HttpRequest`, the transport performs
//! the POST, and `parse_response` turns the `HttpResponse` into a result.
//!
//! All state-changing operations take `&mut self`. The client holds no lock;
//! share it across threads behind a `Mutex` or use one client per thread.

use std::fmt;
use std::path::Path;

use serde_json::{json, Map, Value};
use tracing::{debug, info, warn};

use crate::config::{BasicAuth, ClientConfig};
use crate::error::{Result, ZabbixError};
use crate::http::{HttpRequest, HttpResponse, TlsOptions};
use crate::methods;
use crate::params::normalize_params;
use crate::rpc::{rekey_result, RpcRequest, RpcResponse};
use crate::token_cache::{TokenCache, TokenCacheEntry};
use crate::transport::{Transport, TransportError, UreqTransport};

/// Target for raw request/response tracing.
pub const WIRE_TARGET: &str = "zabbix_api::wire";

pub const CONTENT_TYPE: &str = "application/json-rpc";

/// Synchronous client for one Zabbix API endpoint.
pub struct ZabbixApi {
    config: ClientConfig,
    transport: Box<dyn Transport>,
    auth_token: Option<String>,
    default_params: Map<String, Value>,
    last_request: String,
    last_response: String,
}

impl fmt::Debug for ZabbixApi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ZabbixApi")
            .field("config", &self.config)
            .field("authenticated", &self.auth_token.is_some())
            .field("default_params", &self.default_params)
            .finish_non_exhaustive()
    }
}

impl ZabbixApi {
    /// Client using the default `ureq` transport.
    pub fn new(config: ClientConfig) -> Result<Self> {
        Self::with_transport(config, UreqTransport::new())
    }

    pub fn with_transport(config: ClientConfig, transport: impl Transport + 'static) -> Result<Self> {
        config.validate()?;
        let mut api = Self {
            auth_token: None,
            config,
            transport: Box::new(transport),
            default_params: Map::new(),
            last_request: String::new(),
            last_response: String::new(),
        };
        if let Some(token) = api.config.auth_token.clone() {
            api.set_auth_token(&token);
        }
        Ok(api)
    }

    /// Build a client and log in, reusing a cached token when the
    /// configuration names a cache directory.
    pub fn connect(config: ClientConfig, user: &str, password: &str) -> Result<Self> {
        let mut api = Self::new(config)?;
        api.user_login(json!({"user": user, "password": password}), None)?;
        Ok(api)
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn api_url(&self) -> &str {
        &self.config.api_url
    }

    pub fn set_api_url(&mut self, api_url: &str) -> Result<()> {
        let mut config = self.config.clone();
        config.api_url = api_url.to_string();
        config.validate()?;
        self.config = config;
        Ok(())
    }

    pub fn set_basic_auth(&mut self, username: &str, password: &str) {
        self.config.basic_auth = Some(BasicAuth::new(username, password));
    }

    pub fn clear_basic_auth(&mut self) {
        self.config.basic_auth = None;
    }

    pub fn set_tls(&mut self, tls: Option<TlsOptions>) {
        self.config.tls = tls;
    }

    pub fn set_trace(&mut self, trace: bool) {
        self.config.trace = trace;
    }

    pub fn auth_token(&self) -> Option<&str> {
        self.auth_token.as_deref()
    }

    /// Use `token` for authenticated calls. An empty token clears the session.
    pub fn set_auth_token(&mut self, token: &str) {
        self.auth_token = (!token.is_empty()).then(|| token.to_string());
    }

    pub fn default_params(&self) -> &Map<String, Value> {
        &self.default_params
    }

    /// Replace the parameters merged under every associative call.
    ///
    /// Accepts an object, or an empty array meaning no defaults.
    pub fn set_default_params(&mut self, params: Value) -> Result<()> {
        self.default_params = match params {
            Value::Object(map) => map,
            Value::Array(items) if items.is_empty() => Map::new(),
            other => {
                return Err(ZabbixError::Config(format!(
                    "default params must be an object, got {other}"
                )))
            }
        };
        Ok(())
    }

    /// JSON text of the last request sent.
    pub fn last_request(&self) -> &str {
        &self.last_request
    }

    /// Body of the last response received.
    pub fn last_response(&self) -> &str {
        &self.last_response
    }

    /// Build the HTTP request for one JSON-RPC call. `params` is sent as is.
    pub fn build_request(&self, method: &str, params: Value, requires_auth: bool) -> Result<HttpRequest> {
        let auth = requires_auth.then(|| self.auth_token.clone());
        let body = RpcRequest::new(method, params, auth).encode()?;

        let mut headers = vec![("Content-type".to_string(), CONTENT_TYPE.to_string())];
        if let Some(basic) = &self.config.basic_auth {
            headers.push(("Authorization".to_string(), basic.header_value()));
        }

        Ok(HttpRequest {
            url: self.config.api_url.clone(),
            headers,
            body,
            tls: self.config.tls.clone(),
        })
    }

    /// Validate a response and extract its `result`, re-keyed by `key_field`
    /// when that is non-empty.
    ///
    /// A list where some element lacks `key_field` comes back unchanged.
    pub fn parse_response(&self, response: &HttpResponse, key_field: Option<&str>) -> Result<Value> {
        if !response.is_success() {
            return Err(ZabbixError::Connection {
                url: self.config.api_url.clone(),
                reason: format!("HTTP status {}", response.status),
            });
        }
        if response.body.trim().is_empty() {
            return Err(ZabbixError::NoData {
                url: self.config.api_url.clone(),
            });
        }

        let result = RpcResponse::decode(&response.body)?.into_result()?;
        Ok(match key_field {
            Some(field) if !field.is_empty() => rekey_result(result, field),
            _ => result,
        })
    }

    /// Perform one JSON-RPC round-trip with already normalized `params`.
    ///
    /// `key_field` re-keys the result as in `parse_response`; a list where
    /// some element lacks the field comes back unchanged.
    pub fn call(&mut self, method: &str, params: Value, key_field: Option<&str>, requires_auth: bool) -> Result<Value> {
        let request = self.build_request(method, params, requires_auth)?;
        self.last_request.clone_from(&request.body);
        self.last_response.clear();
        self.wire("API request", &request.body);

        let response = self.transport.post(&request).map_err(|e| match e {
            TransportError::Connect(reason) => ZabbixError::Connection {
                url: request.url.clone(),
                reason,
            },
            TransportError::Read(reason) => {
                debug!(url = %request.url, %reason, "failed to read response body");
                ZabbixError::NoData {
                    url: request.url.clone(),
                }
            }
        })?;

        self.last_response.clone_from(&response.body);
        self.wire("API response", &response.body);

        self.parse_response(&response, key_field)
    }

    /// Call any method by name: `params` are normalized and the auth
    /// requirement comes from the method table.
    pub fn request(&mut self, method: &str, params: impl Into<Value>, key_field: Option<&str>) -> Result<Value> {
        match methods::lookup(method).map(|m| m.name) {
            Some("user.login") => self.user_login(params, key_field).map(Value::String),
            Some("user.logout") => self.logout(params, key_field),
            _ => {
                let requires_auth = methods::requires_auth(method);
                self.invoke(method, params.into(), key_field, requires_auth)
            }
        }
    }

    pub(crate) fn invoke(&mut self, method: &str, params: Value, key_field: Option<&str>, requires_auth: bool) -> Result<Value> {
        let params = normalize_params(params, &self.default_params);
        self.call(method, params, key_field, requires_auth)
    }

    /// Log in, reusing the token cached under `cache_dir` when the server
    /// still accepts it. Returns the session token.
    pub fn login(&mut self, params: impl Into<Value>, key_field: Option<&str>, cache_dir: Option<&Path>) -> Result<String> {
        self.auth_token = None;
        let params = normalize_params(params.into(), &self.default_params);

        let entry = match (cache_dir, login_username(&params)) {
            (Some(dir), Some(user)) => TokenCache::open(dir, &self.config.cache_namespace).map(|c| c.entry(user)),
            _ => None,
        };

        if let Some(entry) = &entry {
            if let Some(token) = self.reuse_cached(entry) {
                return Ok(token);
            }
        }

        let result = self.call("user.login", params, key_field, false)?;
        let token = session_token(&result)?;
        self.auth_token = Some(token.clone());
        debug!("logged in");

        if let Some(entry) = &entry {
            if let Err(e) = entry.write(&token) {
                warn!(path = %entry.path().display(), error = %e, "could not cache session token");
            }
        }
        Ok(token)
    }

    /// `login` with the configured token cache directory.
    pub fn user_login(&mut self, params: impl Into<Value>, key_field: Option<&str>) -> Result<String> {
        let cache_dir = self.config.token_cache_dir.clone();
        self.login(params, key_field, cache_dir.as_deref())
    }

    /// Call `user.logout`. The session is dropped only if the call succeeds.
    pub fn logout(&mut self, params: impl Into<Value>, key_field: Option<&str>) -> Result<Value> {
        let params = normalize_params(params.into(), &self.default_params);
        let result = self.call("user.logout", params, key_field, true)?;
        self.auth_token = None;
        debug!("logged out");
        Ok(result)
    }

    pub fn user_logout(&mut self, params: impl Into<Value>, key_field: Option<&str>) -> Result<Value> {
        self.logout(params, key_field)
    }

    /// Try the cached token with a cheap authenticated call. A rejected token
    /// is dropped and its file deleted.
    fn reuse_cached(&mut self, entry: &TokenCacheEntry) -> Option<String> {
        let token = match entry.read() {
            Ok(Some(token)) => token,
            Ok(None) => return None,
            Err(e) => {
                warn!(path = %entry.path().display(), error = %e, "could not read cached session token");
                return None;
            }
        };

        self.set_auth_token(&token);
        match self.call("user.get", Value::Array(Vec::new()), None, true) {
            Ok(_) => {
                debug!(path = %entry.path().display(), "reusing cached session token");
                Some(token)
            }
            Err(e) => {
                debug!(path = %entry.path().display(), error = %e, "cached session token rejected");
                self.auth_token = None;
                if let Err(e) = entry.remove() {
                    warn!(path = %entry.path().display(), error = %e, "could not remove stale session token");
                }
                None
            }
        }
    }

    fn wire(&self, label: &str, text: &str) {
        // Bodies carry passwords and session tokens.
        if self.config.trace {
            info!(target: WIRE_TARGET, "{label}: {text}");
        }
    }
}

/// `user` for Zabbix before 5.4, `username` after.
fn login_username(params: &Value) -> Option<&str> {
    params
        .get("user")
        .or_else(|| params.get("username"))
        .and_then(Value::as_str)
        .filter(|u| !u.is_empty())
}

/// `user.login` returns the token, or an object carrying it in `sessionid`
/// when `userData` was requested.
fn session_token(result: &Value) -> Result<String> {
    let token = match result {
        Value::String(s) => Some(s.as_str()),
        Value::Object(o) => o.get("sessionid").and_then(Value::as_str),
        _ => None,
    };
    token
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .ok_or_else(|| ZabbixError::Protocol(format!("user.login returned no session token: {result}")))
}
