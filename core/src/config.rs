//! Client configuration.
//!
//! `ClientConfig` is a plain serde struct so applications can keep it in
//! their own configuration files, and it can also be read from the
//! environment with `from_env`.

use std::env;
use std::fmt;
use std::path::PathBuf;

use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::error::{Result, ZabbixError};
use crate::http::TlsOptions;

pub const ENV_API_URL: &str = "ZABBIX_API_URL";
pub const ENV_HTTP_USER: &str = "ZABBIX_HTTP_USER";
pub const ENV_HTTP_PASSWORD: &str = "ZABBIX_HTTP_PASSWORD";
pub const ENV_TRACE: &str = "ZABBIX_API_TRACE";
pub const ENV_TOKEN_CACHE_DIR: &str = "ZABBIX_TOKEN_CACHE_DIR";
pub const ENV_CACHE_NAMESPACE: &str = "ZABBIX_CACHE_NAMESPACE";

/// HTTP basic authentication in front of the API endpoint.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BasicAuth {
    pub username: String,
    pub password: String,
}

impl BasicAuth {
    pub fn new(username: &str, password: &str) -> Self {
        Self {
            username: username.to_string(),
            password: password.to_string(),
        }
    }

    /// Value for the `Authorization` header.
    pub fn header_value(&self) -> String {
        let raw = format!("{}:{}", self.username, self.password);
        format!("Basic {}", base64::engine::general_purpose::STANDARD.encode(raw))
    }
}

impl fmt::Debug for BasicAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BasicAuth")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Full URL of `api_jsonrpc.php`.
    pub api_url: String,
    pub basic_auth: Option<BasicAuth>,
    pub tls: Option<TlsOptions>,
    /// Log raw request and response bodies at INFO.
    pub trace: bool,
    /// Session token to start with, skipping the first login.
    pub auth_token: Option<String>,
    /// Directory holding cached session tokens. Used by `user_login`.
    pub token_cache_dir: Option<PathBuf>,
    /// Mixed into cache keys so different local accounts sharing a cache
    /// directory do not collide. Typically the caller's OS user id.
    pub cache_namespace: String,
}

impl ClientConfig {
    pub fn new(api_url: &str) -> Self {
        Self {
            api_url: api_url.to_string(),
            ..Self::default()
        }
    }

    pub fn with_basic_auth(mut self, username: &str, password: &str) -> Self {
        self.basic_auth = Some(BasicAuth::new(username, password));
        self
    }

    pub fn with_tls(mut self, tls: TlsOptions) -> Self {
        self.tls = Some(tls);
        self
    }

    pub fn with_trace(mut self, trace: bool) -> Self {
        self.trace = trace;
        self
    }

    pub fn with_auth_token(mut self, token: &str) -> Self {
        self.auth_token = Some(token.to_string());
        self
    }

    pub fn with_token_cache(mut self, dir: impl Into<PathBuf>, namespace: &str) -> Self {
        self.token_cache_dir = Some(dir.into());
        self.cache_namespace = namespace.to_string();
        self
    }

    /// Build a configuration from `ZABBIX_*` environment variables.
    pub fn from_env() -> Result<Self> {
        let api_url = env::var(ENV_API_URL).map_err(|_| ZabbixError::Config(format!("{ENV_API_URL} is not set")))?;
        let mut config = Self::new(&api_url);

        if let Ok(user) = env::var(ENV_HTTP_USER) {
            let password = env::var(ENV_HTTP_PASSWORD).unwrap_or_default();
            config = config.with_basic_auth(&user, &password);
        }
        if let Ok(trace) = env::var(ENV_TRACE) {
            config.trace = matches!(trace.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on");
        }
        if let Ok(dir) = env::var(ENV_TOKEN_CACHE_DIR) {
            config.token_cache_dir = Some(PathBuf::from(dir));
        }
        if let Ok(namespace) = env::var(ENV_CACHE_NAMESPACE) {
            config.cache_namespace = namespace;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.api_url.is_empty() {
            return Err(ZabbixError::Config("api_url is empty".to_string()));
        }
        if !(self.api_url.starts_with("http://") || self.api_url.starts_with("https://")) {
            return Err(ZabbixError::Config(format!(
                "api_url must be an http or https URL, got {}",
                self.api_url
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_auth_header() {
        let auth = BasicAuth::new("Aladdin", "open sesame");
        assert_eq!(auth.header_value(), "Basic QWxhZGRpbjpvcGVuIHNlc2FtZQ==");
    }

    #[test]
    fn basic_auth_debug_hides_password() {
        let auth = BasicAuth::new("web", "hunter2");
        let dbg = format!("{auth:?}");
        assert!(dbg.contains("web"));
        assert!(!dbg.contains("hunter2"));
    }

    #[test]
    fn validate_rejects_bad_urls() {
        assert!(matches!(ClientConfig::new("").validate(), Err(ZabbixError::Config(_))));
        assert!(matches!(
            ClientConfig::new("ftp://zabbix/api_jsonrpc.php").validate(),
            Err(ZabbixError::Config(_))
        ));
        assert!(ClientConfig::new("https://zabbix.example.com/api_jsonrpc.php").validate().is_ok());
    }

    #[test]
    fn deserializes_with_defaults() {
        let config: ClientConfig = serde_json::from_str(
            r#"{"api_url":"https://zbx/api_jsonrpc.php","tls":{"verify_peer":false},"token_cache_dir":"/tmp"}"#,
        )
        .unwrap();
        assert_eq!(config.api_url, "https://zbx/api_jsonrpc.php");
        assert!(!config.trace);
        assert_eq!(config.tls.unwrap().ca_file, None);
        assert_eq!(config.token_cache_dir, Some(PathBuf::from("/tmp")));
        assert!(config.basic_auth.is_none());
    }

    #[test]
    fn tls_defaults_to_verifying() {
        let tls: TlsOptions = serde_json::from_str("{}").unwrap();
        assert!(tls.verify_peer);
    }

    #[test]
    fn builder_methods() {
        let config = ClientConfig::new("http://zbx/api_jsonrpc.php")
            .with_basic_auth("web", "secret")
            .with_trace(true)
            .with_auth_token("abc")
            .with_token_cache("/var/cache/zbx", "1000");
        assert!(config.trace);
        assert_eq!(config.auth_token.as_deref(), Some("abc"));
        assert_eq!(config.cache_namespace, "1000");
        assert_eq!(config.basic_auth.unwrap().username, "web");
    }
}
