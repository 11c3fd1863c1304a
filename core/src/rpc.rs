//! JSON-RPC 2.0 envelopes in the Zabbix dialect.
//!
//! # Design
//! `auth` is tri-state on the wire: omitted for anonymous methods, `null`
//! when the method needs a session but none is held, and the token string
//! otherwise. `Option<Option<String>>` models that directly; a custom
//! deserializer keeps an explicit `null` distinct from a missing field.
//!
//! Responses are decoded into `serde_json::Value` first because the only
//! structure Zabbix guarantees is the envelope; `result` can be any JSON.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::error::{Result, RpcError, ZabbixError};

pub const JSONRPC_VERSION: &str = "2.0";

/// A single request envelope. Built fresh for every call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcRequest {
    pub jsonrpc: String,
    pub method: String,
    pub params: Value,
    pub id: String,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "present"
    )]
    pub auth: Option<Option<String>>,
}

fn present<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<Option<Option<String>>, D::Error> {
    Option::<String>::deserialize(d).map(Some)
}

impl RpcRequest {
    /// `auth` is `None` for anonymous calls and `Some(token)` otherwise, where
    /// the inner `None` is sent as `null`.
    pub fn new(method: &str, params: Value, auth: Option<Option<String>>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            method: method.to_string(),
            params,
            id: request_id(),
            auth,
        }
    }

    /// Compact JSON text of the envelope.
    pub fn encode(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| ZabbixError::Protocol(e.to_string()))
    }
}

/// Digits of the current Unix time in seconds with four fractional digits,
/// e.g. `17293456781234`.
pub fn request_id() -> String {
    let now = SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default();
    format!("{}{:04}", now.as_secs(), now.subsec_micros() / 100)
}

/// A decoded response body.
#[derive(Debug, Clone, PartialEq)]
pub enum RpcResponse {
    Result(Value),
    Error(RpcError),
}

impl RpcResponse {
    /// Decode a response body. Anything that is not a JSON object or array is
    /// a protocol error, as is an `error` member without a usable shape.
    pub fn decode(body: &str) -> Result<Self> {
        let decoded: Value = serde_json::from_str(body).map_err(|e| ZabbixError::Protocol(e.to_string()))?;
        match decoded {
            Value::Object(mut envelope) => {
                match envelope.remove("error") {
                    None | Some(Value::Null) => {}
                    Some(error) => {
                        let error: RpcError =
                            serde_json::from_value(error).map_err(|e| ZabbixError::Protocol(e.to_string()))?;
                        return Ok(RpcResponse::Error(error));
                    }
                }
                Ok(RpcResponse::Result(envelope.remove("result").unwrap_or(Value::Null)))
            }
            // A top-level array carries no `result` member.
            Value::Array(_) => Ok(RpcResponse::Result(Value::Null)),
            other => Err(ZabbixError::Protocol(format!("unexpected top-level value {other}"))),
        }
    }

    pub fn into_result(self) -> Result<Value> {
        match self {
            RpcResponse::Result(v) => Ok(v),
            RpcResponse::Error(e) => Err(ZabbixError::Api(e)),
        }
    }
}

/// Re-key a list of objects by one of their fields.
///
/// Returns `result` unchanged unless it is a non-empty array in which every
/// element is an object carrying `key_field`. Order follows the server's.
pub fn rekey_result(result: Value, key_field: &str) -> Value {
    let items = match result {
        Value::Array(items) if !items.is_empty() => items,
        other => return other,
    };
    let keyed = items
        .iter()
        .all(|item| item.as_object().is_some_and(|o| o.contains_key(key_field)));
    if !keyed {
        return Value::Array(items);
    }

    let mut map = Map::with_capacity(items.len());
    for item in items {
        let key = match &item[key_field] {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        map.insert(key, item);
    }
    Value::Object(map)
}
