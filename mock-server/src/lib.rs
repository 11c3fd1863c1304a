//! In-memory server speaking the Zabbix JSON-RPC dialect.
//!
//! Implements just enough of the API to exercise a client end to end:
//! `apiinfo.version`, `user.login` / `user.logout` / `user.get` with real
//! session bookkeeping, and `host.get` / `host.delete` over a fixed host
//! list. Every call is recorded so tests can assert which methods ran.

use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
};

use axum::{
    extract::State,
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        HeaderMap, StatusCode,
    },
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

pub const API_PATH: &str = "/api_jsonrpc.php";

pub const DEFAULT_USER: &str = "Admin";
pub const DEFAULT_PASSWORD: &str = "zabbix";

#[derive(Debug, Clone)]
pub struct MockState {
    pub version: String,
    /// user name -> password
    pub users: HashMap<String, String>,
    pub sessions: HashSet<String>,
    pub hosts: Vec<Value>,
    /// Method names in the order they were received.
    pub calls: Vec<String>,
    pub last_authorization: Option<String>,
}

impl Default for MockState {
    fn default() -> Self {
        Self {
            version: "5.0.3".to_string(),
            users: HashMap::from([(DEFAULT_USER.to_string(), DEFAULT_PASSWORD.to_string())]),
            sessions: HashSet::new(),
            hosts: vec![
                json!({"hostid": "10084", "host": "Server A"}),
                json!({"hostid": "10085", "host": "Server B"}),
            ],
            calls: Vec::new(),
            last_authorization: None,
        }
    }
}

impl MockState {
    /// Number of received calls to `method`.
    pub fn count(&self, method: &str) -> usize {
        self.calls.iter().filter(|c| *c == method).count()
    }
}

pub type Db = Arc<RwLock<MockState>>;

pub fn app() -> Router {
    app_with_state(Db::default())
}

pub fn app_with_state(db: Db) -> Router {
    Router::new()
        .route(API_PATH, post(rpc))
        .route("/empty", post(empty))
        .route("/garbage", post(garbage))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

pub async fn run_with_state(listener: TcpListener, db: Db) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with_state(db)).await
}

async fn empty() -> StatusCode {
    StatusCode::OK
}

async fn garbage() -> &'static str {
    "<html><body>502 Bad Gateway</body></html>"
}

async fn rpc(State(db): State<Db>, headers: HeaderMap, body: String) -> Response {
    let content_type = headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    if !content_type.starts_with("application/json") {
        return (
            StatusCode::PRECONDITION_FAILED,
            "Zabbix API supports only \"application/json-rpc\" content type.",
        )
            .into_response();
    }

    let mut state = db.write().await;
    state.last_authorization = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let Ok(request) = serde_json::from_str::<Value>(&body) else {
        let error = rpc_error(
            -32700,
            "Parse error.",
            "Invalid JSON. An error occurred on the server while parsing the JSON text.",
        );
        return Json(json!({"jsonrpc": "2.0", "error": error, "id": null})).into_response();
    };

    let id = request.get("id").cloned().unwrap_or(Value::Null);
    let method = request["method"].as_str().unwrap_or_default().to_string();
    state.calls.push(method.clone());

    let envelope = match dispatch(&mut state, &method, &request) {
        Ok(result) => json!({"jsonrpc": "2.0", "result": result, "id": id}),
        Err(error) => json!({"jsonrpc": "2.0", "error": error, "id": id}),
    };
    Json(envelope).into_response()
}

fn rpc_error(code: i64, message: &str, data: &str) -> Value {
    json!({"code": code, "message": message, "data": data})
}

fn invalid_params(data: &str) -> Value {
    rpc_error(-32602, "Invalid params.", data)
}

fn dispatch(state: &mut MockState, method: &str, request: &Value) -> Result<Value, Value> {
    let params = &request["params"];
    let auth = request.get("auth");

    match method {
        "apiinfo.version" => {
            if auth.is_some() {
                return Err(invalid_params(
                    "The \"apiinfo.version\" method must be called without the \"auth\" parameter.",
                ));
            }
            Ok(json!(state.version))
        }
        "user.login" => login(state, params),
        _ => {
            let Some(token) = auth.and_then(Value::as_str).filter(|t| state.sessions.contains(*t)) else {
                return Err(invalid_params("Session terminated, re-login, please."));
            };
            let token = token.to_string();
            match method {
                "user.logout" => {
                    state.sessions.remove(&token);
                    Ok(json!(true))
                }
                "user.get" => Ok(json!([{"userid": "1", "alias": DEFAULT_USER}])),
                "host.get" => Ok(Value::Array(state.hosts.clone())),
                "host.delete" => delete_hosts(state, params),
                other => {
                    let object = other.split('.').next().unwrap_or_default();
                    Err(rpc_error(-32601, "Method not found.", &format!("Incorrect API \"{object}\".")))
                }
            }
        }
    }
}

fn login(state: &mut MockState, params: &Value) -> Result<Value, Value> {
    let user = params
        .get("user")
        .or_else(|| params.get("username"))
        .and_then(Value::as_str)
        .unwrap_or_default();
    let password = params.get("password").and_then(Value::as_str).unwrap_or_default();

    if state.users.get(user).map(String::as_str) != Some(password) {
        return Err(invalid_params("Login name or password is incorrect."));
    }

    let token = Uuid::new_v4().simple().to_string();
    state.sessions.insert(token.clone());
    if params.get("userData") == Some(&Value::Bool(true)) {
        return Ok(json!({"userid": "1", "alias": user, "sessionid": token}));
    }
    Ok(json!(token))
}

fn delete_hosts(state: &mut MockState, params: &Value) -> Result<Value, Value> {
    let ids: Vec<String> = params
        .as_array()
        .map(|ids| ids.iter().filter_map(|id| id.as_str().map(str::to_string)).collect())
        .unwrap_or_default();
    let known = |id: &String| state.hosts.iter().any(|h| h["hostid"] == id.as_str());
    if ids.is_empty() || !ids.iter().all(known) {
        return Err(invalid_params("No permissions to referred object or it does not exist!"));
    }
    state.hosts.retain(|h| !ids.iter().any(|id| h["hostid"] == id.as_str()));
    Ok(json!({"hostids": ids}))
}
