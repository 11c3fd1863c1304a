use axum::http::{self, Request, StatusCode};
use http_body_util::BodyExt;
use mock_zabbix::{app, app_with_state, Db, API_PATH};
use serde_json::{json, Value};
use tower::ServiceExt;

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

fn rpc_request(body: &Value) -> Request<String> {
    Request::builder()
        .method("POST")
        .uri(API_PATH)
        .header(http::header::CONTENT_TYPE, "application/json-rpc")
        .body(body.to_string())
        .unwrap()
}

// --- envelope ---

#[tokio::test]
async fn version_without_auth() {
    let resp = app()
        .oneshot(rpc_request(&json!({"jsonrpc": "2.0", "method": "apiinfo.version", "params": [], "id": "7"})))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["result"], "5.0.3");
    assert_eq!(body["id"], "7");
    assert_eq!(body["jsonrpc"], "2.0");
}

#[tokio::test]
async fn wrong_content_type_returns_412() {
    let resp = app()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(API_PATH)
                .header(http::header::CONTENT_TYPE, "text/plain")
                .body("{}".to_string())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::PRECONDITION_FAILED);
}

#[tokio::test]
async fn invalid_json_is_parse_error() {
    let resp = app()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(API_PATH)
                .header(http::header::CONTENT_TYPE, "application/json-rpc")
                .body("{not json".to_string())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["error"]["code"], -32700);
}

// --- failure fixtures ---

#[tokio::test]
async fn empty_route_has_no_body() {
    let resp = app()
        .oneshot(Request::builder().method("POST").uri("/empty").body(String::new()).unwrap())
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert!(body_bytes(resp).await.is_empty());
}

#[tokio::test]
async fn garbage_route_is_not_json() {
    let resp = app()
        .oneshot(Request::builder().method("POST").uri("/garbage").body(String::new()).unwrap())
        .await
        .unwrap();

    let bytes = body_bytes(resp).await;
    assert!(serde_json::from_slice::<Value>(&bytes).is_err());
}

// --- session lifecycle ---

#[tokio::test]
async fn session_lifecycle() {
    use tower::Service;

    let db = Db::default();
    let mut app = app_with_state(db.clone()).into_service();

    // login
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(rpc_request(&json!({
            "jsonrpc": "2.0",
            "method": "user.login",
            "params": {"user": "Admin", "password": "zabbix"},
            "id": "1"
        })))
        .await
        .unwrap();
    let token = body_json(resp).await["result"].as_str().unwrap().to_string();

    // host.get with the session
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(rpc_request(&json!({
            "jsonrpc": "2.0",
            "method": "host.get",
            "params": {"output": "extend"},
            "id": "2",
            "auth": token
        })))
        .await
        .unwrap();
    let hosts = body_json(resp).await;
    assert_eq!(hosts["result"][0]["hostid"], "10084");

    // logout
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(rpc_request(&json!({
            "jsonrpc": "2.0",
            "method": "user.logout",
            "params": [],
            "id": "3",
            "auth": token
        })))
        .await
        .unwrap();
    assert_eq!(body_json(resp).await["result"], true);

    // the old token is gone
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(rpc_request(&json!({
            "jsonrpc": "2.0",
            "method": "host.get",
            "params": {},
            "id": "4",
            "auth": token
        })))
        .await
        .unwrap();
    assert_eq!(body_json(resp).await["error"]["code"], -32602);

    let state = db.read().await;
    assert_eq!(state.calls, ["user.login", "host.get", "user.logout", "host.get"]);
    assert!(state.sessions.is_empty());
}

#[tokio::test]
async fn records_authorization_header() {
    let db = Db::default();
    let resp = app_with_state(db.clone())
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(API_PATH)
                .header(http::header::CONTENT_TYPE, "application/json-rpc")
                .header(http::header::AUTHORIZATION, "Basic d2ViOnNlY3JldA==")
                .body(json!({"jsonrpc": "2.0", "method": "apiinfo.version", "params": [], "id": "1"}).to_string())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(db.read().await.last_authorization.as_deref(), Some("Basic d2ViOnNlY3JldA=="));
}
