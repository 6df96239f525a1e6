//! Failure injection tests for the gateway.

use reqwest::StatusCode;
use serde_json::{json, Value};

use rpc_gateway::echo::messages::{Echo, GetEchoRequest};
use rpc_gateway::echo::{echo_routes, EchoService};
use rpc_gateway::rpc::{Code, RpcError, Status};
use rpc_gateway::{GatewayConfig, Route, RouteTable};

mod common;

fn faulty_routes() -> RouteTable {
    RouteTable::new([
        Route::get("/panic/{id}")
            .response_field("echo")
            .unary("FaultyService/Panic", |req: GetEchoRequest| async move {
                if req.id > 0 {
                    panic!("backend blew up on {}", req.id);
                }
                Ok::<_, RpcError>(Echo::new(req.id, "survived"))
            })
            .unwrap(),
        Route::get("/missing/{id}")
            .unary("FaultyService/Missing", |req: GetEchoRequest| async move {
                Err::<Echo, _>(RpcError::from(Status::not_found(format!("no echo {}", req.id))))
            })
            .unwrap(),
        Route::get("/unavailable")
            .unary("FaultyService/Unavailable", |_: GetEchoRequest| async move {
                Err::<Echo, _>(RpcError::from(Status::new(Code::Unavailable, "try later")))
            })
            .unwrap(),
    ])
    .unwrap()
}

#[tokio::test]
async fn test_backend_panic_is_unknown() {
    let gateway = common::start_gateway_with(GatewayConfig::default(), faulty_routes()).await;
    let client = common::client();

    let res = client.get(gateway.url("/panic/1")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(res.json::<Value>().await.unwrap(), json!({"message": "UNKNOWN"}));

    // The server keeps serving after a panic.
    let res = client.get(gateway.url("/panic/0")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(
        res.json::<Value>().await.unwrap(),
        json!({"echo": {"id": 0, "content": "survived"}})
    );

    gateway.stop().await.unwrap();
}

#[tokio::test]
async fn test_declared_codes_map_to_http() {
    let gateway = common::start_gateway_with(GatewayConfig::default(), faulty_routes()).await;
    let client = common::client();

    let res = client.get(gateway.url("/missing/7")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        res.json::<Value>().await.unwrap(),
        json!({"message": "NOT_FOUND: no echo 7"})
    );

    let res = client.get(gateway.url("/unavailable")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(
        res.json::<Value>().await.unwrap(),
        json!({"message": "UNAVAILABLE: try later"})
    );

    gateway.stop().await.unwrap();
}

#[tokio::test]
async fn test_malformed_body_rejected() {
    let gateway = common::start_echo_gateway().await;
    let client = common::client();

    for body in [r#"{"echo":"#, "[1, 2]", r#""text""#] {
        let res = client
            .post(gateway.url("/echo"))
            .header("content-type", "application/json")
            .body(body)
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST, "{body}");
        let message = res.json::<Value>().await.unwrap()["message"].clone();
        assert!(message.as_str().is_some_and(|m| !m.is_empty()), "{body}");
    }

    gateway.stop().await.unwrap();
}

#[tokio::test]
async fn test_named_body_requires_object() {
    let gateway = common::start_echo_gateway().await;
    let res = common::client()
        .post(gateway.url("/echo/in"))
        .header("content-type", "application/json")
        .body("42")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    gateway.stop().await.unwrap();
}

#[tokio::test]
async fn test_body_wrong_field_type() {
    let gateway = common::start_echo_gateway().await;
    let res = common::client()
        .put(gateway.url("/echo"))
        .header("content-type", "application/json")
        .body(r#"{"id":"one"}"#)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    gateway.stop().await.unwrap();
}

#[tokio::test]
async fn test_oversized_body() {
    let mut config = GatewayConfig::default();
    config.limits.max_body_size = 16;
    let routes = echo_routes(std::sync::Arc::new(EchoService::new())).unwrap();
    let gateway = common::start_gateway_with(config, routes).await;

    let res = common::client()
        .post(gateway.url("/echo"))
        .header("content-type", "application/json")
        .body(format!(r#"{{"echo":{{"id":1,"content":"{}"}}}}"#, "x".repeat(64)))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::PAYLOAD_TOO_LARGE);
    gateway.stop().await.unwrap();
}

#[tokio::test]
async fn test_shutdown_stops_accepting() {
    let gateway = common::start_echo_gateway().await;
    let url = gateway.url("/echo/1");
    let client = common::client();

    assert_eq!(client.get(&url).send().await.unwrap().status(), StatusCode::OK);
    gateway.stop().await.unwrap();

    let fresh = common::client();
    assert!(fresh.get(&url).send().await.is_err());
}
