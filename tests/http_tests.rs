// tests/http_tests.rs
use health_actuator::{
    server::{HealthHandler, ServerBuilder},
    Actuator, ConstantIndicator, FnIndicator,
};
use hyper::{body::to_bytes, Body, Client, Method, Request, StatusCode};
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tower::ServiceExt;

const PATH: &str = "/actuator/health";

fn handler() -> HealthHandler {
    let actuator = Actuator::new();
    actuator.register_indicator("self", ConstantIndicator::up());
    actuator.register_indicator(
        "db",
        FnIndicator::new(|| Err(anyhow::anyhow!("connection refused"))),
    );
    HealthHandler::new(Arc::new(actuator), PATH)
}

async fn get(handler: HealthHandler, uri: &str) -> (StatusCode, String) {
    let req = Request::builder().uri(uri).body(Body::empty()).unwrap();
    let res = handler.oneshot(req).await.unwrap();
    let status = res.status();
    let body = to_bytes(res.into_body()).await.unwrap();
    (status, String::from_utf8(body.to_vec()).unwrap())
}

#[tokio::test]
async fn down_aggregate_is_still_200() {
    let (status, body) = get(handler(), PATH).await;
    assert_eq!(status, StatusCode::OK);

    let value: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(
        value,
        json!({
            "status": "DOWN",
            "components": {
                "db": { "status": "DOWN" },
                "self": { "status": "UP" }
            }
        })
    );
}

#[tokio::test]
async fn body_is_indented_json() {
    let (_, body) = get(handler(), PATH).await;
    assert!(body.starts_with("{\n  \"status\": \"DOWN\""));
}

#[tokio::test]
async fn detail_query_enables_details() {
    for uri in [
        format!("{}?detail", PATH),
        format!("{}?details=true", PATH),
        format!("{}?details=", PATH),
    ] {
        let (_, body) = get(handler(), &uri).await;
        let value: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(
            value["components"]["db"]["details"]["error"],
            "connection refused",
            "{}",
            uri
        );
        assert_eq!(value["components"]["self"]["details"], json!({}));
    }
}

#[tokio::test]
async fn other_detail_values_disable_details() {
    for uri in [format!("{}?details=false", PATH), format!("{}?detail=yes", PATH), PATH.to_string()] {
        let (_, body) = get(handler(), &uri).await;
        assert!(!body.contains("details"), "{}", uri);
    }
}

#[tokio::test]
async fn unknown_path_is_404() {
    let (status, body) = get(handler(), "/metrics").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, "Not Found");
}

#[tokio::test]
async fn post_is_rejected() {
    let req = Request::builder()
        .method(Method::POST)
        .uri(PATH)
        .body(Body::empty())
        .unwrap();
    let res = handler().oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn serves_over_tcp_until_shutdown() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

    let server = tokio::spawn(async move {
        ServerBuilder::from_listener(listener)
            .unwrap()
            .with_handler(handler())
            .serve_with_shutdown(async {
                let _ = shutdown_rx.await;
            })
            .await
    });

    let uri: hyper::Uri = format!("http://{}{}?details=true", addr, PATH).parse().unwrap();
    let res = Client::new().get(uri).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.headers()["content-type"], "application/json");

    let body = to_bytes(res.into_body()).await.unwrap();
    let value: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(value["status"], "DOWN");
    assert_eq!(value["components"]["db"]["details"]["error"], "connection refused");

    shutdown_tx.send(()).unwrap();
    server.await.unwrap().unwrap();
}
