//! End-to-end request cycles through the traffic middleware.

use axum::{
    body::{to_bytes, Body, Bytes},
    http::{Request, StatusCode},
    routing::get,
    Extension, Router,
};
use serde_json::Value;
use std::time::Duration;
use tower::ServiceExt;

use ubt_telemetry::config::DispatchMode;
use ubt_telemetry::http::RequestId;
use ubt_telemetry::{with_traffic_capture, HttpServer, UbtClient};

mod common;

async fn send(router: Router, request: Request<Body>) -> (StatusCode, String) {
    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, String::from_utf8(body.to_vec()).unwrap())
}

fn phases(client: &UbtClient) -> (String, String) {
    let history = client.recorder().unwrap().history();
    assert_eq!(history.len(), 2, "one request and one response message");
    (history[0].clone(), history[1].clone())
}

#[tokio::test]
async fn test_get_without_body() {
    let (client, received) = common::inline_client().await;
    let router = HttpServer::build_router(client.clone());

    let request = Request::get("/ping").body(Body::empty()).unwrap();
    let (status, body) = send(router, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "pong");

    let (req_text, res_text) = phases(&client);
    assert!(req_text.contains(r#""logType":"request""#));
    assert!(req_text.contains(r#""method":"GET""#));
    assert!(req_text.contains(r#""url":"/ping""#));
    assert!(!req_text.contains("postData"));

    assert!(res_text.contains(r#""logType":"response""#));
    assert!(res_text.contains(r#""data":"pong""#));
    let res: Value = serde_json::from_str(&res_text).unwrap();
    let response_time = res["res"]["responseTime"].as_str().unwrap();
    assert!(response_time.parse::<u128>().is_ok());

    assert_eq!(received.len(), 2);
    assert_eq!(client.recorder().unwrap().last_response(), r#"{"code":0}"#);
    assert_eq!(client.recorder().unwrap().last_error(), None);
}

#[tokio::test]
async fn test_post_form_body() {
    let (client, _) = common::inline_client().await;
    let router = HttpServer::build_router(client.clone());

    let request = Request::post("/ping")
        .header("content-type", "application/x-www-form-urlencoded")
        .body(Body::from("a=1&b=2"))
        .unwrap();
    let (_, body) = send(router, request).await;
    assert_eq!(body, "post pong");

    let (req_text, res_text) = phases(&client);
    assert!(req_text.contains(r#""method":"POST""#));
    assert!(req_text.contains(r#""path":"/ping""#));
    assert!(req_text.contains(r#""postData":"a=1&b=2""#));
    assert!(res_text.contains(r#""data":"post pong""#));
}

#[tokio::test]
async fn test_post_json_body_reaches_handler_unchanged() {
    let (client, _) = common::inline_client().await;
    let router = HttpServer::build_router(client.clone());

    let request = Request::post("/echo")
        .header("content-type", "application/json")
        .body(Body::from(r#"{"a": 1, "b": 2}"#))
        .unwrap();
    let (_, body) = send(router, request).await;
    assert_eq!(body, r#"{"a": 1, "b": 2}"#);

    let (req_text, res_text) = phases(&client);
    assert!(req_text.contains(r#""postData":"{\"a\": 1, \"b\": 2}""#));

    let res: Value = serde_json::from_str(&res_text).unwrap();
    assert_eq!(res["res"]["data"], r#"{"a": 1, "b": 2}"#);
    assert_eq!(res["res"]["contentType"], "application/json");
}

#[tokio::test]
async fn test_failed_request_body_read_is_replaced_by_empty_body() {
    let (client, _) = common::inline_client().await;
    let router = HttpServer::build_router(client.clone());

    let chunks: Vec<Result<Bytes, std::io::Error>> = vec![
        Ok(Bytes::from("par")),
        Err(std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset")),
    ];
    let request = Request::post("/echo")
        .body(Body::from_stream(futures_util::stream::iter(chunks)))
        .unwrap();
    let (status, body) = send(router, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "");

    let (req_text, res_text) = phases(&client);
    assert!(req_text.contains(r#""path":"/echo""#));
    assert!(!req_text.contains("postData"));
    assert!(res_text.contains(r#""status":200"#));
    assert_eq!(client.recorder().unwrap().last_error(), None);
}

#[tokio::test]
async fn test_request_id_header_is_used_verbatim() {
    let (client, _) = common::inline_client().await;
    let router = HttpServer::build_router(client.clone());

    let request = Request::get("/ping")
        .header("requestid", "client-supplied-42")
        .body(Body::empty())
        .unwrap();
    send(router, request).await;

    let (req_text, _) = phases(&client);
    let req: Value = serde_json::from_str(&req_text).unwrap();
    assert_eq!(req["req"]["id"], "client-supplied-42");
}

#[tokio::test]
async fn test_generated_request_ids_differ_and_reach_handler() {
    let (client, _) = common::inline_client().await;
    let routes = Router::new().route(
        "/id",
        get(|Extension(id): Extension<RequestId>| async move { id.0 }),
    );
    let router = with_traffic_capture(routes, client.clone());

    let mut seen = Vec::new();
    for _ in 0..2 {
        let (_, handler_id) = send(
            router.clone(),
            Request::get("/id").body(Body::empty()).unwrap(),
        )
        .await;
        let (req_text, _) = phases(&client);
        let req: Value = serde_json::from_str(&req_text).unwrap();
        let id = req["req"]["id"].as_str().unwrap().to_string();

        assert!(!id.is_empty());
        assert_eq!(id, handler_id);
        seen.push(id);
        client.recorder().unwrap().clear();
    }
    assert_ne!(seen[0], seen[1]);
}

#[tokio::test]
async fn test_ignored_headers_are_left_out() {
    let (addr, _) = common::start_mock_collector().await;
    let mut config = common::client_config(addr, DispatchMode::Inline);
    config.ignore_headers = vec!["X-Secret".into()];
    let client = UbtClient::new(config).unwrap();
    let router = HttpServer::build_router(client.clone());

    let request = Request::get("/ping")
        .header("X-Secret", "a")
        .header("X-Other", "b")
        .body(Body::empty())
        .unwrap();
    send(router, request).await;

    let (req_text, _) = phases(&client);
    let req: Value = serde_json::from_str(&req_text).unwrap();
    let headers: Value = serde_json::from_str(req["req"]["headers"].as_str().unwrap()).unwrap();
    assert_eq!(headers["X-Other"], serde_json::json!(["b"]));
    assert!(headers.get("X-Secret").is_none());
}

#[tokio::test]
async fn test_streamed_response_is_captured_exactly() {
    let (client, _) = common::inline_client().await;
    let routes = Router::new().route(
        "/stream",
        get(|| async {
            let chunks: Vec<Result<Bytes, std::io::Error>> = (0..5)
                .map(|i| Ok(Bytes::from(format!("chunk-{i};"))))
                .collect();
            Body::from_stream(futures_util::stream::iter(chunks))
        }),
    );
    let router = with_traffic_capture(routes, client.clone());

    let (_, body) = send(router, Request::get("/stream").body(Body::empty()).unwrap()).await;
    assert_eq!(body, "chunk-0;chunk-1;chunk-2;chunk-3;chunk-4;");

    let (_, res_text) = phases(&client);
    let res: Value = serde_json::from_str(&res_text).unwrap();
    assert_eq!(res["res"]["data"], body);
}

#[tokio::test]
async fn test_error_responses_still_produce_both_phases() {
    let (client, _) = common::inline_client().await;
    let router = HttpServer::build_router(client.clone());

    let (status, _) = send(router.clone(), Request::get("/fail").body(Body::empty()).unwrap()).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let (_, res_text) = phases(&client);
    let res: Value = serde_json::from_str(&res_text).unwrap();
    assert_eq!(res["res"]["status"], 500);
    assert_eq!(res["res"]["data"], "internal error");

    client.recorder().unwrap().clear();
    let (status, _) = send(router, Request::get("/missing").body(Body::empty()).unwrap()).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (req_text, res_text) = phases(&client);
    assert!(req_text.contains(r#""path":"/missing""#));
    assert!(res_text.contains(r#""status":404"#));
}

#[tokio::test]
async fn test_unreachable_collector_does_not_affect_response() {
    // Nothing listens on the reserved port.
    let config = common::client_config("127.0.0.1:1".parse().unwrap(), DispatchMode::Inline);
    let client = UbtClient::new(config).unwrap();
    let router = HttpServer::build_router(client.clone());

    let (status, body) = send(router, Request::get("/ping").body(Body::empty()).unwrap()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "pong");

    let recorder = client.recorder().unwrap();
    assert_eq!(recorder.history().len(), 2);
    assert!(recorder.last_error().is_some());
    assert_eq!(recorder.last_response(), "");
}

#[tokio::test]
async fn test_background_mode_delivers_without_recording() {
    let (addr, received) = common::start_mock_collector().await;
    let client = UbtClient::new(common::client_config(addr, DispatchMode::Background)).unwrap();
    assert!(client.recorder().is_none());
    let router = HttpServer::build_router(client);

    let (_, body) = send(router, Request::get("/ping").body(Body::empty()).unwrap()).await;
    assert_eq!(body, "pong");

    for _ in 0..100 {
        if received.len() == 2 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    let bodies = received.bodies();
    assert_eq!(bodies.len(), 2);
    assert!(bodies.iter().any(|b| b.contains(r#""logType":"request""#)));
    assert!(bodies.iter().any(|b| b.contains(r#""data":"pong""#)));
}
