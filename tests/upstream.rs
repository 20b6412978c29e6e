//! End-to-end tests over real sockets: nanocode forwarding, readiness,
//! and per-IP limiting keyed on the connection address.

use reqwest::StatusCode;
use serde_json::Value;

mod common;

fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}

#[tokio::test]
async fn test_nanocode_forwards_to_model_server() {
    let model_addr = common::start_mock_model_server().await;
    let settings = common::settings(60, &format!("http://{}", model_addr));
    let (gateway_addr, shutdown) = common::start_gateway(settings).await;

    let res = client()
        .post(format!("http://{}/nanocode/echo/v1/generate?stream=false", gateway_addr))
        .header("content-type", "application/json")
        .body(r#"{"prompt":"hello"}"#)
        .send()
        .await
        .expect("Gateway unreachable");

    assert_eq!(res.status(), StatusCode::CREATED);
    assert_eq!(res.headers()["x-frame-options"], "DENY");
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["method"], "POST");
    assert_eq!(body["path"], "/echo/v1/generate");
    assert_eq!(body["query"], "stream=false");
    assert_eq!(body["content_type"], "application/json");
    assert_eq!(body["body"], r#"{"prompt":"hello"}"#);

    shutdown.trigger();
}

#[tokio::test]
async fn test_nanocode_timeout_maps_to_504() {
    let model_addr = common::start_mock_model_server().await;
    let mut settings = common::settings(60, &format!("http://{}", model_addr));
    settings.model_timeout_seconds = 0.2;
    let (gateway_addr, shutdown) = common::start_gateway(settings).await;

    let res = client()
        .get(format!("http://{}/nanocode/slow", gateway_addr))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::GATEWAY_TIMEOUT);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["detail"], "Model server timed out");

    shutdown.trigger();
}

#[tokio::test]
async fn test_unreachable_model_server() {
    let dead = common::closed_port().await;
    let settings = common::settings(60, &format!("http://{}", dead));
    let (gateway_addr, shutdown) = common::start_gateway(settings).await;
    let client = client();

    let res = client
        .get(format!("http://{}/nanocode/models", gateway_addr))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_GATEWAY);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["detail"], "Model server unavailable");

    let ready = client
        .get(format!("http://{}/health/ready", gateway_addr))
        .send()
        .await
        .unwrap();
    assert_eq!(ready.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body: Value = ready.json().await.unwrap();
    assert_eq!(body["status"], "not_ready");

    shutdown.trigger();
}

#[tokio::test]
async fn test_readiness_with_live_model_server() {
    let model_addr = common::start_mock_model_server().await;
    let settings = common::settings(60, &format!("http://{}", model_addr));
    let (gateway_addr, shutdown) = common::start_gateway(settings).await;

    let res = client()
        .get(format!("http://{}/health/ready", gateway_addr))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["status"], "ready");
    assert_eq!(body["model_server_reachable"], true);

    shutdown.trigger();
}

#[tokio::test]
async fn test_rate_limit_keys_on_connection_address() {
    let settings = common::settings(5, "http://127.0.0.1:9");
    let (gateway_addr, shutdown) = common::start_gateway(settings).await;
    let client = client();
    let url = format!("http://{}/health", gateway_addr);

    // Fresh connections each time; the key is the IP, not the socket.
    for i in 0..5 {
        let res = client.get(&url).send().await.unwrap();
        assert_eq!(res.status(), StatusCode::OK, "request {} should pass", i + 1);
    }

    let res = client.get(&url).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(res.headers()["strict-transport-security"], "max-age=31536000; includeSubDomains");
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["detail"], "Rate limit exceeded: maximum 5 requests per minute");

    let limits: Value = client
        .get(format!("http://{}/admin/rate-limits", gateway_addr))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    // Admin routes draw from the same per-IP budget.
    assert_eq!(limits["detail"], "Rate limit exceeded: maximum 5 requests per minute");

    shutdown.trigger();
}
