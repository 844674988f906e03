//! Session routing over the streamable HTTP transport

use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use tests::{initialize_request, notification, rpc_request, spawn_gateway, MockGenerator};

#[tokio::test]
async fn test_initialize_creates_session_and_reuses_it() {
    let gateway = spawn_gateway(MockGenerator::succeeding("doc")).await;
    let auth = gateway.login();

    let response = gateway.mcp_post(&auth, None, &initialize_request(1)).await;
    assert_eq!(response.status(), 200);
    let session_id = response
        .headers()
        .get("mcp-session-id")
        .expect("minted session id")
        .to_str()
        .unwrap()
        .to_string();

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["result"]["protocolVersion"], "2024-11-05");
    assert_eq!(body["result"]["serverInfo"]["name"], "docsmith-gateway");

    // Follow-up requests route to the same session
    let response = gateway
        .mcp_post(&auth, Some(&session_id), &rpc_request(2, "tools/list", json!({})))
        .await;
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["result"]["tools"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_request_without_transport_session_is_rejected() {
    let gateway = spawn_gateway(MockGenerator::succeeding("doc")).await;
    let auth = gateway.login();

    let response = gateway
        .mcp_post(&auth, None, &rpc_request(1, "tools/list", json!({})))
        .await;

    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"]["code"], -32000);
    assert!(gateway.state.registry.is_empty());
}

#[tokio::test]
async fn test_unknown_transport_session_is_rejected() {
    let gateway = spawn_gateway(MockGenerator::succeeding("doc")).await;
    let auth = gateway.login();

    let response = gateway
        .mcp_post(
            &auth,
            Some("bogus-session-id"),
            &rpc_request(1, "tools/list", json!({})),
        )
        .await;

    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"]["code"], -32000);
}

#[tokio::test]
async fn test_initialize_with_unknown_header_never_creates() {
    let gateway = spawn_gateway(MockGenerator::succeeding("doc")).await;
    let auth = gateway.login();

    // A stale id on an initialize is a reject, not a silent re-create
    let response = gateway
        .mcp_post(&auth, Some("stale-session-id"), &initialize_request(1))
        .await;

    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"]["code"], -32000);
    assert!(gateway.state.registry.is_empty());
}

#[tokio::test]
async fn test_unparseable_body_is_a_parse_error() {
    let gateway = spawn_gateway(MockGenerator::succeeding("doc")).await;
    let auth = gateway.login();

    let response = gateway
        .client
        .post(gateway.url("/mcp"))
        .header("x-session-id", &auth)
        .header("content-type", "application/json")
        .body("{ not json")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"]["code"], -32700);
}

#[tokio::test]
async fn test_unknown_method_does_not_close_the_session() {
    let gateway = spawn_gateway(MockGenerator::succeeding("doc")).await;
    let auth = gateway.login();
    let session_id = gateway.initialize(&auth).await;

    let response = gateway
        .mcp_post(&auth, Some(&session_id), &rpc_request(2, "no/such", json!({})))
        .await;
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"]["code"], -32601);

    // Session still answers
    let response = gateway
        .mcp_post(&auth, Some(&session_id), &rpc_request(3, "ping", json!({})))
        .await;
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert!(body["error"].is_null());
}

#[tokio::test]
async fn test_notifications_are_accepted_without_a_body() {
    let gateway = spawn_gateway(MockGenerator::succeeding("doc")).await;
    let auth = gateway.login();
    let session_id = gateway.initialize(&auth).await;

    let response = gateway
        .mcp_post(
            &auth,
            Some(&session_id),
            &notification("notifications/initialized"),
        )
        .await;

    assert_eq!(response.status(), 202);
}
