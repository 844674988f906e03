//! Authentication gate and credential session lifecycle tests

use pretty_assertions::assert_eq;
use serde_json::Value;
use tests::{initialize_request, spawn_gateway, MockGenerator};

#[tokio::test]
async fn test_health_is_public() {
    let gateway = spawn_gateway(MockGenerator::succeeding("doc")).await;

    let response = gateway
        .client
        .get(gateway.url("/health"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["activeSessions"], 0);
}

#[tokio::test]
async fn test_mcp_rejects_missing_credentials() {
    let gateway = spawn_gateway(MockGenerator::succeeding("doc")).await;

    // No x-session-id header at all
    let response = gateway
        .client
        .post(gateway.url("/mcp"))
        .json(&initialize_request(1))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 401);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"]["code"], -32001);
    assert_eq!(body["error"]["message"], "Authentication required");
}

#[tokio::test]
async fn test_mcp_rejects_unknown_credentials() {
    let gateway = spawn_gateway(MockGenerator::succeeding("doc")).await;

    let response = gateway
        .mcp_post("no-such-session", None, &initialize_request(1))
        .await;

    assert_eq!(response.status(), 401);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"]["code"], -32001);
}

#[tokio::test]
async fn test_expired_credentials_are_rejected_and_evicted() {
    let gateway = spawn_gateway(MockGenerator::succeeding("doc")).await;
    let auth = gateway.login_expired();

    let response = gateway.mcp_post(&auth, None, &initialize_request(1)).await;

    assert_eq!(response.status(), 401);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"]["code"], -32001);
    assert_eq!(body["error"]["message"], "Session expired");

    // The gate evicted the entry; a second look behaves as "never existed"
    assert!(gateway.state.store.get(&auth).is_none());
}

#[tokio::test]
async fn test_auth_session_reports_valid_session() {
    let gateway = spawn_gateway(MockGenerator::succeeding("doc")).await;
    let auth = gateway.login();

    let response = gateway
        .client
        .get(gateway.url("/auth/session"))
        .header("x-session-id", &auth)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["authenticated"], true);
    assert_eq!(body["user"]["id"], "user_1");
    assert_eq!(body["user"]["email"], "user@example.com");
    assert!(body["expiresAt"].is_string());
}

#[tokio::test]
async fn test_auth_session_expired_is_unauthenticated_and_evicted() {
    let gateway = spawn_gateway(MockGenerator::succeeding("doc")).await;
    let auth = gateway.login_expired();

    for _ in 0..2 {
        let response = gateway
            .client
            .get(gateway.url("/auth/session"))
            .header("x-session-id", &auth)
            .send()
            .await
            .unwrap();

        assert_eq!(response.status(), 401);
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["authenticated"], false);
    }

    assert!(gateway.state.store.is_empty());
}

#[tokio::test]
async fn test_logout_is_idempotent() {
    let gateway = spawn_gateway(MockGenerator::succeeding("doc")).await;
    let auth = gateway.login();

    for _ in 0..2 {
        let response = gateway
            .client
            .post(gateway.url("/auth/logout"))
            .header("x-session-id", &auth)
            .send()
            .await
            .unwrap();

        assert_eq!(response.status(), 200);
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["success"], true);
    }

    assert!(gateway.state.store.is_empty());
}

#[tokio::test]
async fn test_logout_without_header_still_succeeds() {
    let gateway = spawn_gateway(MockGenerator::succeeding("doc")).await;

    let response = gateway
        .client
        .post(gateway.url("/auth/logout"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["success"], true);
}
