//! Integration tests for verification quota metering.
//!
//! These tests require:
//! - A running `PostgreSQL` database with migrations applied
//! - The API server running (cargo run -p veriquick-api)
//! - A seeded pricing catalog (vq-cli seed)
//!
//! Provider calls are NOT exercised here: a user with no paid order is
//! refused before any provider traffic happens, which is what these tests
//! pin down.
//!
//! Run with: cargo test -p veriquick-integration-tests -- --ignored

use serde_json::{Value, json};

use veriquick_integration_tests::{api_base_url, client, create_pan_order, register_test_user};

#[tokio::test]
#[ignore = "Requires running API server and seeded catalog"]
async fn test_verification_requires_quota() {
    let client = client();
    register_test_user(&client).await;
    let base_url = api_base_url();

    // Fresh user, no orders: the proxy must refuse before any provider call
    let resp = client
        .post(format!("{base_url}/api/verify/pan/fetch"))
        .json(&json!({ "pan_number": "ABCDE1234F", "consent": "Y" }))
        .send()
        .await
        .expect("Failed to post verification");

    assert_eq!(resp.status().as_u16(), 403);

    let body: Value = resp.json().await.expect("Failed to parse error body");
    assert_eq!(body["success"], false);
    assert!(
        body["message"]
            .as_str()
            .unwrap_or_default()
            .contains("quota"),
        "error should name the quota: {body}"
    );
}

#[tokio::test]
#[ignore = "Requires running API server and seeded catalog"]
async fn test_pending_order_grants_no_quota() {
    let client = client();
    register_test_user(&client).await;

    // An unpaid order exists, but quota only unlocks at payment completion
    create_pan_order(&client).await;

    let base_url = api_base_url();
    let resp = client
        .post(format!("{base_url}/api/verify/pan/fetch"))
        .json(&json!({ "pan_number": "ABCDE1234F", "consent": "Y" }))
        .send()
        .await
        .expect("Failed to post verification");

    assert_eq!(
        resp.status().as_u16(),
        403,
        "pending orders must not be consumable"
    );
}

#[tokio::test]
#[ignore = "Requires running API server and seeded catalog"]
async fn test_verification_requires_login() {
    let client = client();
    let base_url = api_base_url();

    let resp = client
        .post(format!("{base_url}/api/verify/pan/fetch"))
        .json(&json!({ "pan_number": "ABCDE1234F", "consent": "Y" }))
        .send()
        .await
        .expect("Failed to post verification");

    assert_eq!(resp.status().as_u16(), 401);
}
