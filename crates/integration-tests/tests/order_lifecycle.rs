//! Integration tests for the order lifecycle.
//!
//! These tests require:
//! - A running `PostgreSQL` database with migrations applied
//! - The API server running (cargo run -p veriquick-api)
//! - A seeded pricing catalog (vq-cli seed)
//!
//! Run with: cargo test -p veriquick-integration-tests -- --ignored

use serde_json::Value;

use veriquick_integration_tests::{api_base_url, client, create_pan_order, register_test_user};

// ============================================================================
// Creation & listing
// ============================================================================

#[tokio::test]
#[ignore = "Requires running API server and seeded catalog"]
async fn test_create_order_provisions_quota() {
    let client = client();
    register_test_user(&client).await;

    let order = create_pan_order(&client).await;

    assert_eq!(order["order_type"], "verification");
    assert_eq!(order["verification_kind"], "pan");
    assert_eq!(order["payment_status"], "pending");
    assert!(
        order["verification_quota"]["total_allowed"].as_i64().unwrap_or(0) >= 1,
        "verification order should carry a quota"
    );
    assert_eq!(order["verification_quota"]["used"], 0);
}

#[tokio::test]
#[ignore = "Requires running API server and seeded catalog"]
async fn test_list_orders_shows_created_order() {
    let client = client();
    register_test_user(&client).await;
    let order = create_pan_order(&client).await;
    let base_url = api_base_url();

    let resp = client
        .get(format!("{base_url}/api/orders"))
        .send()
        .await
        .expect("Failed to list orders");
    assert_eq!(resp.status().as_u16(), 200);

    let body: Value = resp.json().await.expect("Failed to parse listing");
    let orders = body["data"]["orders"].as_array().expect("orders array");
    assert!(
        orders
            .iter()
            .any(|o| o["order_ref"] == order["order_ref"]),
        "created order should appear in the listing"
    );
}

#[tokio::test]
#[ignore = "Requires running API server and seeded catalog"]
async fn test_orders_are_scoped_to_their_owner() {
    let alice = client();
    register_test_user(&alice).await;
    let order = create_pan_order(&alice).await;

    let bob = client();
    register_test_user(&bob).await;
    let base_url = api_base_url();

    let resp = bob
        .get(format!(
            "{base_url}/api/orders/{}",
            order["order_ref"].as_str().expect("order_ref")
        ))
        .send()
        .await
        .expect("Failed to fetch order");

    assert_eq!(resp.status().as_u16(), 404, "foreign orders must be invisible");
}

// ============================================================================
// Payment confirmation
// ============================================================================

#[tokio::test]
#[ignore = "Requires running API server and seeded catalog"]
async fn test_verify_payment_rejects_bad_signature() {
    let client = client();
    register_test_user(&client).await;
    let order = create_pan_order(&client).await;
    let base_url = api_base_url();

    let resp = client
        .post(format!("{base_url}/api/payments/razorpay/verify"))
        .json(&serde_json::json!({
            "order_ref": order["order_ref"],
            "razorpay_order_id": "order_fake",
            "razorpay_payment_id": "pay_fake",
            "razorpay_signature": "deadbeef",
        }))
        .send()
        .await
        .expect("Failed to post verification");

    assert_eq!(resp.status().as_u16(), 400, "forged signature must be rejected");

    // The order must remain pending
    let resp = client
        .get(format!(
            "{base_url}/api/orders/{}",
            order["order_ref"].as_str().expect("order_ref")
        ))
        .send()
        .await
        .expect("Failed to fetch order");
    let body: Value = resp.json().await.expect("Failed to parse order");
    assert_eq!(body["data"]["order"]["payment_status"], "pending");
}

#[tokio::test]
#[ignore = "Requires running API server and seeded catalog"]
async fn test_webhook_rejects_unsigned_delivery() {
    let client = client();
    let base_url = api_base_url();

    let resp = client
        .post(format!("{base_url}/api/payments/razorpay/webhook"))
        .json(&serde_json::json!({
            "event": "payment.captured",
            "payload": { "payment": { "entity": {
                "id": "pay_fake",
                "order_id": "order_fake",
                "status": "captured",
            }}},
        }))
        .send()
        .await
        .expect("Failed to post webhook");

    assert_eq!(resp.status().as_u16(), 400, "unsigned webhook must be rejected");
}

// ============================================================================
// Cancellation
// ============================================================================

#[tokio::test]
#[ignore = "Requires running API server and seeded catalog"]
async fn test_cancel_order_is_not_repeatable() {
    let client = client();
    register_test_user(&client).await;
    let order = create_pan_order(&client).await;
    let base_url = api_base_url();
    let order_ref = order["order_ref"].as_str().expect("order_ref");

    let resp = client
        .post(format!("{base_url}/api/orders/{order_ref}/cancel"))
        .send()
        .await
        .expect("Failed to cancel order");
    assert_eq!(resp.status().as_u16(), 200);

    let resp = client
        .post(format!("{base_url}/api/orders/{order_ref}/cancel"))
        .send()
        .await
        .expect("Failed to cancel order twice");
    assert_eq!(
        resp.status().as_u16(),
        400,
        "second cancellation must be refused"
    );
}
