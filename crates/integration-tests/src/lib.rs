//! Integration test helpers for the VeriQuick API.
//!
//! The tests in `tests/` drive a running server over HTTP. They are ignored
//! by default and require:
//! - A running `PostgreSQL` database with migrations applied
//! - The API server running (`cargo run -p veriquick-api`)
//! - `API_BASE_URL` pointing at it (default: <http://localhost:4000>)
//!
//! Run with: `cargo test -p veriquick-integration-tests -- --ignored`

#![cfg_attr(not(test), forbid(unsafe_code))]

use reqwest::Client;
use serde_json::{Value, json};
use uuid::Uuid;

/// Base URL for the API (configurable via environment).
#[must_use]
pub fn api_base_url() -> String {
    std::env::var("API_BASE_URL").unwrap_or_else(|_| "http://localhost:4000".to_string())
}

/// Create an HTTP client with a cookie store (sessions ride on cookies).
///
/// # Panics
///
/// Panics if the client cannot be built.
#[must_use]
pub fn client() -> Client {
    Client::builder()
        .cookie_store(true)
        .build()
        .expect("Failed to create HTTP client")
}

/// Register a throwaway user and leave the client logged in.
///
/// Returns the registered email address.
///
/// # Panics
///
/// Panics when registration does not answer 201.
pub async fn register_test_user(client: &Client) -> String {
    let base_url = api_base_url();
    let email = format!("it-{}@example.com", Uuid::new_v4());

    let resp = client
        .post(format!("{base_url}/api/auth/register"))
        .json(&json!({
            "email": email,
            "password": "integration-test-pass",
            "name": "Integration Test",
        }))
        .send()
        .await
        .expect("Failed to register test user");

    assert_eq!(resp.status().as_u16(), 201, "registration failed");
    email
}

/// Create a pending verification order for the logged-in user.
///
/// Requires the pricing catalog to be seeded (`vq-cli seed`).
///
/// # Panics
///
/// Panics when order creation does not answer 201.
pub async fn create_pan_order(client: &Client) -> Value {
    let base_url = api_base_url();

    let resp = client
        .post(format!("{base_url}/api/orders"))
        .json(&json!({
            "order_type": "verification",
            "verification_kind": "pan",
            "billing_period": "one-time",
            "payment_method": "upi",
        }))
        .send()
        .await
        .expect("Failed to create order");

    assert_eq!(resp.status().as_u16(), 201, "order creation failed");

    let body: Value = resp.json().await.expect("Failed to parse order response");
    body["data"]["order"].clone()
}
