//! End-to-end tests for the orders API.
//!
//! These talk HTTP to an already running server and are `#[ignore]`d by
//! default.
//!
//! # Running Tests
//!
//! ```bash
//! # Create tables and start the server
//! cargo run -p orders-api-cli -- init-db
//! cargo run -p orders-api-server
//!
//! # In another shell
//! ORDERS_BASE_URL=http://127.0.0.1:3000 cargo test -p orders-api-integration-tests -- --ignored
//! ```
//!
//! Tests create their own users with unique emails and never rely on
//! existing rows, so they can run against a shared database.

use reqwest::{Client, StatusCode};
use serde_json::Value;

/// Base URL of the server under test (`ORDERS_BASE_URL`).
#[must_use]
pub fn base_url() -> String {
    std::env::var("ORDERS_BASE_URL").unwrap_or_else(|_| "http://127.0.0.1:3000".to_string())
}

/// An email no other test run has used.
#[must_use]
pub fn unique_email(prefix: &str) -> String {
    format!("{prefix}-{}@example.com", uuid::Uuid::new_v4().simple())
}

/// HTTP client bound to the server under test.
pub struct Api {
    client: Client,
    base_url: String,
}

impl Default for Api {
    fn default() -> Self {
        Self::new()
    }
}

impl Api {
    #[must_use]
    pub fn new() -> Self {
        Self {
            client: Client::new(),
            base_url: base_url(),
        }
    }

    /// Send a request and decode the JSON body (`Null` when empty).
    ///
    /// # Panics
    ///
    /// Panics if the server is unreachable or returns a non-JSON body.
    #[allow(clippy::missing_panics_doc, clippy::expect_used)]
    pub async fn send(
        &self,
        method: reqwest::Method,
        path: &str,
        body: Option<&Value>,
    ) -> (StatusCode, Value) {
        let mut request = self
            .client
            .request(method, format!("{}{path}", self.base_url));
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.expect("Failed to reach server");
        let status = response.status();
        let text = response.text().await.expect("Failed to read response");
        let json = if text.is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text).expect("Response is not JSON")
        };
        (status, json)
    }

    pub async fn get(&self, path: &str) -> (StatusCode, Value) {
        self.send(reqwest::Method::GET, path, None).await
    }

    pub async fn post(&self, path: &str, body: &Value) -> (StatusCode, Value) {
        self.send(reqwest::Method::POST, path, Some(body)).await
    }

    pub async fn put(&self, path: &str) -> (StatusCode, Value) {
        self.send(reqwest::Method::PUT, path, None).await
    }

    pub async fn delete(&self, path: &str) -> (StatusCode, Value) {
        self.send(reqwest::Method::DELETE, path, None).await
    }
}
