//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET    /                                        - Service banner
//! GET    /health                                  - Liveness check
//! GET    /health/ready                            - Readiness check (database)
//! POST   /initdb                                  - Create tables if absent
//!
//! # Users
//! GET    /users                                   - List users
//! POST   /users                                   - Create user
//! GET    /users/{user_id}                         - Get user
//! PUT    /users/{user_id}                         - Update user (partial)
//! PATCH  /users/{user_id}                         - Update user (partial)
//! DELETE /users/{user_id}                         - Delete user and their orders
//! GET    /users/{user_id}/orders                  - User's orders, newest first
//!
//! # Products
//! GET    /products                                - List products
//! POST   /products                                - Create product
//! GET    /products/{product_id}                   - Get product
//! PUT    /products/{product_id}                   - Update product (partial)
//! PATCH  /products/{product_id}                   - Update product (partial)
//! DELETE /products/{product_id}                   - Delete product
//!
//! # Orders
//! GET    /orders                                  - List orders
//! POST   /orders                                  - Create order (optional product_ids)
//! GET    /orders/{order_id}                       - Get order
//! PUT    /orders/{order_id}                       - Update order (partial)
//! PATCH  /orders/{order_id}                       - Update order (partial)
//! DELETE /orders/{order_id}                       - Delete order
//! GET    /orders/{order_id}/products              - Products in order
//! PUT    /orders/{order_id}/products/{product_id} - Add product to order
//! POST   /orders/{order_id}/products/{product_id} - Add product to order
//! DELETE /orders/{order_id}/products/{product_id} - Remove product from order
//!
//! # Legacy paths (same handlers)
//! PUT    /orders/{order_id}/add_product/{product_id}
//! DELETE /orders/{order_id}/remove_product/{product_id}
//! GET    /orders/user/{user_id}
//! ```

pub mod admin;
pub mod health;
pub mod orders;
pub mod products;
pub mod users;

use axum::Router;
use serde::Serialize;

use crate::state::AppState;

/// Create the full API router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .merge(admin::router())
        .merge(users::router())
        .merge(products::router())
        .merge(orders::router())
}

/// Body for operations that have no entity to return.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
