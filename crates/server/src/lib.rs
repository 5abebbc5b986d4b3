//! Orders API server library.
//!
//! A JSON-over-HTTP service for users, products and orders, where an order
//! belongs to one user and links to any number of products. Everything is
//! stored in `PostgreSQL`.
//!
//! The binary in `main.rs` wires configuration, logging and Sentry around
//! [`build_router`]; tests drive the same router directly.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod extract;
pub mod models;
pub mod routes;
pub mod state;
pub mod validation;

use axum::Router;
use tower_http::trace::TraceLayer;

use state::AppState;

/// Build the application router with request tracing.
///
/// Sentry layers are added by the binary so tests run without a client.
pub fn build_router(state: AppState) -> Router {
    routes::routes()
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
