//! End-to-end API tests against a real database.
//!
//! `#[sqlx::test]` creates a fresh database per test from `DATABASE_URL`:
//!
//! ```bash
//! DATABASE_URL=postgres://localhost/orders_test cargo test -p orders-api-server -- --ignored
//! ```

#![allow(clippy::unwrap_used)]

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode},
};
use serde_json::{Value, json};
use sqlx::PgPool;
use tower::ServiceExt;

use orders_api_core::OrderId;
use orders_api_server::{
    build_router,
    db::{OrderProductRepository, schema},
    state::AppState,
};

async fn app(pool: PgPool) -> Router {
    schema::initialize(&pool).await.unwrap();
    build_router(AppState::new(pool))
}

async fn call(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => request
            .header("content-type", "application/json")
            .body(Body::from(body.to_string())),
        None => request.body(Body::empty()),
    }
    .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

async fn create(app: &Router, uri: &str, body: Value) -> Value {
    let (status, created) = call(app, Method::POST, uri, Some(body)).await;
    assert_eq!(status, StatusCode::CREATED, "POST {uri}: {created}");
    created
}

async fn link_count(pool: &PgPool, order_id: i64) -> i64 {
    let order_id = OrderId::new(i32::try_from(order_id).unwrap());
    OrderProductRepository::new(pool)
        .count(order_id)
        .await
        .unwrap()
}

#[sqlx::test(migrations = false)]
#[ignore = "requires PostgreSQL (DATABASE_URL)"]
async fn test_order_with_product_lifecycle(pool: PgPool) {
    let app = app(pool.clone()).await;

    let user = create(&app, "/users", json!({"name": "Ann", "email": "ann@x.com"})).await;
    assert_eq!(user["name"], "Ann");
    assert_eq!(user["address"], Value::Null);

    let product = create(&app, "/products", json!({"name": "Pen", "price": 1.5})).await;
    assert_eq!(product["price"], json!(1.5));

    let order = create(&app, "/orders", json!({"user_id": user["id"]})).await;
    assert_eq!(order["user_id"], user["id"]);
    assert!(order["order_date"].is_string());

    let oid = order["id"].as_i64().unwrap();
    let pid = product["id"].as_i64().unwrap();
    let link = format!("/orders/{oid}/products/{pid}");

    let (status, body) = call(&app, Method::PUT, &link, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, order);

    let (status, products) = call(&app, Method::GET, &format!("/orders/{oid}/products"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(products, json!([product]));

    // Second add of the same pair is rejected and stores nothing
    let (status, _) = call(&app, Method::PUT, &link, None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(link_count(&pool, oid).await, 1);

    let (status, _) = call(&app, Method::DELETE, &link, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(link_count(&pool, oid).await, 0);

    let (status, body) = call(&app, Method::DELETE, &link, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].is_string());
}

#[sqlx::test(migrations = false)]
#[ignore = "requires PostgreSQL (DATABASE_URL)"]
async fn test_legacy_link_paths(pool: PgPool) {
    let app = app(pool.clone()).await;

    let user = create(&app, "/users", json!({"name": "Bo", "email": "bo@x.com"})).await;
    let product = create(&app, "/products", json!({"name": "Ink", "price": "3.25"})).await;
    let order = create(&app, "/orders", json!({"user_id": user["id"]})).await;
    let (oid, pid, uid) = (&order["id"], &product["id"], &user["id"]);

    let (status, _) = call(&app, Method::PUT, &format!("/orders/{oid}/add_product/{pid}"), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, orders) = call(&app, Method::GET, &format!("/orders/user/{uid}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(orders, json!([order]));

    let (status, _) = call(
        &app,
        Method::DELETE,
        &format!("/orders/{oid}/remove_product/{pid}"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(link_count(&pool, oid.as_i64().unwrap()).await, 0);
}

#[sqlx::test(migrations = false)]
#[ignore = "requires PostgreSQL (DATABASE_URL)"]
async fn test_duplicate_email_is_conflict(pool: PgPool) {
    let app = app(pool).await;

    create(&app, "/users", json!({"name": "Ann", "email": "ann@x.com"})).await;
    let (status, body) = call(
        &app,
        Method::POST,
        "/users",
        Some(json!({"name": "Other Ann", "email": "ann@x.com"})),
    )
    .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "Email already exists");

    let (_, users) = call(&app, Method::GET, "/users", None).await;
    assert_eq!(users.as_array().unwrap().len(), 1);
}

#[sqlx::test(migrations = false)]
#[ignore = "requires PostgreSQL (DATABASE_URL)"]
async fn test_create_then_read_round_trip(pool: PgPool) {
    let app = app(pool).await;

    let user = create(
        &app,
        "/users",
        json!({"name": "Cy", "email": "cy@x.com", "address": "1 Main St"}),
    )
    .await;
    let (status, fetched) = call(&app, Method::GET, &format!("/users/{}", user["id"]), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, user);

    let product = create(
        &app,
        "/products",
        json!({"name": "Pad", "price": 2.0, "description": "A5"}),
    )
    .await;
    let (status, fetched) =
        call(&app, Method::GET, &format!("/products/{}", product["id"]), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, product);

    let order = create(
        &app,
        "/orders",
        json!({"user_id": user["id"], "order_date": "2025-08-15T14:30:00Z"}),
    )
    .await;
    assert_eq!(order["order_date"], "2025-08-15T14:30:00Z");
    let (status, fetched) = call(&app, Method::GET, &format!("/orders/{}", order["id"]), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, order);
}

#[sqlx::test(migrations = false)]
#[ignore = "requires PostgreSQL (DATABASE_URL)"]
async fn test_partial_update_keeps_other_fields(pool: PgPool) {
    let app = app(pool).await;

    let user = create(
        &app,
        "/users",
        json!({"name": "Di", "email": "di@x.com", "address": "2 Elm St"}),
    )
    .await;
    let uri = format!("/users/{}", user["id"]);

    let (status, updated) = call(&app, Method::PATCH, &uri, Some(json!({"name": "Dee"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["name"], "Dee");
    assert_eq!(updated["email"], "di@x.com");
    assert_eq!(updated["address"], "2 Elm St");

    let (status, updated) = call(&app, Method::PUT, &uri, Some(json!({"address": null}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["name"], "Dee");
    assert_eq!(updated["address"], Value::Null);

    let (status, unchanged) = call(&app, Method::PATCH, &uri, Some(json!({}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(unchanged, updated);

    let (status, _) = call(&app, Method::PATCH, "/users/9999", Some(json!({"name": "X"}))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = false)]
#[ignore = "requires PostgreSQL (DATABASE_URL)"]
async fn test_deleting_user_removes_orders_and_links(pool: PgPool) {
    let app = app(pool.clone()).await;

    let user = create(&app, "/users", json!({"name": "Ed", "email": "ed@x.com"})).await;
    let product = create(&app, "/products", json!({"name": "Cup", "price": 4})).await;
    let order = create(
        &app,
        "/orders",
        json!({"user_id": user["id"], "product_ids": [product["id"]]}),
    )
    .await;
    let oid = order["id"].as_i64().unwrap();
    assert_eq!(link_count(&pool, oid).await, 1);

    let (status, body) = call(&app, Method::DELETE, &format!("/users/{}", user["id"]), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["message"],
        format!("successfully deleted user {}", user["id"])
    );

    let (status, _) = call(&app, Method::GET, &format!("/orders/{oid}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(link_count(&pool, oid).await, 0);

    // The product itself survives
    let (status, _) = call(&app, Method::GET, &format!("/products/{}", product["id"]), None).await;
    assert_eq!(status, StatusCode::OK);
}

#[sqlx::test(migrations = false)]
#[ignore = "requires PostgreSQL (DATABASE_URL)"]
async fn test_deleting_product_unlinks_it(pool: PgPool) {
    let app = app(pool.clone()).await;

    let user = create(&app, "/users", json!({"name": "Fay", "email": "fay@x.com"})).await;
    let product = create(&app, "/products", json!({"name": "Mug", "price": 9.99})).await;
    let order = create(
        &app,
        "/orders",
        json!({"user_id": user["id"], "product_ids": [product["id"]]}),
    )
    .await;

    let (status, _) = call(&app, Method::DELETE, &format!("/products/{}", product["id"]), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = call(&app, Method::GET, &format!("/orders/{}", order["id"]), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(link_count(&pool, order["id"].as_i64().unwrap()).await, 0);
}

#[sqlx::test(migrations = false)]
#[ignore = "requires PostgreSQL (DATABASE_URL)"]
async fn test_order_with_missing_product_stores_nothing(pool: PgPool) {
    let app = app(pool.clone()).await;

    let user = create(&app, "/users", json!({"name": "Gus", "email": "gus@x.com"})).await;
    let product = create(&app, "/products", json!({"name": "Clip", "price": 0.1})).await;

    let (status, body) = call(
        &app,
        Method::POST,
        "/orders",
        Some(json!({"user_id": user["id"], "product_ids": [product["id"], 424_242]})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Products not found: [424242]");

    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM orders")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 0);
}

#[sqlx::test(migrations = false)]
#[ignore = "requires PostgreSQL (DATABASE_URL)"]
async fn test_order_for_missing_user_is_not_found(pool: PgPool) {
    let app = app(pool).await;

    let (status, body) = call(&app, Method::POST, "/orders", Some(json!({"user_id": 77}))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "User 77 not found");

    let (status, _) = call(&app, Method::GET, "/users/77/orders", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = false)]
#[ignore = "requires PostgreSQL (DATABASE_URL)"]
async fn test_user_orders_newest_first(pool: PgPool) {
    let app = app(pool).await;

    let user = create(&app, "/users", json!({"name": "Hal", "email": "hal@x.com"})).await;
    let older = create(
        &app,
        "/orders",
        json!({"user_id": user["id"], "order_date": "2024-01-01T00:00:00Z"}),
    )
    .await;
    let newer = create(
        &app,
        "/orders",
        json!({"user_id": user["id"], "order_date": "2025-01-01T00:00:00Z"}),
    )
    .await;

    let (status, orders) = call(&app, Method::GET, &format!("/users/{}/orders", user["id"]), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(orders, json!([newer, older]));
}

#[sqlx::test(migrations = false)]
#[ignore = "requires PostgreSQL (DATABASE_URL)"]
async fn test_initdb_is_idempotent(pool: PgPool) {
    let app = app(pool).await;

    create(&app, "/users", json!({"name": "Ivy", "email": "ivy@x.com"})).await;

    let (status, body) = call(&app, Method::POST, "/initdb", None).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "Database tables created.");

    let (_, users) = call(&app, Method::GET, "/users", None).await;
    assert_eq!(users.as_array().unwrap().len(), 1);

    let (status, _) = call(&app, Method::GET, "/health/ready", None).await;
    assert_eq!(status, StatusCode::OK);
}

#[sqlx::test(migrations = false)]
#[ignore = "requires PostgreSQL (DATABASE_URL)"]
async fn test_missing_entities_are_not_found(pool: PgPool) {
    let app = app(pool).await;

    let user = create(&app, "/users", json!({"name": "Jo", "email": "jo@x.com"})).await;
    let product = create(&app, "/products", json!({"name": "Tape", "price": 2.5})).await;
    let order = create(&app, "/orders", json!({"user_id": user["id"]})).await;
    let (oid, pid) = (&order["id"], &product["id"]);

    let cases = [
        (Method::DELETE, "/users/99".to_string(), None, "User 99 not found"),
        (Method::DELETE, "/products/99".to_string(), None, "Product 99 not found"),
        (Method::DELETE, "/orders/99".to_string(), None, "Order 99 not found"),
        (
            Method::PUT,
            "/products/99".to_string(),
            Some(json!({"name": "Glue"})),
            "Product 99 not found",
        ),
        (
            Method::PATCH,
            "/products/99".to_string(),
            Some(json!({"price": 3})),
            "Product 99 not found",
        ),
        (
            Method::PUT,
            "/orders/99".to_string(),
            Some(json!({"order_date": "2025-01-01T00:00:00Z"})),
            "Order 99 not found",
        ),
        (
            Method::PATCH,
            "/orders/99".to_string(),
            Some(json!({"user_id": user["id"]})),
            "Order 99 not found",
        ),
        (
            Method::PUT,
            format!("/orders/99/products/{pid}"),
            None,
            "Order 99 not found",
        ),
        (
            Method::PUT,
            format!("/orders/{oid}/products/99"),
            None,
            "Product 99 not found",
        ),
        (Method::GET, "/orders/99/products".to_string(), None, "Order 99 not found"),
    ];

    for (method, uri, body, message) in cases {
        let label = format!("{method} {uri}");
        let (status, response) = call(&app, method, &uri, body).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{label}");
        assert_eq!(response["error"], message, "{label}");
    }

    // Nothing above touched the existing rows
    let (status, _) = call(&app, Method::GET, &format!("/orders/{oid}"), None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = call(&app, Method::GET, &format!("/products/{pid}"), None).await;
    assert_eq!(status, StatusCode::OK);
}
