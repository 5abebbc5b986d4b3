//! Order routes, including the order/product links.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{delete, get, put},
};
use tracing::info;

use orders_api_core::{OrderId, ProductId, UserId};

use super::MessageResponse;
use crate::db::{OrderProductRepository, OrderRepository};
use crate::error::{AppError, Result};
use crate::extract::{JsonBody, PathParams};
use crate::models::{Order, Product};
use crate::state::AppState;
use crate::validation::{self, Payload};

/// Build the orders router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/orders", get(list).post(create))
        .route(
            "/orders/{order_id}",
            get(show).put(update).patch(update).delete(destroy),
        )
        .route("/orders/{order_id}/products", get(products))
        .route(
            "/orders/{order_id}/products/{product_id}",
            put(add_product).post(add_product).delete(remove_product),
        )
        // Older clients use these paths
        .route(
            "/orders/{order_id}/add_product/{product_id}",
            put(add_product),
        )
        .route(
            "/orders/{order_id}/remove_product/{product_id}",
            delete(remove_product),
        )
        .route("/orders/user/{user_id}", get(for_user))
}

// =============================================================================
// Orders
// =============================================================================

/// GET /orders
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Order>>> {
    let orders = OrderRepository::new(state.pool()).list().await?;
    Ok(Json(orders))
}

/// Create an order, optionally with its first products.
///
/// POST /orders
///
/// # Errors
///
/// Returns 404 if the user or any listed product doesn't exist; in that case
/// no order is stored.
pub async fn create(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<Payload>,
) -> Result<(StatusCode, Json<Order>)> {
    let new = validation::new_order(body)?;
    let order = OrderRepository::new(state.pool()).create(&new).await?;

    info!(
        order_id = %order.id,
        user_id = %order.user_id,
        products = new.product_ids.len(),
        "Order created"
    );
    Ok((StatusCode::CREATED, Json(order)))
}

/// GET /orders/{order_id}
pub async fn show(
    State(state): State<AppState>,
    PathParams(id): PathParams<OrderId>,
) -> Result<Json<Order>> {
    OrderRepository::new(state.pool())
        .get(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Order {id} not found")))
}

/// Update an order's owner or date.
///
/// PUT|PATCH /orders/{order_id}
pub async fn update(
    State(state): State<AppState>,
    PathParams(id): PathParams<OrderId>,
    JsonBody(body): JsonBody<Payload>,
) -> Result<Json<Order>> {
    let changes = validation::order_changes(body)?;
    let order = OrderRepository::new(state.pool()).update(id, &changes).await?;

    info!(order_id = %id, "Order updated");
    Ok(Json(order))
}

/// DELETE /orders/{order_id}
pub async fn destroy(
    State(state): State<AppState>,
    PathParams(id): PathParams<OrderId>,
) -> Result<Json<MessageResponse>> {
    if !OrderRepository::new(state.pool()).delete(id).await? {
        return Err(AppError::NotFound(format!("Order {id} not found")));
    }

    info!(order_id = %id, "Order deleted");
    Ok(Json(MessageResponse::new(format!(
        "successfully deleted order {id}"
    ))))
}

/// GET /users/{user_id}/orders is the primary path; this is the older one.
///
/// GET /orders/user/{user_id}
pub async fn for_user(
    State(state): State<AppState>,
    PathParams(user_id): PathParams<UserId>,
) -> Result<Json<Vec<Order>>> {
    let orders = OrderRepository::new(state.pool())
        .list_for_user(user_id)
        .await?;
    Ok(Json(orders))
}

// =============================================================================
// Products in an order
// =============================================================================

/// Products in an order, in the order they were added.
///
/// GET /orders/{order_id}/products
pub async fn products(
    State(state): State<AppState>,
    PathParams(id): PathParams<OrderId>,
) -> Result<Json<Vec<Product>>> {
    let products = OrderProductRepository::new(state.pool())
        .list_products(id)
        .await?;
    Ok(Json(products))
}

/// Add a product to an order and return the order.
///
/// PUT|POST /orders/{order_id}/products/{product_id}
///
/// # Errors
///
/// Returns 404 if either side is missing, 409 if the product is already in
/// the order.
pub async fn add_product(
    State(state): State<AppState>,
    PathParams((order_id, product_id)): PathParams<(OrderId, ProductId)>,
) -> Result<Json<Order>> {
    OrderProductRepository::new(state.pool())
        .add(order_id, product_id)
        .await?;

    info!(order_id = %order_id, product_id = %product_id, "Product added to order");
    load_order(&state, order_id).await
}

/// Remove a product from an order and return the order.
///
/// DELETE /orders/{order_id}/products/{product_id}
///
/// # Errors
///
/// Returns 404 if the product is not in the order.
pub async fn remove_product(
    State(state): State<AppState>,
    PathParams((order_id, product_id)): PathParams<(OrderId, ProductId)>,
) -> Result<Json<Order>> {
    OrderProductRepository::new(state.pool())
        .remove(order_id, product_id)
        .await?;

    info!(order_id = %order_id, product_id = %product_id, "Product removed from order");
    load_order(&state, order_id).await
}

async fn load_order(state: &AppState, id: OrderId) -> Result<Json<Order>> {
    OrderRepository::new(state.pool())
        .get(id)
        .await?
        .map(Json)
        // Deleted concurrently after the link change
        .ok_or_else(|| AppError::NotFound(format!("Order {id} not found")))
}
