//! Product routes.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::get,
};
use tracing::info;

use orders_api_core::ProductId;

use super::MessageResponse;
use crate::db::ProductRepository;
use crate::error::{AppError, Result};
use crate::extract::{JsonBody, PathParams};
use crate::models::Product;
use crate::state::AppState;
use crate::validation::{self, Payload};

/// Build the products router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/products", get(list).post(create))
        .route(
            "/products/{product_id}",
            get(show).put(update).patch(update).delete(destroy),
        )
}

/// GET /products
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Product>>> {
    let products = ProductRepository::new(state.pool()).list().await?;
    Ok(Json(products))
}

/// Create a product.
///
/// POST /products
pub async fn create(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<Payload>,
) -> Result<(StatusCode, Json<Product>)> {
    let new = validation::new_product(body)?;
    let product = ProductRepository::new(state.pool()).create(&new).await?;

    info!(product_id = %product.id, price = %product.price, "Product created");
    Ok((StatusCode::CREATED, Json(product)))
}

/// GET /products/{product_id}
pub async fn show(
    State(state): State<AppState>,
    PathParams(id): PathParams<ProductId>,
) -> Result<Json<Product>> {
    ProductRepository::new(state.pool())
        .get(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Product {id} not found")))
}

/// Update any subset of a product's fields.
///
/// PUT|PATCH /products/{product_id}
pub async fn update(
    State(state): State<AppState>,
    PathParams(id): PathParams<ProductId>,
    JsonBody(body): JsonBody<Payload>,
) -> Result<Json<Product>> {
    let changes = validation::product_changes(body)?;
    let product = ProductRepository::new(state.pool())
        .update(id, &changes)
        .await?;

    info!(product_id = %id, "Product updated");
    Ok(Json(product))
}

/// Delete a product; it disappears from every order that contained it.
///
/// DELETE /products/{product_id}
pub async fn destroy(
    State(state): State<AppState>,
    PathParams(id): PathParams<ProductId>,
) -> Result<Json<MessageResponse>> {
    if !ProductRepository::new(state.pool()).delete(id).await? {
        return Err(AppError::NotFound(format!("Product {id} not found")));
    }

    info!(product_id = %id, "Product deleted");
    Ok(Json(MessageResponse::new(format!(
        "successfully deleted product {id}"
    ))))
}
