//! User routes.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::get,
};
use tracing::info;

use orders_api_core::UserId;

use super::MessageResponse;
use crate::db::{OrderRepository, UserRepository};
use crate::error::{AppError, Result};
use crate::extract::{JsonBody, PathParams};
use crate::models::{Order, User};
use crate::state::AppState;
use crate::validation::{self, Payload};

/// Build the users router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/users", get(list).post(create))
        .route(
            "/users/{user_id}",
            get(show).put(update).patch(update).delete(destroy),
        )
        .route("/users/{user_id}/orders", get(orders))
}

/// List all users.
///
/// GET /users
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<User>>> {
    let users = UserRepository::new(state.pool()).list().await?;
    Ok(Json(users))
}

/// Create a user.
///
/// POST /users
///
/// # Errors
///
/// Returns 400 with field errors for an invalid body, 409 if the email is taken.
pub async fn create(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<Payload>,
) -> Result<(StatusCode, Json<User>)> {
    let new = validation::new_user(body)?;
    let user = UserRepository::new(state.pool()).create(&new).await?;

    info!(user_id = %user.id, "User created");
    Ok((StatusCode::CREATED, Json(user)))
}

/// Get one user.
///
/// GET /users/{user_id}
pub async fn show(
    State(state): State<AppState>,
    PathParams(id): PathParams<UserId>,
) -> Result<Json<User>> {
    UserRepository::new(state.pool())
        .get(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("User {id} not found")))
}

/// Update any subset of a user's fields.
///
/// PUT|PATCH /users/{user_id}
pub async fn update(
    State(state): State<AppState>,
    PathParams(id): PathParams<UserId>,
    JsonBody(body): JsonBody<Payload>,
) -> Result<Json<User>> {
    let changes = validation::user_changes(body)?;
    let user = UserRepository::new(state.pool()).update(id, &changes).await?;

    info!(user_id = %id, "User updated");
    Ok(Json(user))
}

/// Delete a user with their orders.
///
/// DELETE /users/{user_id}
pub async fn destroy(
    State(state): State<AppState>,
    PathParams(id): PathParams<UserId>,
) -> Result<Json<MessageResponse>> {
    if !UserRepository::new(state.pool()).delete(id).await? {
        return Err(AppError::NotFound(format!("User {id} not found")));
    }

    info!(user_id = %id, "User deleted");
    Ok(Json(MessageResponse::new(format!(
        "successfully deleted user {id}"
    ))))
}

/// A user's orders, newest first.
///
/// GET /users/{user_id}/orders
pub async fn orders(
    State(state): State<AppState>,
    PathParams(id): PathParams<UserId>,
) -> Result<Json<Vec<Order>>> {
    let orders = OrderRepository::new(state.pool()).list_for_user(id).await?;
    Ok(Json(orders))
}
