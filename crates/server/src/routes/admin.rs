//! Administrative endpoints.

use axum::{Json, Router, extract::State, http::StatusCode, routing::post};

use super::MessageResponse;
use crate::{db::schema, error::Result, state::AppState};

/// Build the admin router.
pub fn router() -> Router<AppState> {
    Router::new().route("/initdb", post(init_db))
}

/// Create every table that does not exist yet.
///
/// Safe to call repeatedly; existing tables and rows are left alone.
///
/// # Errors
///
/// Returns an error if any `CREATE` statement fails.
pub async fn init_db(State(state): State<AppState>) -> Result<(StatusCode, Json<MessageResponse>)> {
    schema::initialize(state.pool()).await?;
    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new("Database tables created.")),
    ))
}
