//! User domain types.

use serde::Serialize;

use orders_api_core::{Email, UserId};

use super::Patch;

/// A customer who places orders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// Email address, unique across users.
    pub email: Email,
    /// Free-form postal address.
    pub address: Option<String>,
}

/// Validated input for creating a user.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: Email,
    pub address: Option<String>,
}

/// Validated partial update for a user.
#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub name: Patch<String>,
    pub email: Patch<Email>,
    pub address: Patch<Option<String>>,
}
