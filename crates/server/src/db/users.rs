//! User repository for database operations.

use sqlx::PgPool;
use tracing::instrument;

use orders_api_core::UserId;

use super::{RepositoryError, is_unique_violation};
use crate::models::{NewUser, User, UserChanges};

const EMAIL_TAKEN: &str = "Email already exists";

/// Repository for user database operations.
pub struct UserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List every user in insertion order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<User>, RepositoryError> {
        let users = sqlx::query_as::<_, User>(
            r"
            SELECT id, name, email, address
            FROM users
            ORDER BY id
            ",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(users)
    }

    /// Get a user by their ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self), fields(user_id = %id))]
    pub async fn get(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let user = sqlx::query_as::<_, User>(
            r"
            SELECT id, name, email, address
            FROM users
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(user)
    }

    /// Create a new user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email already exists.
    /// Returns `RepositoryError::Database` for other database errors.
    #[instrument(skip(self, new))]
    pub async fn create(&self, new: &NewUser) -> Result<User, RepositoryError> {
        sqlx::query_as::<_, User>(
            r"
            INSERT INTO users (name, email, address)
            VALUES ($1, $2, $3)
            RETURNING id, name, email, address
            ",
        )
        .bind(&new.name)
        .bind(&new.email)
        .bind(new.address.as_deref())
        .fetch_one(self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                return RepositoryError::Conflict(EMAIL_TAKEN.to_owned());
            }
            RepositoryError::Database(e)
        })
    }

    /// Apply a partial update; fields left as `Patch::Keep` are unchanged.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user doesn't exist.
    /// Returns `RepositoryError::Conflict` if the new email is taken.
    /// Returns `RepositoryError::Database` for other database errors.
    #[instrument(skip(self, changes), fields(user_id = %id))]
    pub async fn update(&self, id: UserId, changes: &UserChanges) -> Result<User, RepositoryError> {
        let address = changes.address.as_ref();

        sqlx::query_as::<_, User>(
            r"
            UPDATE users
            SET name = COALESCE($2, name),
                email = COALESCE($3, email),
                address = CASE WHEN $4 THEN $5 ELSE address END
            WHERE id = $1
            RETURNING id, name, email, address
            ",
        )
        .bind(id)
        .bind(changes.name.as_ref().into_option())
        .bind(changes.email.as_ref().into_option())
        .bind(address.is_set())
        .bind(address.into_option().and_then(Option::as_deref))
        .fetch_optional(self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                return RepositoryError::Conflict(EMAIL_TAKEN.to_owned());
            }
            RepositoryError::Database(e)
        })?
        .ok_or_else(|| RepositoryError::NotFound(format!("User {id} not found")))
    }

    /// Delete a user together with their orders and those orders' links.
    ///
    /// # Returns
    ///
    /// Returns `true` if the user was deleted, `false` if it didn't exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self), fields(user_id = %id))]
    pub async fn delete(&self, id: UserId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Whether a user with this ID exists.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn exists(&self, id: UserId) -> Result<bool, RepositoryError> {
        let row: (bool,) = sqlx::query_as("SELECT EXISTS(SELECT 1 FROM users WHERE id = $1)")
            .bind(id)
            .fetch_one(self.pool)
            .await?;

        Ok(row.0)
    }
}
