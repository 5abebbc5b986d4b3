//! Order repository for database operations.

use sqlx::PgPool;
use tracing::{debug, instrument};

use orders_api_core::{OrderId, UserId};

use super::{RepositoryError, UserRepository, is_foreign_key_violation};
use crate::models::{NewOrder, Order, OrderChanges};

/// Repository for order database operations.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List every order in insertion order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<Order>, RepositoryError> {
        let orders = sqlx::query_as::<_, Order>(
            r"
            SELECT id, user_id, order_date
            FROM orders
            ORDER BY id
            ",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(orders)
    }

    /// Get an order by its ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self), fields(order_id = %id))]
    pub async fn get(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let order = sqlx::query_as::<_, Order>(
            r"
            SELECT id, user_id, order_date
            FROM orders
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(order)
    }

    /// Create an order and link its initial products.
    ///
    /// The order row and every link are written in one transaction: if the
    /// user or any product is missing, nothing is stored.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user or any product doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    #[instrument(skip(self, new), fields(user_id = %new.user_id, products = new.product_ids.len()))]
    pub async fn create(&self, new: &NewOrder) -> Result<Order, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let order = sqlx::query_as::<_, Order>(
            r"
            INSERT INTO orders (user_id, order_date)
            VALUES ($1, COALESCE($2, NOW()))
            RETURNING id, user_id, order_date
            ",
        )
        .bind(new.user_id)
        .bind(new.order_date)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| user_missing_or(e, new.user_id))?;

        if !new.product_ids.is_empty() {
            let requested: Vec<i32> = new.product_ids.iter().map(|id| id.as_i32()).collect();

            // FOR SHARE keeps the products from being deleted before commit
            let found: Vec<(i32,)> =
                sqlx::query_as("SELECT id FROM products WHERE id = ANY($1) FOR SHARE")
                    .bind(&requested)
                    .fetch_all(&mut *tx)
                    .await?;

            let missing: Vec<String> = requested
                .iter()
                .filter(|id| !found.iter().any(|(f,)| f == *id))
                .map(ToString::to_string)
                .collect();
            if !missing.is_empty() {
                return Err(RepositoryError::NotFound(format!(
                    "Products not found: [{}]",
                    missing.join(", ")
                )));
            }

            for product_id in &new.product_ids {
                sqlx::query(
                    r"
                    INSERT INTO order_products (order_id, product_id)
                    VALUES ($1, $2)
                    ON CONFLICT DO NOTHING
                    ",
                )
                .bind(order.id)
                .bind(product_id)
                .execute(&mut *tx)
                .await?;
            }
        }

        tx.commit().await?;

        debug!(order_id = %order.id, "Order created");
        Ok(order)
    }

    /// Apply a partial update; fields left as `Patch::Keep` are unchanged.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order or the new user doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    #[instrument(skip(self, changes), fields(order_id = %id))]
    pub async fn update(&self, id: OrderId, changes: &OrderChanges) -> Result<Order, RepositoryError> {
        let user_id = changes.user_id.as_ref().into_option().copied();

        sqlx::query_as::<_, Order>(
            r"
            UPDATE orders
            SET user_id = COALESCE($2, user_id),
                order_date = COALESCE($3, order_date)
            WHERE id = $1
            RETURNING id, user_id, order_date
            ",
        )
        .bind(id)
        .bind(user_id)
        .bind(changes.order_date.as_ref().into_option())
        .fetch_optional(self.pool)
        .await
        .map_err(|e| match user_id {
            Some(user_id) => user_missing_or(e, user_id),
            None => RepositoryError::Database(e),
        })?
        .ok_or_else(|| RepositoryError::NotFound(format!("Order {id} not found")))
    }

    /// Delete an order and its product links.
    ///
    /// # Returns
    ///
    /// Returns `true` if the order was deleted, `false` if it didn't exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self), fields(order_id = %id))]
    pub async fn delete(&self, id: OrderId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM orders WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// List a user's orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user doesn't exist.
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Order>, RepositoryError> {
        if !UserRepository::new(self.pool).exists(user_id).await? {
            return Err(RepositoryError::NotFound(format!("User {user_id} not found")));
        }

        let orders = sqlx::query_as::<_, Order>(
            r"
            SELECT id, user_id, order_date
            FROM orders
            WHERE user_id = $1
            ORDER BY order_date DESC, id DESC
            ",
        )
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        Ok(orders)
    }
}

/// Map a foreign-key violation on `orders.user_id` to `NotFound`.
fn user_missing_or(err: sqlx::Error, user_id: UserId) -> RepositoryError {
    if is_foreign_key_violation(&err) {
        return RepositoryError::NotFound(format!("User {user_id} not found"));
    }
    RepositoryError::Database(err)
}
