//! Order/product links.
//!
//! A link says "this product is part of this order". The `(order_id,
//! product_id)` primary key allows at most one link per pair; there is no
//! quantity or price snapshot.

use sqlx::PgPool;
use tracing::{debug, instrument};

use orders_api_core::{OrderId, ProductId};

use super::{RepositoryError, is_foreign_key_violation};
use crate::models::Product;

/// Repository for the `order_products` link table.
pub struct OrderProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderProductRepository<'a> {
    /// Create a new link repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Link a product to an order.
    ///
    /// The existence checks and the insert share one transaction, and the
    /// order row stays locked until commit, so concurrent adds of the same
    /// pair cannot both succeed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order or product doesn't exist.
    /// Returns `RepositoryError::Conflict` if the product is already in the order.
    /// Returns `RepositoryError::Database` for other database errors.
    #[instrument(skip(self), fields(order_id = %order_id, product_id = %product_id))]
    pub async fn add(&self, order_id: OrderId, product_id: ProductId) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let order: Option<(i32,)> = sqlx::query_as("SELECT id FROM orders WHERE id = $1 FOR UPDATE")
            .bind(order_id)
            .fetch_optional(&mut *tx)
            .await?;
        if order.is_none() {
            return Err(RepositoryError::NotFound(format!("Order {order_id} not found")));
        }

        let (product_exists,): (bool,) =
            sqlx::query_as("SELECT EXISTS(SELECT 1 FROM products WHERE id = $1)")
                .bind(product_id)
                .fetch_one(&mut *tx)
                .await?;
        if !product_exists {
            return Err(RepositoryError::NotFound(format!(
                "Product {product_id} not found"
            )));
        }

        let inserted = sqlx::query(
            r"
            INSERT INTO order_products (order_id, product_id)
            VALUES ($1, $2)
            ON CONFLICT (order_id, product_id) DO NOTHING
            ",
        )
        .bind(order_id)
        .bind(product_id)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            // Product deleted between the check and the insert
            if is_foreign_key_violation(&e) {
                return RepositoryError::NotFound(format!("Product {product_id} not found"));
            }
            RepositoryError::Database(e)
        })?;

        if inserted.rows_affected() == 0 {
            return Err(RepositoryError::Conflict(format!(
                "Product {product_id} is already in order {order_id}"
            )));
        }

        tx.commit().await?;

        debug!("Product linked to order");
        Ok(())
    }

    /// Unlink a product from an order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product is not in the order.
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self), fields(order_id = %order_id, product_id = %product_id))]
    pub async fn remove(
        &self,
        order_id: OrderId,
        product_id: ProductId,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r"
            DELETE FROM order_products
            WHERE order_id = $1 AND product_id = $2
            ",
        )
        .bind(order_id)
        .bind(product_id)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(format!(
                "Product {product_id} is not in order {order_id}"
            )));
        }

        Ok(())
    }

    /// Products linked to an order, in the order they were added.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order doesn't exist.
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self), fields(order_id = %order_id))]
    pub async fn list_products(&self, order_id: OrderId) -> Result<Vec<Product>, RepositoryError> {
        let (order_exists,): (bool,) =
            sqlx::query_as("SELECT EXISTS(SELECT 1 FROM orders WHERE id = $1)")
                .bind(order_id)
                .fetch_one(self.pool)
                .await?;
        if !order_exists {
            return Err(RepositoryError::NotFound(format!("Order {order_id} not found")));
        }

        let products = sqlx::query_as::<_, Product>(
            r"
            SELECT p.id, p.name, p.price, p.description
            FROM order_products op
            JOIN products p ON p.id = op.product_id
            WHERE op.order_id = $1
            ORDER BY op.created_at, p.id
            ",
        )
        .bind(order_id)
        .fetch_all(self.pool)
        .await?;

        Ok(products)
    }

    /// Number of links for an order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count(&self, order_id: OrderId) -> Result<i64, RepositoryError> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM order_products WHERE order_id = $1")
                .bind(order_id)
                .fetch_one(self.pool)
                .await?;

        Ok(count)
    }
}
