//! Product repository for database operations.

use sqlx::PgPool;
use tracing::instrument;

use orders_api_core::ProductId;

use super::RepositoryError;
use crate::models::{NewProduct, Product, ProductChanges};

/// Repository for product database operations.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List every product in insertion order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<Product>, RepositoryError> {
        let products = sqlx::query_as::<_, Product>(
            r"
            SELECT id, name, price, description
            FROM products
            ORDER BY id
            ",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(products)
    }

    /// Get a product by its ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn get(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let product = sqlx::query_as::<_, Product>(
            r"
            SELECT id, name, price, description
            FROM products
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(product)
    }

    /// Create a new product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    #[instrument(skip(self, new))]
    pub async fn create(&self, new: &NewProduct) -> Result<Product, RepositoryError> {
        let product = sqlx::query_as::<_, Product>(
            r"
            INSERT INTO products (name, price, description)
            VALUES ($1, $2, $3)
            RETURNING id, name, price, description
            ",
        )
        .bind(&new.name)
        .bind(new.price)
        .bind(new.description.as_deref())
        .fetch_one(self.pool)
        .await?;

        Ok(product)
    }

    /// Apply a partial update; fields left as `Patch::Keep` are unchanged.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    #[instrument(skip(self, changes), fields(product_id = %id))]
    pub async fn update(
        &self,
        id: ProductId,
        changes: &ProductChanges,
    ) -> Result<Product, RepositoryError> {
        let description = changes.description.as_ref();

        sqlx::query_as::<_, Product>(
            r"
            UPDATE products
            SET name = COALESCE($2, name),
                price = COALESCE($3, price),
                description = CASE WHEN $4 THEN $5 ELSE description END
            WHERE id = $1
            RETURNING id, name, price, description
            ",
        )
        .bind(id)
        .bind(changes.name.as_ref().into_option())
        .bind(changes.price.as_ref().into_option().copied())
        .bind(description.is_set())
        .bind(description.into_option().and_then(Option::as_deref))
        .fetch_optional(self.pool)
        .await?
        .ok_or_else(|| RepositoryError::NotFound(format!("Product {id} not found")))
    }

    /// Delete a product, removing it from every order that contains it.
    ///
    /// # Returns
    ///
    /// Returns `true` if the product was deleted, `false` if it didn't exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn delete(&self, id: ProductId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
